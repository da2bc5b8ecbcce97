use std::{fs, io, path::PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use clap::Args;
use dronevo_brain::parameter_count;
use dronevo_genetics::{GeneticAlgorithm, Genotype, Selection};
use dronevo_sim::{Track, TrackRun};
use dronevo_stats::descriptive::DescriptiveStats;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::{settings::RunSettings, statistics::StatisticsSink, util};

use super::TICK_SECS;

/// Run-best genotypes below this evaluation are not worth snapshotting.
const SAVE_THRESHOLD: f32 = 0.2;

#[derive(Debug, Clone, Args)]
pub(crate) struct TrainArg {
    /// Run settings JSON; defaults apply when omitted
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Seed the initial population from a saved genotype
    #[arg(long)]
    seed_genotype: Option<PathBuf>,
    /// Number of generations to evolve
    #[arg(long, default_value_t = 100)]
    generations: u32,
    /// RNG seed for a reproducible run
    #[arg(long)]
    rng_seed: Option<u64>,
    /// Directory receiving statistics and genotype snapshots
    #[arg(long, default_value = "training-output")]
    output_dir: PathBuf,
    /// Selection operator: elitist or remainderstochastic
    #[arg(long, default_value = "elitist")]
    selection: Selection,
}

#[derive(Debug, Serialize)]
struct RunReport {
    track_id: String,
    finished_at: DateTime<Local>,
    rng_seed: u64,
    generations: u32,
    population_size: usize,
    topology: Vec<usize>,
    best_evaluation: f32,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let settings = match &arg.settings {
        Some(path) => RunSettings::load(path)?,
        None => RunSettings::default(),
    };
    let track = Track::builtin(&settings.track_id).with_context(|| {
        format!(
            "unknown track {:?} (available: {})",
            settings.track_id,
            Track::builtin_ids().join(", ")
        )
    })?;
    let topology = settings.topology();
    let n = parameter_count(&topology);

    let rng_seed = arg.rng_seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64Mcg::seed_from_u64(rng_seed);

    let params = settings.evolution_params(arg.selection);
    let mut algorithm = match load_seed_genotype(arg.seed_genotype.as_deref())? {
        Some(seed) => GeneticAlgorithm::from_seed(n, settings.population_size, params, &seed)?,
        None => GeneticAlgorithm::new(n, settings.population_size, params, &mut rng),
    };

    let sink = StatisticsSink::create(&arg.output_dir, &settings)?;
    eprintln!(
        "training on {:?}: population {}, topology {:?} ({n} parameters), rng seed {rng_seed}",
        settings.track_id, settings.population_size, topology
    );

    let mut snapshots = 0;
    let mut best_genotype: Option<Genotype> = None;

    for _ in 0..arg.generations {
        let population = algorithm.take_population()?;
        let mut run = TrackRun::new(&track, population, &topology)?;
        while !run.tick(TICK_SECS).all_dead {}
        let scored = run.into_population();

        let stats = DescriptiveStats::new(scored.iter().map(Genotype::evaluation))
            .expect("population is never empty");

        let candidate = scored
            .iter()
            .max_by(|a, b| a.evaluation().total_cmp(&b.evaluation()))
            .expect("population is never empty");
        if candidate.evaluation() > algorithm.best_evaluation()
            && candidate.evaluation() >= SAVE_THRESHOLD
        {
            snapshots += 1;
            let path = sink.save_genotype(candidate, snapshots)?;
            eprintln!("  new run best, snapshot saved to {}", path.display());
        }
        if best_genotype
            .as_ref()
            .is_none_or(|best| candidate.evaluation() > best.evaluation())
        {
            best_genotype = Some(candidate.clone());
        }

        let summary = algorithm.complete_generation(scored, &mut rng)?;
        sink.append(&summary)?;
        eprintln!(
            "generation #{}: best {:.4}, average {:.4}, stddev {:.4}",
            summary.generation, stats.max, stats.mean, stats.std_dev
        );
    }

    if let Some(best) = &best_genotype {
        let path = sink.root().join("best-genotype.txt");
        fs::write(&path, best.to_text())
            .with_context(|| format!("failed to save genotype: {}", path.display()))?;
        eprintln!(
            "best genotype (evaluation {:.4}) saved to {}",
            best.evaluation(),
            path.display()
        );
    }
    util::write_json_file(
        "run report",
        sink.root().join("run-report.json"),
        &RunReport {
            track_id: settings.track_id.clone(),
            finished_at: Local::now(),
            rng_seed,
            generations: arg.generations,
            population_size: settings.population_size,
            topology,
            best_evaluation: algorithm.best_evaluation(),
        },
    )?;

    Ok(())
}

/// Loads the seed genotype if one was requested. A missing file is not
/// fatal: the run falls back to random initialization with a warning.
fn load_seed_genotype(path: Option<&std::path::Path>) -> anyhow::Result<Option<Genotype>> {
    let Some(path) = path else {
        return Ok(None);
    };
    match fs::read_to_string(path) {
        Ok(text) => {
            let genotype = Genotype::from_text(&text)
                .with_context(|| format!("failed to parse seed genotype: {}", path.display()))?;
            Ok(Some(genotype))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            eprintln!(
                "seed genotype {} not found, starting from a random population",
                path.display()
            );
            Ok(None)
        }
        Err(err) => Err(err)
            .with_context(|| format!("failed to read seed genotype: {}", path.display())),
    }
}
