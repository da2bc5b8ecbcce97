use std::{fs, path::PathBuf};

use anyhow::Context as _;
use clap::Args;
use dronevo_genetics::Genotype;
use dronevo_sim::{Track, TrackRun};

use crate::settings::RunSettings;

use super::TICK_SECS;

#[derive(Debug, Clone, Args)]
pub(crate) struct EvaluateArg {
    /// Saved genotype to replay
    #[arg(long)]
    genotype: PathBuf,
    /// Run settings JSON; defaults apply when omitted
    #[arg(long)]
    settings: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
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

    let text = fs::read_to_string(&arg.genotype)
        .with_context(|| format!("failed to read genotype: {}", arg.genotype.display()))?;
    let genotype = Genotype::from_text(&text)
        .with_context(|| format!("failed to parse genotype: {}", arg.genotype.display()))?;

    let mut run = TrackRun::new(&track, vec![genotype], &topology)?;
    let mut ticks: u32 = 0;
    loop {
        ticks += 1;
        if run.tick(TICK_SECS).all_dead {
            break;
        }
    }

    #[expect(clippy::cast_precision_loss)]
    let elapsed = ticks as f32 * TICK_SECS;
    let racer = &run.racers()[0];
    println!("completion: {:.4}", racer.completion());
    println!("checkpoints captured: {}", racer.checkpoint_index() - 1);
    println!("simulated time: {elapsed:.2}s");
    Ok(())
}
