use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::Local;
use dronevo_genetics::{GenerationSummary, Genotype};

use crate::settings::RunSettings;

const SEPARATOR: char = ';';

/// Durable per-run statistics: a dated directory holding one CSV of
/// per-generation records plus numbered genotype snapshots.
///
/// The CSV is created once with a settings header and then strictly
/// appended to, one row per completed generation.
#[derive(Debug)]
pub struct StatisticsSink {
    root: PathBuf,
    csv_path: PathBuf,
}

impl StatisticsSink {
    /// Creates the run directory (named after today's date) and the dated
    /// CSV file, writing the settings echo and column header.
    pub fn create(output_dir: &Path, settings: &RunSettings) -> anyhow::Result<Self> {
        let now = Local::now();
        let root = output_dir.join(format!("evaluation-{}", now.format("%Y_%m_%d")));
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create run directory: {}", root.display()))?;

        let csv_path = root.join(format!("simulation-{}.csv", now.format("%Y_%m_%d_%H-%M-%S")));
        let mut header = String::new();
        let _ = writeln!(header, "# track: {}", settings.track_id);
        let _ = writeln!(header, "# population size: {}", settings.population_size);
        let _ = writeln!(header, "# selected count: {}", settings.selected_count);
        let _ = writeln!(header, "# hidden layers: {:?}", settings.hidden_layers);
        let _ = writeln!(
            header,
            "# mutation: probability {}, per-gene {}, amount {}",
            settings.mutation_probability,
            settings.gene_mutation_probability,
            settings.mutation_amount
        );
        let _ = writeln!(
            header,
            "# crossover swap probability: {}",
            settings.crossover_swap_probability
        );
        let _ = writeln!(
            header,
            "generation{SEPARATOR}best evaluation{SEPARATOR}average evaluation"
        );
        fs::write(&csv_path, header)
            .with_context(|| format!("failed to create statistics file: {}", csv_path.display()))?;

        Ok(Self { root, csv_path })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Appends one generation record. The file must still exist; a vanished
    /// statistics file is an error, not a silent re-create.
    pub fn append(&self, summary: &GenerationSummary) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.csv_path.exists(),
            "statistics file disappeared: {}",
            self.csv_path.display()
        );
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| {
                format!("failed to open statistics file: {}", self.csv_path.display())
            })?;
        writeln!(
            file,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            summary.generation, summary.best_evaluation, summary.average_evaluation
        )?;
        Ok(())
    }

    /// Saves a genotype snapshot numbered by how many snapshots the run has
    /// produced so far, and returns its path.
    pub fn save_genotype(&self, genotype: &Genotype, ordinal: u32) -> anyhow::Result<PathBuf> {
        let path = self.root.join(format!("genotype-{ordinal}.txt"));
        fs::write(&path, genotype.to_text())
            .with_context(|| format!("failed to save genotype: {}", path.display()))?;
        Ok(path)
    }
}
