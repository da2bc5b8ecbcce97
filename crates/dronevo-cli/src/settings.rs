use std::path::Path;

use dronevo_genetics::{EvolutionParams, Selection};
use dronevo_sim::{CONTROL_COUNT, SENSOR_COUNT};
use serde::{Deserialize, Serialize};

use crate::util;

/// Scalar run configuration, read once from JSON before a run starts.
///
/// Any field left out of the file keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub population_size: usize,
    /// Identifier of the built-in track to race on.
    pub track_id: String,
    /// Vehicles considered selected for reproduction. Informational: it is
    /// echoed into the statistics header but the operators derive their own
    /// pool sizes.
    pub selected_count: usize,
    /// Hidden layer widths; sensor and control widths are appended around
    /// them to form the full network topology.
    pub hidden_layers: Vec<usize>,
    pub mutation_probability: f32,
    pub gene_mutation_probability: f32,
    pub crossover_swap_probability: f32,
    pub mutation_amount: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        let evolution = EvolutionParams::default();
        Self {
            population_size: 30,
            track_id: "oval".to_owned(),
            selected_count: 2,
            hidden_layers: vec![4, 3],
            mutation_probability: evolution.mutation_probability,
            gene_mutation_probability: evolution.gene_mutation_probability,
            crossover_swap_probability: evolution.crossover_swap_probability,
            mutation_amount: evolution.mutation_amount,
        }
    }
}

impl RunSettings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let settings: Self = util::read_json_file("settings", path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects knob values the operators cannot consume, so a bad settings
    /// file fails at load time instead of mid-generation.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.population_size >= 2,
            "population_size must be at least 2, got {}",
            self.population_size
        );
        for (name, value) in [
            ("mutation_probability", self.mutation_probability),
            ("gene_mutation_probability", self.gene_mutation_probability),
            ("crossover_swap_probability", self.crossover_swap_probability),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&value),
                "{name} must be within [0, 1], got {value}"
            );
        }
        anyhow::ensure!(
            self.mutation_amount.is_finite() && self.mutation_amount >= 0.0,
            "mutation_amount must be finite and non-negative, got {}",
            self.mutation_amount
        );
        Ok(())
    }

    /// Full network topology: sensor readings in, control signals out.
    #[must_use]
    pub fn topology(&self) -> Vec<usize> {
        let mut topology = Vec::with_capacity(self.hidden_layers.len() + 2);
        topology.push(SENSOR_COUNT);
        topology.extend_from_slice(&self.hidden_layers);
        topology.push(CONTROL_COUNT);
        topology
    }

    #[must_use]
    pub fn evolution_params(&self, selection: Selection) -> EvolutionParams {
        EvolutionParams {
            selection,
            crossover_swap_probability: self.crossover_swap_probability,
            mutation_probability: self.mutation_probability,
            gene_mutation_probability: self.gene_mutation_probability,
            mutation_amount: self.mutation_amount,
            ..EvolutionParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_wraps_hidden_layers() {
        let settings = RunSettings {
            hidden_layers: vec![7, 6],
            ..RunSettings::default()
        };
        assert_eq!(settings.topology(), vec![SENSOR_COUNT, 7, 6, CONTROL_COUNT]);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: RunSettings =
            serde_json::from_str(r#"{ "population_size": 12, "track_id": "slalom" }"#).unwrap();
        assert_eq!(settings.population_size, 12);
        assert_eq!(settings.track_id, "slalom");
        assert_eq!(settings.hidden_layers, RunSettings::default().hidden_layers);
    }

    #[test]
    fn test_default_settings_validate() {
        RunSettings::default().validate().unwrap();
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        let settings = RunSettings {
            mutation_probability: 1.5,
            ..RunSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("mutation_probability"));

        let settings = RunSettings {
            crossover_swap_probability: -0.1,
            ..RunSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_mutation_amount_is_rejected() {
        let settings = RunSettings {
            mutation_amount: -2.0,
            ..RunSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("mutation_amount"));
    }

    #[test]
    fn test_undersized_population_is_rejected() {
        let settings = RunSettings {
            population_size: 1,
            ..RunSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = RunSettings::default();
        let text = serde_json::to_string(&settings).unwrap();
        let restored: RunSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(restored.population_size, settings.population_size);
        assert_eq!(restored.track_id, settings.track_id);
    }
}
