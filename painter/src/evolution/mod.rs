mod evolution_engine;
mod evolution_handle;
mod generation;

pub use evolution_engine::EvolutionEngine;
pub use evolution_handle::EvolutionHandle;
pub use generation::{run_generation, GenerationOutcome};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::{fitness::FitnessMetric, mutation::MutationConfig, raster::RasterError, RasterSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvolutionStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventType {
    StatusChanged(EvolutionStatus),
    GenerationCompleted,
    SnapshotTaken,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("An evolution is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Settings of one run; they cannot change while the run is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct EvolutionConfig {
    /// Mutated trials per generation.
    #[validate(range(min = 1))]
    pub population_size: usize,
    pub metric: FitnessMetric,
    /// Generations between two snapshots.
    #[validate(range(min = 1))]
    pub snapshot_frequency: u64,
    #[serde(default)]
    #[validate(nested)]
    pub mutation: MutationConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            population_size: 50,
            metric: FitnessMetric::default(),
            snapshot_frequency: 100,
            mutation: MutationConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Builds a checked configuration from a textual metric selector.
    pub fn new(
        population_size: usize,
        metric: &str,
        snapshot_frequency: u64,
    ) -> Result<Self, EvolutionError> {
        let metric = metric
            .parse::<FitnessMetric>()
            .map_err(|_| EvolutionError::InvalidConfig(format!("unknown fitness metric '{metric}'")))?;
        let config = EvolutionConfig {
            population_size,
            metric,
            snapshot_frequency,
            mutation: MutationConfig::default(),
        };
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), EvolutionError> {
        self.validate()
            .map_err(|e| EvolutionError::InvalidConfig(e.to_string()))
    }
}

pub type EvolutionResult = Result<RunReport, EvolutionError>;

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// Completed generations; stopping resets the live counter, not this one.
    pub generations: u64,
    /// Best fitness reached, infinite when no generation completed.
    pub fitness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generation: u64,
    pub fitness: f64,
    pub candidate: RasterSnapshot,
}

#[cfg(test)]
mod tests {
    use super::{EvolutionConfig, EvolutionError};
    use crate::{fitness::FitnessMetric, mutation::MutationConfig};

    #[test]
    fn test_evolution_config_new() {
        let result = EvolutionConfig::new(10, "alpha", 5).unwrap();
        assert_eq!(FitnessMetric::AlphaOnly, result.metric);
        assert_eq!(MutationConfig::default(), result.mutation);

        assert!(
            matches!(
                EvolutionConfig::new(10, "sepia", 5),
                Err(EvolutionError::InvalidConfig(_))
            ),
            "Should reject unknown metrics instead of running without one"
        );
        assert!(
            matches!(
                EvolutionConfig::new(0, "perceptual", 5),
                Err(EvolutionError::InvalidConfig(_))
            ),
            "Should reject an empty population"
        );
        assert!(
            matches!(
                EvolutionConfig::new(10, "perceptual", 0),
                Err(EvolutionError::InvalidConfig(_))
            ),
            "Should reject a zero snapshot frequency"
        );
    }

    #[test]
    fn test_evolution_config_check_validates_mutation() {
        let config = EvolutionConfig {
            mutation: MutationConfig {
                rounds: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(EvolutionError::InvalidConfig(_))));
    }

    #[test]
    fn test_evolution_config_deserialize() {
        let config: EvolutionConfig = toml::from_str(
            r#"
            population_size = 12
            metric = "alpha"
            snapshot_frequency = 3
            "#,
        )
        .unwrap();
        assert_eq!(
            EvolutionConfig {
                population_size: 12,
                metric: FitnessMetric::AlphaOnly,
                snapshot_frequency: 3,
                mutation: MutationConfig::default(),
            },
            config
        );

        let result = toml::from_str::<EvolutionConfig>(
            r#"
            population_size = 12
            metric = "grayscale"
            snapshot_frequency = 3
            "#,
        );
        assert!(result.is_err(), "Should fail on unknown metric selectors");
    }
}
