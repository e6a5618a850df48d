use config::{Config, Environment, File, FileFormat};
use painter::evolution::EvolutionConfig;
use serde::Deserialize;
use validator::Validate;

use crate::AppError;

const DEFAULT_CONFIG: &str = include_str!("../../resources/config/default.toml");
const DEFAULT_CONFIG_PREFIX: &str = "APP";
const NESTED_KEY_SEPARATOR: &str = "__";

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppConfig {
    pub service_host: String,
    pub service_port: u16,
    pub statsd_enabled: bool,
    pub statsd_host: String,
    pub statsd_port: u16,
    pub statsd_factor: f64,
    /// Snapshots kept for `/v1/history`.
    #[validate(range(min = 1))]
    pub history_capacity: usize,
    /// Size of the default target, used when a run request brings none.
    #[validate(range(min = 1))]
    pub target_width: u32,
    #[validate(range(min = 1))]
    pub target_height: u32,
    /// Defaults of the run parameters.
    #[validate(nested)]
    pub evolution: EvolutionConfig,
}

impl AppConfig {
    /// Embedded defaults overlaid with `APP_` environment variables, nested
    /// keys being separated by `__` (`APP_EVOLUTION__METRIC=alpha`).
    pub fn new() -> Result<Self, AppError> {
        Self::load(Some(
            Environment::with_prefix(DEFAULT_CONFIG_PREFIX)
                .prefix_separator("_")
                .separator(NESTED_KEY_SEPARATOR),
        ))
    }

    /// Embedded defaults only, whatever the environment holds.
    #[cfg(test)]
    pub fn defaults() -> Result<Self, AppError> {
        Self::load(None)
    }

    fn load(environment: Option<Environment>) -> Result<Self, AppError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
