use env_logger::{Builder, Env};
use log::SetLoggerError;

const DEFAULT_FILTER: &str = "info";

/// Installs `env_logger` as the global logger.
///
/// `RUST_LOG` selects the levels, `info` when unset.
pub fn init() -> Result<(), SetLoggerError> {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER)).try_init()
}
