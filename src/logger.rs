//! Logger

use log;

/// Initialize logger.
///
/// # Arguments
///
/// * `level` - Log level.
///
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init()
}
