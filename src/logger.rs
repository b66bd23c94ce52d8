//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events. Hosts that want them printed call
//! [`init`] once, which [`crate::bootstrap::run`] does after settings resolve.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global fmt subscriber on stderr. `RUST_LOG` wins when it
/// parses; otherwise `level` is the filter.
pub fn init(level: &str) -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn filter(level: &str) -> Result<EnvFilter, AppError> {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    EnvFilter::try_new(level)
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}

/// Validate a bare level string (`error`, `warn`, `info`, `debug`, `trace`,
/// `off`). Directive syntax such as `jsonenv=debug` is rejected.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    match level {
        "" => Err(AppError::Logger("log level must not be empty".into())),
        _ => level
            .parse()
            .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'"))),
    }
}
