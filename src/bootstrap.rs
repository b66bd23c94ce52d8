//! Startup sequence for hosts embedding this crate.
//!
//!   1. Load `.env` into the process environment (never fails)
//!   2. Resolve settings from the merged environment
//!   3. Init logger (`RUST_LOG` wins over `JSONENV_LOG_LEVEL`)

use tracing::info;

use crate::config::Settings;
use crate::env;
use crate::error::AppError;
use crate::logger;

pub fn run() -> Result<Settings, AppError> {
    let environment = env::init();
    let settings = Settings::from_env(environment)?;

    logger::init(&settings.log_level)?;

    info!(
        env_file = env::ENV_FILE,
        added = environment.added().count(),
        log_level = %settings.log_level,
        "environment ready"
    );
    Ok(settings)
}
