//! Startup sequence. Kept in its own binary because it installs the global
//! tracing subscriber.

use jsonenv::AppError;
use jsonenv::{bootstrap, config, env};

#[test]
fn test_bootstrap_runs_once() {
    let settings = bootstrap::run().unwrap();
    assert!(jsonenv::logger::parse_level(&settings.log_level).is_ok());

    // The environment snapshot is fixed; the subscriber cannot be set twice.
    assert!(std::ptr::eq(env::init(), env::init()));
    assert!(matches!(bootstrap::run(), Err(AppError::Logger(_))));

    assert!(config::shared().is_empty());
}
