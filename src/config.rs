//! Settings resolved from the environment, and the shared config container.
//!
//! [`Settings`] holds what this crate itself reads from the environment.
//! [`shared`] is a process-wide key/value container left empty at startup for
//! downstream code to attach derived configuration to.

use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};

use crate::env::Environment;
use crate::error::AppError;
use crate::logger;

/// Log level override read by [`Settings::from_env`].
pub const LOG_LEVEL_VAR: &str = "JSONENV_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Lower-cased, validated level string.
    pub log_level: String,
}

impl Settings {
    pub fn from_env(environment: &Environment) -> Result<Self, AppError> {
        let log_level = environment
            .get(LOG_LEVEL_VAR)
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .trim()
            .to_ascii_lowercase();
        logger::parse_level(&log_level)
            .map_err(|e| AppError::Config(format!("{LOG_LEVEL_VAR}: {e}")))?;
        Ok(Self { log_level })
    }
}

/// Thread-safe JSON key/value map.
#[derive(Debug, Default)]
pub struct SharedConfig {
    values: RwLock<Map<String, Value>>,
}

impl SharedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.read().clone()
    }

    // The map holds plain data, so a writer that panicked cannot leave it
    // half-updated in a way that matters; recover instead of propagating.
    fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Map<String, Value>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The process-wide container. Empty until someone calls [`SharedConfig::set`].
pub fn shared() -> &'static SharedConfig {
    static SHARED: OnceLock<SharedConfig> = OnceLock::new();
    SHARED.get_or_init(SharedConfig::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_with(pairs: &[(&str, &str)]) -> Environment {
        Environment::merge(
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
            Vec::new(),
        )
    }

    #[test]
    fn log_level_defaults_to_info() {
        let settings = Settings::from_env(&env_with(&[])).unwrap();
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn log_level_override_is_normalised() {
        let settings = Settings::from_env(&env_with(&[(LOG_LEVEL_VAR, " DEBUG ")])).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn invalid_log_level_is_config_error() {
        let err = Settings::from_env(&env_with(&[(LOG_LEVEL_VAR, "verbose")])).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains(LOG_LEVEL_VAR)));
    }

    #[test]
    fn shared_container_starts_empty() {
        assert!(shared().is_empty());
        assert!(std::ptr::eq(shared(), shared()));
    }

    #[test]
    fn set_get_remove() {
        let cfg = SharedConfig::new();
        assert_eq!(cfg.set("port", 8080), None);
        assert_eq!(cfg.set("port", 9090), Some(json!(8080)));
        assert_eq!(cfg.get("port"), Some(json!(9090)));
        assert_eq!(cfg.len(), 1);

        cfg.set("name", "svc");
        assert_eq!(cfg.snapshot().len(), 2);

        assert_eq!(cfg.remove("port"), Some(json!(9090)));
        assert_eq!(cfg.get("port"), None);
        assert_eq!(cfg.remove("port"), None);
    }
}
