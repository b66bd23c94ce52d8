//! Defensive JSON file helpers, an async delay and a `.env` bootstrap.
//!
//! - **json** — [`safe_stringify`], [`read_json_file`], [`write_json_file`].
//! - **delay** — [`delay`] / [`delay_ms`] over the Tokio timer.
//! - **env** — run-once `.env` loading into the process environment.
//! - **config** — settings read by this crate and the shared config container.
//! - **bootstrap** — env, settings and logger in startup order.

pub mod bootstrap;
pub mod config;
pub mod delay;
pub mod env;
pub mod error;
pub mod json;
pub mod logger;

pub use delay::{delay, delay_ms};
pub use env::Environment;
pub use error::AppError;
pub use json::{load_json_file, read_json_file, safe_stringify, write_json_file};
