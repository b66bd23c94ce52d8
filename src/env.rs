//! `.env` bootstrap.
//!
//! [`Environment`] is the merged view of the process environment and the
//! `.env` file in the working directory, with process values taking
//! precedence. [`init`] builds it once, copies the file-only keys into the
//! process environment and hands out the same snapshot afterwards.
//!
//! A missing file is normal and silent. An unreadable file is logged and
//! treated as missing, a bad line is logged and skipped; startup never fails
//! here.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::error::AppError;

/// File read by [`init`], relative to the current working directory.
pub const ENV_FILE: &str = ".env";

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Merged, immutable view of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    /// Keys that came from the file because the process did not define them.
    added: BTreeSet<String>,
}

impl Environment {
    /// Merge `os` and `file` pairs. Keys present in `os` keep their value;
    /// file keys fill the gaps. Within the file the first assignment of a key
    /// wins, as it does when dotenvy loads the file itself.
    pub fn merge<O, F>(os: O, file: F) -> Self
    where
        O: IntoIterator<Item = (String, String)>,
        F: IntoIterator<Item = (String, String)>,
    {
        let mut vars: BTreeMap<String, String> = os.into_iter().collect();
        let mut added = BTreeSet::new();
        for (key, value) in file {
            if vars.contains_key(&key) {
                continue;
            }
            added.insert(key.clone());
            vars.insert(key, value);
        }
        Self { vars, added }
    }

    /// Merge the current process environment with the file at `path`.
    /// Variables whose name or value is not valid Unicode are left out.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = read_env_file(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring env file");
            Vec::new()
        });
        let os = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::merge(os, file)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys supplied by the file, in key order.
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.added.iter().map(String::as_str)
    }
}

/// Parse a `KEY=VALUE` file. A missing file is an empty list. Lines that do
/// not parse are logged and skipped; every other pair is kept. Only a read
/// failure fails the whole file.
pub fn read_env_file(path: impl AsRef<Path>) -> Result<Vec<(String, String)>, AppError> {
    let path = path.as_ref();
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(Vec::new()),
        Err(e) => {
            return Err(AppError::Env(format!("cannot read {}: {e}", path.display())));
        }
    };

    let mut pairs = Vec::new();
    for item in iter {
        match item {
            Ok(pair) => pairs.push(pair),
            Err(dotenvy::Error::Io(e)) => {
                return Err(AppError::Env(format!("cannot read {}: {e}", path.display())));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping env file line"),
        }
    }
    Ok(pairs)
}

/// Copy the file-supplied keys of `environment` into the process environment,
/// skipping any key the process already defines.
///
/// # Safety
///
/// No other thread may read or write the process environment while this
/// runs. Only [`init`] calls it, from inside its `OnceLock` initialiser.
unsafe fn apply_to_process(environment: &Environment) {
    for key in environment.added() {
        if env::var_os(key).is_some() {
            continue;
        }
        let Some(value) = environment.get(key) else {
            continue;
        };
        if !settable(key, value) {
            warn!(key, "skipping env key that cannot be set");
            continue;
        }
        // SAFETY: upheld by the caller, see above.
        unsafe { env::set_var(key, value) };
    }
}

/// `set_var` panics on these.
fn settable(key: &str, value: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0']) && !value.contains('\0')
}

/// Load `./.env` into the process environment once and return the merged
/// snapshot. Every later call returns the same snapshot without touching the
/// file or the environment again.
///
/// Call it first thing in `main`, before spawning threads or building a
/// multi-threaded runtime.
pub fn init() -> &'static Environment {
    ENVIRONMENT.get_or_init(|| {
        let environment = Environment::load(ENV_FILE);
        // SAFETY: the OnceLock runs this once; callers invoke `init` before
        // any other thread touches the environment.
        unsafe { apply_to_process(&environment) };
        debug!(
            file = ENV_FILE,
            added = environment.added().count(),
            "environment initialised"
        );
        environment
    })
}
