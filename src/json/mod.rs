//! Defensive JSON helpers.
//!
//! - [`safe_stringify`] never fails: encoding errors come back as the result
//!   string instead of JSON.
//! - [`read_json_file`] never fails: a missing, unreadable or malformed file is
//!   `None`. [`load_json_file`] is the same read with the failure kept.
//! - [`write_json_file`] propagates filesystem errors to the caller.

mod sanitize;

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use tracing::{debug, trace};

use crate::error::AppError;

use sanitize::Sanitized;
pub use sanitize::{MAX_DEPTH, MAX_SAFE_INTEGER};

/// Indent used by [`write_json_file`].
pub const DEFAULT_INDENT: usize = 2;

/// Indents above this many spaces are clamped.
pub const MAX_INDENT: usize = 10;

/// Serialize `value` to JSON text, indenting nested levels by `indent` spaces
/// (`0` gives compact output).
///
/// Integers outside `±(2^53 - 1)` are written as decimal strings. If encoding
/// fails (a reference cycle, non-string map keys, a failing `Serialize` impl)
/// the error message is returned in place of the JSON text.
pub fn safe_stringify<T: Serialize + ?Sized>(value: &T, indent: usize) -> String {
    let encoded = match indent.min(MAX_INDENT) {
        0 => encode(value, CompactFormatter),
        n => {
            let pad = " ".repeat(n);
            encode(value, PrettyFormatter::with_indent(pad.as_bytes()))
        }
    };
    encoded.unwrap_or_else(|e| e.to_string())
}

fn encode<T, F>(value: &T, formatter: F) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    Sanitized::root(value).serialize(&mut ser)?;
    String::from_utf8(buf).map_err(serde_json::Error::custom)
}

/// Read and parse the JSON document at `path`.
///
/// `Ok(None)` when no file exists. Unreadable files surface as
/// [`AppError::Io`], parse failures (including a document that does not fit
/// `T`) as [`AppError::Json`].
pub fn load_json_file<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<Option<T>, AppError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Read and parse the JSON document at `path`, or `None` if there is nothing
/// usable there. Missing and malformed files look the same to the caller.
pub fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Option<T> {
    let path = path.as_ref();
    load_json_file(path).unwrap_or_else(|e| {
        debug!(path = %path.display(), error = %e, "ignoring unreadable json file");
        None
    })
}

/// Write `safe_stringify(value, 2)` to `path`, creating or truncating it.
pub fn write_json_file<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
) -> Result<(), AppError> {
    let path = path.as_ref();
    let text = safe_stringify(value, DEFAULT_INDENT);
    fs::write(path, &text)?;
    trace!(path = %path.display(), bytes = text.len(), "json file written");
    Ok(())
}
