//! Small helpers for the JSON files kept under the data directory
//! (`ui_elements.json`, `persistent_messages.json`, `roles.json`).
//!
//! Files are read and written whole and synchronously, without atomic replace.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};

/// Errors that can occur while reading or writing a JSON file.
#[derive(Error, Debug)]
pub enum JsonStoreError {
    /// Filesystem failure.
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not hold the expected JSON.
    #[error("Unable to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and parses a JSON file.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn try_load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, JsonStoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(JsonStoreError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| JsonStoreError::Json {
            path: path.display().to_string(),
            source,
        })
}

/// Reads a JSON file, falling back to `T::default()` when it is missing or unreadable.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    match try_load_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!("{} not found, using an empty default", path.display());
            T::default()
        }
        Err(e) => {
            error!("{}, using an empty default", e);
            T::default()
        }
    }
}

/// Serializes `value` to `path` with four-space indentation, creating parent directories.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), JsonStoreError> {
    let io_err = |source| JsonStoreError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|source| JsonStoreError::Json {
            path: path.display().to_string(),
            source,
        })?;

    fs::write(path, buffer).map_err(io_err)
}
