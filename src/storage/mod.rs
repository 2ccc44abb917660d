//! Sidecar persistence.
//!
//! Reading is tolerant per record and strict per document: a record with the
//! wrong shape is dropped with a warning, but a file that is not a JSON
//! object fails the whole read. Writing replaces the sidecar atomically via a
//! temporary file in the same directory.

use crate::models::{ConfigEntry, ConfigFile, SIDECAR_FILE_NAME};
use crate::{Error, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Load the sidecar governing `directory`.
///
/// Returns `Ok(None)` when `<directory>/.config` is missing or is not a
/// regular file.
pub fn read_config(directory: &Path) -> Result<Option<ConfigFile>> {
    let sidecar_path = directory.join(SIDECAR_FILE_NAME);
    if !sidecar_path.is_file() {
        return Ok(None);
    }

    let raw = fs::read(&sidecar_path).map_err(|source| Error::Filesystem {
        path: sidecar_path.clone(),
        source,
    })?;
    let document: Value = serde_json::from_slice(&raw).map_err(|source| Error::Parse {
        path: sidecar_path.clone(),
        source,
    })?;

    let records = match document {
        Value::Object(records) => records,
        other => {
            return Err(Error::InvalidSidecar {
                path: sidecar_path,
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            });
        }
    };

    let mut config = ConfigFile::new(directory);
    for (filename, record) in &records {
        match parse_record(record) {
            Some(entry) => config.insert(filename.clone(), entry),
            None => warn!(
                sidecar = %sidecar_path.display(),
                filename = %filename,
                "dropping record without a string title and integer ordering"
            ),
        }
    }

    debug!(
        sidecar = %sidecar_path.display(),
        entries = config.len(),
        dropped = records.len() - config.len(),
        "read sidecar"
    );
    Ok(Some(config))
}

fn parse_record(record: &Value) -> Option<ConfigEntry> {
    let title = record.get("title")?.as_str()?;
    let ordering = record.get("ordering")?.as_i64()?;
    Some(ConfigEntry::new(title, ordering))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serialize `config.entries()` and atomically replace its sidecar.
///
/// An existing sidecar keeps its permissions.
pub fn write_config(config: &ConfigFile) -> Result<()> {
    let sidecar_path = config.sidecar_path();
    let fs_err = |source: io::Error| Error::Filesystem {
        path: sidecar_path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec(config.entries()).map_err(|e| fs_err(io::Error::from(e)))?;

    let mut staged = NamedTempFile::new_in(config.directory()).map_err(fs_err)?;
    staged.write_all(&json).map_err(fs_err)?;
    if let Ok(existing) = fs::metadata(sidecar_path) {
        staged
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(fs_err)?;
    }
    staged.as_file().sync_all().map_err(fs_err)?;
    staged
        .persist(sidecar_path)
        .map_err(|persist| fs_err(persist.error))?;

    debug!(sidecar = %sidecar_path.display(), bytes = json.len(), "wrote sidecar");
    Ok(())
}
