//! File I/O utilities with atomic writes
//!
//! Reads are soft (missing or corrupt means `None`); writes go through a
//! temp file and a rename so a crash never leaves a half-written file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::TallyError;

/// Read JSON from a file, returning `None` if it is missing or unparseable
///
/// Never fails: an unreadable file is logged and treated as absent.
pub fn read_json_soft<T, P>(path: P) -> Option<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return None;
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open file, treating as absent");
            return None;
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse file, treating as absent");
            None
        }
    }
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// This ensures that the file is either completely written or not modified at all,
/// preventing corruption on crashes or power failures.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), TallyError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| {
        TallyError::Storage(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    // Same directory as the target so the rename stays atomic. The name is
    // unique per writer and the file is deleted on drop unless persisted.
    let temp = NamedTempFile::new_in(parent)
        .map_err(|e| TallyError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(temp);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| TallyError::Storage(format!("Failed to serialize data: {}", e)))?;

    let temp = writer
        .into_inner()
        .map_err(|e| TallyError::Storage(format!("Failed to flush data: {}", e.error())))?;

    temp.as_file()
        .sync_all()
        .map_err(|e| TallyError::Storage(format!("Failed to sync data: {}", e)))?;

    temp.persist(path)
        .map_err(|e| TallyError::Storage(format!("Failed to rename temp file: {}", e.error)))?;

    Ok(())
}

/// Remove a file; returns whether anything was removed
pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<bool, TallyError> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TallyError::Storage(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}
