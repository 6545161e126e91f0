//! File round trips.
//!
//! Reading and writing are whole-file and UTF-8. Text is written exactly as
//! given; the caller decides about trailing newlines.

use std::fs;
use std::path::Path;

use crate::error::{FileAction, FileError};

/// Read the whole file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_file(path: &Path) -> Result<String, FileError> {
    let text =
        fs::read_to_string(path).map_err(|e| FileError::new(FileAction::Read, path, e))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "file read");
    Ok(text)
}

/// Replace the file at `path` with `text`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_file(path: &Path, text: &str) -> Result<(), FileError> {
    fs::write(path, text).map_err(|e| FileError::new(FileAction::Write, path, e))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "file written");
    Ok(())
}
