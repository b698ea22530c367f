// src/report.rs
//! Report writer. Refuses to replace an existing report unless forced.

use std::{fs, path::Path};
use tracing::{debug, info};

use crate::error::{MapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Target existed and `force` was off; nothing written.
    AlreadyExists,
    Written { bytes: usize, lines: usize },
}

/// Writes `text` to `path`, creating parent directories as needed.
pub fn write_report(path: &Path, text: &str, force: bool) -> Result<WriteOutcome> {
    if path.exists() && !force {
        debug!(path = %path.display(), "report exists, not overwriting");
        return Ok(WriteOutcome::AlreadyExists);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MapError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| MapError::io(path, e))?;

    let outcome = WriteOutcome::Written { bytes: text.len(), lines: text.lines().count() };
    info!(path = %path.display(), ?outcome, "report written");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_into_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs/maps/MAP.txt");
        let out = write_report(&path, "a\nb\n", false).unwrap();
        assert_eq!(out, WriteOutcome::Written { bytes: 4, lines: 2 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn existing_report_needs_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("MAP.txt");
        fs::write(&path, "old").unwrap();

        assert_eq!(write_report(&path, "new", false).unwrap(), WriteOutcome::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");

        assert!(matches!(write_report(&path, "new", true).unwrap(), WriteOutcome::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn unwritable_target_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        // a directory where the file should go
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        let err = write_report(&path, "x", true).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }
}
