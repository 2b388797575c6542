//! Opening the saved file in the platform viewer.

use crate::error::{Result, SheetError};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::Command;

fn auto_open_error(path: &Path, message: impl Into<String>) -> SheetError {
    SheetError::AutoOpen {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Fail early when an existing target cannot be opened for writing, which is
/// what a spreadsheet application holding the file looks like.
pub fn ensure_writable(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    OpenOptions::new()
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| auto_open_error(path, format!("the file cannot be opened for writing ({})", e)))
}

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Launch the platform opener and return without waiting for it.
pub fn open_file(path: &Path) -> Result<()> {
    log::info!("opening {}", path.display());
    opener(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| auto_open_error(path, format!("could not launch a viewer ({})", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_writable(&dir.path().join("new.xlsx")).is_ok());
    }

    #[test]
    fn test_existing_file_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.xlsx");
        std::fs::write(&path, b"x").unwrap();
        assert!(ensure_writable(&path).is_ok());
    }

    #[test]
    fn test_directory_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_writable(dir.path()).unwrap_err();
        assert!(matches!(err, SheetError::AutoOpen { .. }));
        assert!(err.to_string().contains("close it and try again"));
    }
}
