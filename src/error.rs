//! Error types for the sheetlayout binary

use sheetlayout_core::SheetError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading layout and config files
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to read {}: file too large ({size} bytes, max {max})", path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported value {0}: expected a number, string or boolean")]
    InvalidValue(String),

    #[error("Malformed function call {0:?}: expected @NAME(arg, ...)")]
    InvalidCall(String),

    #[error("A {kind} block cannot set {field}")]
    UnexpectedField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Sheet {sheet}, block {block}: {message}")]
    Block {
        sheet: String,
        block: usize,
        message: String,
    },

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, CliError>;
