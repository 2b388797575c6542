//! Error types for sheetlayout core.

use sheetlayout_engine::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or writing a workbook.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid id {0:?}: ids must be non-empty and must not contain '[' or ']'")]
    InvalidId(String),

    #[error("Invalid border: {0}")]
    InvalidBorder(String),

    #[error("Invalid color {0:?}: expected exactly 6 hex digits, e.g. \"FFEE00\"")]
    InvalidColor(String),

    #[error("Invalid spacing: expected 1 to 4 values, got {0}")]
    InvalidSpacing(usize),

    #[error("A {container} cannot hold a {child}")]
    IncompatibleChild {
        container: &'static str,
        child: &'static str,
    },

    #[error("Invalid function name {0:?}: expected letters, digits, '.' or '_', starting with a letter")]
    InvalidFunctionName(String),

    #[error("Function call {0} cannot take another function call as an operand; use a template string instead")]
    NestedFunctionCall(String),

    #[error(
        "Could not resolve {template:?}: no element answers to {}{}.\n\
         Place the target element on a sheet so it resolves earlier, \
         or register it with a global id (`G::name`) so it survives sheet isolation.",
        keys.join(", "),
        cycle.as_ref().map(|c| format!(" (circular reference: {})", c.join(" -> "))).unwrap_or_default()
    )]
    UnresolvedReference {
        template: String,
        keys: Vec<String>,
        cycle: Option<Vec<String>>,
    },

    #[error("Cannot do arithmetic on expression {0:?} before it is resolved")]
    ArithmeticOnPendingExpression(String),

    #[error("Cannot do arithmetic on function call {0} before it is resolved")]
    ArithmeticOnPendingFunction(String),

    #[error("Cannot do arithmetic on a Stack; reference its vectors or frames instead")]
    ArithmeticOnStack,

    #[error("Cannot reference a Gap")]
    ArithmeticOnGap,

    #[error("Index {index} out of range for {kind} of length {len}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("No child named {0:?}")]
    UnknownChild(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Function {0} cannot produce a two-dimensional result")]
    UnsupportedFunctionDimension(String),

    #[error(
        "Formula references a cell that is never placed on any sheet ({0}); \
         add the element to a sheet or turn off strict references"
    )]
    MissingReference(String),

    #[error("Cell {0} has already been written; an element can only be written once")]
    AlreadyWritten(String),

    #[error("Invalid sheet name {0:?}: names are 1-31 characters and may not contain : \\ / ? * [ ]")]
    InvalidSheetName(String),

    #[error("Table name {0:?} is already in use")]
    DuplicateTableName(String),

    #[error("Could not find a free table name starting from {name:?} after {attempts} attempts: {last}")]
    TableNameCollision {
        name: String,
        attempts: usize,
        #[source]
        last: Box<SheetError>,
    },

    #[error("Cell ({row}, {col}) is outside the worksheet")]
    CellOutOfRange { row: usize, col: usize },

    #[error(
        "Auto-open failed for {}: {message}. If the file is open in another program \
         (or locked by a sync client), close it and try again, or turn auto-open off.",
        path.display()
    )]
    AutoOpen { path: PathBuf, message: String },

    #[error("XLSX writer error: {0}")]
    Writer(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
