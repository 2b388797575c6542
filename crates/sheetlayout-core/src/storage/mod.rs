//! Output backends.
//!
//! The layout pipeline only ever talks to a [`WorkbookSink`]. Two sinks
//! ship with the crate:
//!
//! - [`XlsxSink`] writes a real `.xlsx` file through `rust_xlsxwriter`
//! - [`RecordingSink`] keeps everything in memory, for tests and dry runs

pub mod launch;
pub mod recording;
pub mod xlsx;

use crate::element::{CellValue, TableOptions};
use crate::error::Result;
use crate::style::{CellStyle, Color};
use std::path::Path;

pub use recording::{RecordedSheet, RecordedTable, RecordingSink};
pub use xlsx::XlsxSink;

/// Index of a sheet inside a sink, in creation order.
pub type SheetHandle = usize;

/// Sheet-level settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetOptions {
    pub tab_color: Option<Color>,
    /// Percent, 10 to 400.
    pub zoom: Option<u16>,
    pub hidden: bool,
    pub active: bool,
}

/// A table over a placed block, header row included.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSpec {
    /// `(row, col)` of the top-left header cell.
    pub first: (usize, usize),
    /// `(row, col)` of the bottom-right cell.
    pub last: (usize, usize),
    pub name: String,
    pub options: TableOptions,
    pub headers: Vec<String>,
}

/// The narrow contract the layout pipeline writes through.
pub trait WorkbookSink {
    fn create_sheet(&mut self, name: &str) -> Result<SheetHandle>;

    fn configure_sheet(&mut self, sheet: SheetHandle, options: &SheetOptions) -> Result<()>;

    fn write_cell(
        &mut self,
        sheet: SheetHandle,
        row: usize,
        col: usize,
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<()>;

    /// Merge `first..=last` and write `value` into the merged cell.
    fn merge_cells(
        &mut self,
        sheet: SheetHandle,
        first: (usize, usize),
        last: (usize, usize),
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<()>;

    fn set_column_width(&mut self, sheet: SheetHandle, col: usize, width: f64) -> Result<()>;

    fn set_row_height(&mut self, sheet: SheetHandle, row: usize, height: f64) -> Result<()>;

    fn autofit(&mut self, sheet: SheetHandle) -> Result<()>;

    /// Define a table. Fails with `DuplicateTableName` when the name is
    /// taken (names compare case-insensitively).
    fn define_table(&mut self, sheet: SheetHandle, table: &TableSpec) -> Result<()>;

    /// Functions the target application knows without a `_xlfn.` prefix.
    fn is_builtin_function(&self, name: &str) -> bool {
        sheetlayout_engine::builtins::is_builtin_function(name)
    }

    fn save(&mut self, path: &Path) -> Result<()>;
}
