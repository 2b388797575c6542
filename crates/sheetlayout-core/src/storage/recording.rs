//! In-memory sink.

use crate::element::CellValue;
use crate::error::{Result, SheetError};
use crate::storage::{SheetHandle, SheetOptions, TableSpec, WorkbookSink};
use crate::style::CellStyle;
use sheetlayout_engine::engine::Location;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default)]
pub struct RecordedSheet {
    pub name: String,
    pub options: SheetOptions,
    /// Keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), (CellValue, CellStyle)>,
    pub merges: Vec<((usize, usize), (usize, usize))>,
    pub column_widths: BTreeMap<usize, f64>,
    pub row_heights: BTreeMap<usize, f64>,
    pub autofit: bool,
    pub tables: Vec<RecordedTable>,
}

impl RecordedSheet {
    pub fn value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells.get(&(row, col)).map(|(value, _)| value)
    }

    pub fn style(&self, row: usize, col: usize) -> Option<&CellStyle> {
        self.cells.get(&(row, col)).map(|(_, style)| style)
    }

    /// Value at an A1 address such as `"B2"`.
    pub fn at(&self, a1: &str) -> Option<&CellValue> {
        let loc = Location::parse_a1(&self.name, a1)?;
        self.value(loc.row, loc.col)
    }
}

pub type RecordedTable = TableSpec;

/// Records every call. Used by tests and `--dry-run`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sheets: Vec<RecordedSheet>,
    pub saved_to: Option<PathBuf>,
    table_names: HashSet<String>,
}

impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&RecordedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn get(&mut self, handle: SheetHandle) -> Result<&mut RecordedSheet> {
        self.sheets
            .get_mut(handle)
            .ok_or_else(|| SheetError::InvalidSheetName(format!("#{}", handle)))
    }

    /// Plain-text listing of every sheet, one cell per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for sheet in &self.sheets {
            let _ = writeln!(out, "== {} ==", sheet.name);
            for ((row, col), (value, _)) in &sheet.cells {
                if value.is_empty() {
                    continue;
                }
                let a1 = Location::new(sheet.name.as_str(), *row, *col).a1();
                let _ = writeln!(out, "{}: {}", a1, value);
            }
            for table in &sheet.tables {
                let first = Location::new(sheet.name.as_str(), table.first.0, table.first.1);
                let last = Location::new(sheet.name.as_str(), table.last.0, table.last.1);
                let _ = writeln!(out, "table {} {}:{}", table.name, first.a1(), last.a1());
            }
        }
        out
    }
}

impl WorkbookSink for RecordingSink {
    fn create_sheet(&mut self, name: &str) -> Result<SheetHandle> {
        self.sheets.push(RecordedSheet {
            name: name.to_string(),
            ..RecordedSheet::default()
        });
        Ok(self.sheets.len() - 1)
    }

    fn configure_sheet(&mut self, sheet: SheetHandle, options: &SheetOptions) -> Result<()> {
        self.get(sheet)?.options = options.clone();
        Ok(())
    }

    fn write_cell(
        &mut self,
        sheet: SheetHandle,
        row: usize,
        col: usize,
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<()> {
        self.get(sheet)?
            .cells
            .insert((row, col), (value.clone(), style.clone()));
        Ok(())
    }

    fn merge_cells(
        &mut self,
        sheet: SheetHandle,
        first: (usize, usize),
        last: (usize, usize),
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<()> {
        let recorded = self.get(sheet)?;
        recorded.merges.push((first, last));
        recorded.cells.insert(first, (value.clone(), style.clone()));
        Ok(())
    }

    fn set_column_width(&mut self, sheet: SheetHandle, col: usize, width: f64) -> Result<()> {
        self.get(sheet)?.column_widths.insert(col, width);
        Ok(())
    }

    fn set_row_height(&mut self, sheet: SheetHandle, row: usize, height: f64) -> Result<()> {
        self.get(sheet)?.row_heights.insert(row, height);
        Ok(())
    }

    fn autofit(&mut self, sheet: SheetHandle) -> Result<()> {
        self.get(sheet)?.autofit = true;
        Ok(())
    }

    fn define_table(&mut self, sheet: SheetHandle, table: &TableSpec) -> Result<()> {
        if !self.table_names.insert(table.name.to_lowercase()) {
            return Err(SheetError::DuplicateTableName(table.name.clone()));
        }
        self.get(sheet)?.tables.push(table.clone());
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.saved_to = Some(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_cells_in_order() {
        let mut sink = RecordingSink::new();
        let s = sink.create_sheet("Sheet1").unwrap();
        let plain = CellStyle::new();
        sink.write_cell(s, 1, 0, &CellValue::Number(2.0), &plain).unwrap();
        sink.write_cell(s, 0, 0, &CellValue::Text("a".to_string()), &plain).unwrap();
        sink.write_cell(s, 0, 1, &CellValue::Empty, &plain).unwrap();
        assert_eq!(sink.render(), "== Sheet1 ==\nA1: a\nA2: 2\n");
        assert_eq!(sink.sheet("Sheet1").unwrap().at("A2"), Some(&CellValue::Number(2.0)));
    }
}
