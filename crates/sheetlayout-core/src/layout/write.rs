//! Serializing a placed sheet into a sink.

use crate::context::Context;
use crate::element::{CellValue, Element};
use crate::error::Result;
use crate::formula::FormulaWriter;
use crate::storage::{SheetHandle, WorkbookSink};
use std::collections::BTreeMap;

/// Write every cell under `root`, then column widths, row heights and
/// autofit. Returns the number of cells written.
pub fn write_cells(
    root: &Element,
    sheet: SheetHandle,
    sheet_title: &str,
    ctx: &Context,
    sink: &mut dyn WorkbookSink,
) -> Result<usize> {
    let mut widths: BTreeMap<usize, f64> = BTreeMap::new();
    let mut heights: BTreeMap<usize, f64> = BTreeMap::new();
    let mut autofit = false;
    let mut written = 0;

    for cell in root.leaf_cells() {
        let Some(loc) = cell.location() else {
            log::debug!("{} was never placed; skipping", cell.describe());
            continue;
        };
        cell.mark_written()?;
        if let Some(formula) = cell.formula() {
            let text = {
                let is_builtin = |name: &str| sink.is_builtin_function(name);
                FormulaWriter::new(sheet_title, ctx, &is_builtin).cell_formula(&formula)?
            };
            cell.set_value(CellValue::Formula(text));
        }

        let value = cell.value();
        let style = cell.cell_style();
        let (rows, cols) = cell.merge_span();
        if rows > 1 || cols > 1 {
            sink.merge_cells(
                sheet,
                (loc.row, loc.col),
                (loc.row + rows - 1, loc.col + cols - 1),
                &value,
                &style,
            )?;
        } else {
            sink.write_cell(sheet, loc.row, loc.col, &value, &style)?;
        }
        written += 1;

        if let Some(width) = style.col_width {
            let entry = widths.entry(loc.col).or_insert(width);
            *entry = entry.max(width);
        }
        if let Some(height) = style.row_height {
            let entry = heights.entry(loc.row).or_insert(height);
            *entry = entry.max(height);
        }
        autofit |= style.autofit == Some(true);
    }

    for (col, width) in widths {
        sink.set_column_width(sheet, col, width)?;
    }
    for (row, height) in heights {
        sink.set_row_height(sheet, row, height)?;
    }
    if autofit {
        sink.autofit(sheet)?;
    }
    Ok(written)
}
