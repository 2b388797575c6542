//! `.xlsx` output over `rust_xlsxwriter`.

use crate::element::CellValue;
use crate::error::{Result, SheetError};
use crate::storage::{SheetHandle, SheetOptions, TableSpec, WorkbookSink};
use crate::style::{Align, BorderSide, BorderWeight, CellStyle, Color, VAlign};
use rust_xlsxwriter::{
    ColNum, Format, FormatAlign, FormatBorder, FormatUnderline, RowNum, Table, TableColumn,
    TableStyle, Workbook, Worksheet,
};
use std::collections::HashSet;
use std::path::Path;

/// Writes through an in-memory `rust_xlsxwriter` workbook, saved on
/// [`WorkbookSink::save`].
pub struct XlsxSink {
    workbook: Workbook,
    sheets: usize,
    /// Lowercased table names already defined in the workbook.
    table_names: HashSet<String>,
}

impl XlsxSink {
    pub fn new() -> XlsxSink {
        XlsxSink {
            workbook: Workbook::new(),
            sheets: 0,
            table_names: HashSet::new(),
        }
    }

    fn sheet(&mut self, handle: SheetHandle) -> Result<&mut Worksheet> {
        Ok(self.workbook.worksheet_from_index(handle)?)
    }
}

impl Default for XlsxSink {
    fn default() -> Self {
        XlsxSink::new()
    }
}

fn cell_index(row: usize, col: usize) -> Result<(RowNum, ColNum)> {
    match (RowNum::try_from(row), ColNum::try_from(col)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(SheetError::CellOutOfRange { row, col }),
    }
}

fn xlsx_color(color: Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(color.value())
}

fn xlsx_border(weight: BorderWeight) -> FormatBorder {
    match weight {
        BorderWeight::Thin => FormatBorder::Thin,
        BorderWeight::Medium => FormatBorder::Medium,
        BorderWeight::Thick => FormatBorder::Thick,
        BorderWeight::Double => FormatBorder::Double,
        BorderWeight::Hair => FormatBorder::Hair,
        BorderWeight::Dashed => FormatBorder::Dashed,
        BorderWeight::Dotted => FormatBorder::Dotted,
        BorderWeight::MediumDashed => FormatBorder::MediumDashed,
        BorderWeight::DashDot => FormatBorder::DashDot,
        BorderWeight::MediumDashDot => FormatBorder::MediumDashDot,
        BorderWeight::DashDotDot => FormatBorder::DashDotDot,
        BorderWeight::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderWeight::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

/// Map a resolved cell style onto a writer format.
pub fn format_for(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold == Some(true) {
        format = format.set_bold();
    }
    if style.italic == Some(true) {
        format = format.set_italic();
    }
    if style.underline == Some(true) {
        format = format.set_underline(FormatUnderline::Single);
    }
    if let Some(name) = &style.font_name {
        format = format.set_font_name(name);
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(xlsx_color(color));
    }
    if let Some(color) = style.fill_color {
        format = format.set_background_color(xlsx_color(color));
    }
    if let Some(align) = style.align {
        format = format.set_align(match align {
            Align::Left => FormatAlign::Left,
            Align::Center => FormatAlign::Center,
            Align::Right => FormatAlign::Right,
            Align::Fill => FormatAlign::Fill,
            Align::Justify => FormatAlign::Justify,
        });
    }
    if let Some(valign) = style.valign {
        format = format.set_align(match valign {
            VAlign::Top => FormatAlign::Top,
            VAlign::Center => FormatAlign::VerticalCenter,
            VAlign::Bottom => FormatAlign::Bottom,
        });
    }
    if let Some(indent) = style.indent {
        format = format.set_indent(indent);
    }
    if style.wrap == Some(true) {
        format = format.set_text_wrap();
    }
    if let Some(number_format) = &style.number_format {
        format = format.set_num_format(number_format);
    }

    if let BorderSide::Line { weight, color } = style.border.top {
        format = format
            .set_border_top(xlsx_border(weight))
            .set_border_top_color(xlsx_color(color));
    }
    if let BorderSide::Line { weight, color } = style.border.right {
        format = format
            .set_border_right(xlsx_border(weight))
            .set_border_right_color(xlsx_color(color));
    }
    if let BorderSide::Line { weight, color } = style.border.bottom {
        format = format
            .set_border_bottom(xlsx_border(weight))
            .set_border_bottom_color(xlsx_color(color));
    }
    if let BorderSide::Line { weight, color } = style.border.left {
        format = format
            .set_border_left(xlsx_border(weight))
            .set_border_left_color(xlsx_color(color));
    }
    format
}

macro_rules! table_styles {
    ($($name:ident),+ $(,)?) => {
        /// Built-in table style by name, e.g. `"Medium9"` or
        /// `"TableStyleLight1"`. Case-insensitive.
        pub fn table_style(name: &str) -> Option<TableStyle> {
            let bare = name
                .strip_prefix("TableStyle")
                .or_else(|| name.strip_prefix("tablestyle"))
                .unwrap_or(name);
            $(
                if bare.eq_ignore_ascii_case(stringify!($name)) {
                    return Some(TableStyle::$name);
                }
            )+
            None
        }
    };
}

table_styles!(
    None, Light1, Light2, Light3, Light4, Light5, Light6, Light7, Light8, Light9, Light10,
    Light11, Light12, Light13, Light14, Light15, Light16, Light17, Light18, Light19, Light20,
    Light21, Medium1, Medium2, Medium3, Medium4, Medium5, Medium6, Medium7, Medium8, Medium9,
    Medium10, Medium11, Medium12, Medium13, Medium14, Medium15, Medium16, Medium17, Medium18,
    Medium19, Medium20, Medium21, Medium22, Medium23, Medium24, Medium25, Medium26, Medium27,
    Medium28, Dark1, Dark2, Dark3, Dark4, Dark5, Dark6, Dark7, Dark8, Dark9, Dark10, Dark11,
);

fn write_value(
    sheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: &CellValue,
    format: &Format,
    style_is_unset: bool,
) -> Result<()> {
    match value {
        CellValue::Empty => {
            if !style_is_unset {
                sheet.write_blank(row, col, format)?;
            }
        }
        CellValue::Bool(b) => {
            sheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::Number(n) => {
            sheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(s) => {
            sheet.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Formula(text) => {
            let body = text.strip_prefix('=').unwrap_or(text);
            sheet.write_formula_with_format(row, col, body, format)?;
        }
    }
    Ok(())
}

impl WorkbookSink for XlsxSink {
    fn create_sheet(&mut self, name: &str) -> Result<SheetHandle> {
        self.workbook.add_worksheet().set_name(name)?;
        let handle = self.sheets;
        self.sheets += 1;
        Ok(handle)
    }

    fn configure_sheet(&mut self, sheet: SheetHandle, options: &SheetOptions) -> Result<()> {
        let ws = self.sheet(sheet)?;
        if let Some(color) = options.tab_color {
            ws.set_tab_color(xlsx_color(color));
        }
        if let Some(zoom) = options.zoom {
            ws.set_zoom(zoom);
        }
        if options.hidden {
            ws.set_hidden(true);
        }
        if options.active {
            ws.set_active(true);
        }
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
        let (r, c) = cell_index(row, col)?;
        let format = format_for(style);
        write_value(self.sheet(sheet)?, r, c, value, &format, style.is_unset())
    }

    fn merge_cells(
        &mut self,
        sheet: SheetHandle,
        first: (usize, usize),
        last: (usize, usize),
        value: &CellValue,
        style: &CellStyle,
    ) -> Result<()> {
        let (r1, c1) = cell_index(first.0, first.1)?;
        let (r2, c2) = cell_index(last.0, last.1)?;
        let format = format_for(style);
        let ws = self.sheet(sheet)?;
        // merge_range only takes text; other values overwrite the origin cell.
        match value {
            CellValue::Text(s) => {
                ws.merge_range(r1, c1, r2, c2, s, &format)?;
            }
            other => {
                ws.merge_range(r1, c1, r2, c2, "", &format)?;
                write_value(ws, r1, c1, other, &format, true)?;
            }
        }
        Ok(())
    }

    fn set_column_width(&mut self, sheet: SheetHandle, col: usize, width: f64) -> Result<()> {
        let (_, c) = cell_index(0, col)?;
        self.sheet(sheet)?.set_column_width(c, width)?;
        Ok(())
    }

    fn set_row_height(&mut self, sheet: SheetHandle, row: usize, height: f64) -> Result<()> {
        let (r, _) = cell_index(row, 0)?;
        self.sheet(sheet)?.set_row_height(r, height)?;
        Ok(())
    }

    fn autofit(&mut self, sheet: SheetHandle) -> Result<()> {
        self.sheet(sheet)?.autofit();
        Ok(())
    }

    fn define_table(&mut self, sheet: SheetHandle, table: &TableSpec) -> Result<()> {
        let key = table.name.to_lowercase();
        if self.table_names.contains(&key) {
            return Err(SheetError::DuplicateTableName(table.name.clone()));
        }
        let (r1, c1) = cell_index(table.first.0, table.first.1)?;
        let (r2, c2) = cell_index(table.last.0, table.last.1)?;

        let columns: Vec<TableColumn> = table
            .headers
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let options = &table.options;
        let mut xlsx_table = Table::new()
            .set_name(&table.name)
            .set_columns(&columns)
            .set_banded_rows(options.banded_rows.unwrap_or(true))
            .set_banded_columns(options.banded_columns.unwrap_or(false))
            .set_autofilter(options.autofilter.unwrap_or(true));
        if let Some(style) = &options.style {
            match table_style(style) {
                Some(style) => xlsx_table = xlsx_table.set_style(style),
                None => log::warn!("unknown table style {:?}; using the default", style),
            }
        }

        self.sheet(sheet)?.add_table(r1, c1, r2, c2, &xlsx_table)?;
        self.table_names.insert(key);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.workbook.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::TableOptions;
    use tempfile::tempdir;

    #[test]
    fn test_table_style_lookup() {
        assert!(table_style("Medium9") == Some(TableStyle::Medium9));
        assert!(table_style("tablestylelight1") == Some(TableStyle::Light1));
        assert!(table_style("Pastel").is_none());
    }

    #[test]
    fn test_duplicate_table_names_are_rejected() {
        let mut sink = XlsxSink::new();
        let sheet = sink.create_sheet("Data").unwrap();
        let spec = TableSpec {
            first: (0, 0),
            last: (2, 0),
            name: "Data".to_string(),
            options: TableOptions::new(),
            headers: vec!["A".to_string()],
        };
        sink.define_table(sheet, &spec).unwrap();
        let again = TableSpec {
            first: (0, 2),
            last: (2, 2),
            name: "DATA".to_string(),
            ..spec
        };
        assert!(matches!(
            sink.define_table(sheet, &again),
            Err(SheetError::DuplicateTableName(_))
        ));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut sink = XlsxSink::new();
        let sheet = sink.create_sheet("Sheet1").unwrap();
        let bold = CellStyle::new().bold(true);
        sink.write_cell(sheet, 0, 0, &CellValue::Text("x".to_string()), &bold)
            .unwrap();
        sink.write_cell(sheet, 1, 0, &CellValue::Formula("=A1 & \"y\"".to_string()), &CellStyle::new())
            .unwrap();
        sink.merge_cells(sheet, (2, 0), (2, 2), &CellValue::Number(3.0), &CellStyle::new())
            .unwrap();
        sink.save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_out_of_range_cell() {
        let mut sink = XlsxSink::new();
        let sheet = sink.create_sheet("S").unwrap();
        let err = sink
            .write_cell(sheet, 0, 70_000, &CellValue::Number(1.0), &CellStyle::new())
            .unwrap_err();
        assert!(matches!(err, SheetError::CellOutOfRange { col: 70_000, .. }));
    }
}
