//! Worksheets.

use crate::element::{Element, Gap, Orientation, Stack, TableOptions};
use crate::error::{Result, SheetError};
use crate::layout::Inherited;
use crate::style::{CellStyle, Color};

pub const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// Check a sheet title against the target application's rules.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.chars().count() > MAX_SHEET_NAME_LEN
        || name.contains(FORBIDDEN)
    {
        return Err(SheetError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

/// One worksheet: a vertical stack of blocks plus sheet-level settings.
/// Unset settings fall back to the workbook's.
pub struct Sheet {
    pub(crate) title: Option<String>,
    pub(crate) tab_color: Option<Color>,
    pub(crate) zoom: Option<u16>,
    pub(crate) hidden: bool,
    pub(crate) end_gap: usize,
    pub(crate) isolate: Option<bool>,
    pub(crate) background: Option<Color>,
    pub(crate) cell_style: CellStyle,
    pub(crate) header_style: CellStyle,
    pub(crate) table_style: TableOptions,
    pub(crate) root: Stack,
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet {
            title: None,
            tab_color: None,
            zoom: None,
            hidden: false,
            end_gap: 0,
            isolate: None,
            background: None,
            cell_style: CellStyle::default(),
            header_style: CellStyle::default(),
            table_style: TableOptions::default(),
            root: Stack::empty(Orientation::Vertical),
        }
    }

    pub fn titled(title: &str) -> Result<Sheet> {
        Sheet::new().title(title)
    }

    pub fn title(mut self, title: &str) -> Result<Self> {
        validate_sheet_name(title)?;
        self.title = Some(title.to_string());
        Ok(self)
    }

    pub fn tab_color(mut self, color: Color) -> Self {
        self.tab_color = Some(color);
        self
    }

    /// Zoom in percent, clamped to 10..=400.
    pub fn zoom(mut self, percent: u16) -> Self {
        self.zoom = Some(percent.clamp(10, 400));
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Blank rows appended below the last block.
    pub fn end_gap(mut self, rows: usize) -> Self {
        self.end_gap = rows;
        self
    }

    /// Resolve this sheet on its own and forget its local names afterwards.
    pub fn isolate(mut self, isolate: bool) -> Self {
        self.isolate = Some(isolate);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn cell_style(mut self, style: CellStyle) -> Self {
        self.cell_style = style;
        self
    }

    pub fn header_style(mut self, style: CellStyle) -> Self {
        self.header_style = style;
        self
    }

    pub fn table_style(mut self, options: TableOptions) -> Self {
        self.table_style = options;
        self
    }

    /// Append a block below the existing ones.
    pub fn push(&self, item: impl Into<Element>) -> Result<()> {
        self.root.push(item)
    }

    pub fn with(self, item: impl Into<Element>) -> Result<Self> {
        self.push(item)?;
        Ok(self)
    }

    pub fn get_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn root(&self) -> Element {
        Element::Stack(self.root.clone())
    }

    pub(crate) fn append_end_gap(&self) -> Result<()> {
        if self.end_gap > 0 {
            self.root.push(Gap::new(self.end_gap))?;
        }
        Ok(())
    }

    /// Sheet settings layered over the workbook's.
    pub(crate) fn inherited(&self, workbook: &Inherited) -> Inherited {
        let mut cell_style = self.cell_style.clone();
        cell_style.inherit_from(&workbook.cell_style);
        let mut header_style = self.header_style.clone();
        header_style.inherit_from(&workbook.header_style);
        Inherited {
            cell_style,
            header_style,
            background: self.background.or(workbook.background),
            border: workbook.border,
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new()
    }
}
