//! Single cells.

use crate::context::Context;
use crate::element::{Bordered, Element, Extent, Identified};
use crate::error::{Result, SheetError};
use crate::formula::FormulaNode;
use crate::style::{Border, CellStyle};
use sheetlayout_engine::engine::{Location, format_number, quote_text};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// What a cell holds once written.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Final formula text, `=`-prefixed.
    Formula(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text of this value as a formula operand.
    pub fn as_formula_literal(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => quote_text(s),
            CellValue::Formula(f) => format!("({})", f.trim_start_matches('=')),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Formula(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> CellValue {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> CellValue {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> CellValue {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> CellValue {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> CellValue {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> CellValue {
        CellValue::Text(s)
    }
}

pub struct CellData {
    pub(crate) value: CellValue,
    /// Pending formula, serialized into `value` at write time.
    pub(crate) formula: Option<FormulaNode>,
    pub(crate) style: CellStyle,
    /// `(rows, cols)` covered when merged. Always at least 1x1.
    pub(crate) merge: (usize, usize),
    pub(crate) id: Option<String>,
    /// Used when the cell is promoted to a one-cell vector.
    pub(crate) header: Option<String>,
    pub(crate) location: Option<Location>,
    pub(crate) written: bool,
    pub(crate) inherits_style: bool,
    pub(crate) is_header: bool,
}

/// Shared handle to a cell.
#[derive(Clone)]
pub struct Cell(pub(crate) Rc<RefCell<CellData>>);

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Cell {
        Cell(Rc::new(RefCell::new(CellData {
            value: value.into(),
            formula: None,
            style: CellStyle::default(),
            merge: (1, 1),
            id: None,
            header: None,
            location: None,
            written: false,
            inherits_style: true,
            is_header: false,
        })))
    }

    pub fn empty() -> Cell {
        Cell::new(CellValue::Empty)
    }

    /// A cell whose content is a formula over other elements.
    pub fn from_formula(formula: FormulaNode) -> Cell {
        let cell = Cell::empty();
        cell.0.borrow_mut().formula = Some(formula);
        cell
    }

    pub(crate) fn header_cell(text: &str, style: CellStyle) -> Cell {
        let cell = Cell::new(text);
        {
            let mut data = cell.0.borrow_mut();
            data.style = style;
            data.is_header = true;
        }
        cell
    }

    pub(crate) fn gap_cell(style: CellStyle, fill: bool) -> Cell {
        let cell = Cell::empty();
        {
            let mut data = cell.0.borrow_mut();
            data.style = style;
            data.inherits_style = fill;
        }
        cell
    }

    pub fn with_id(self, ctx: &Context, id: &str) -> Result<Self> {
        ctx.register_id(id, &Element::from(self.clone()))?;
        self.0.borrow_mut().id = Some(id.to_string());
        Ok(self)
    }

    pub fn with_header(self, ctx: &Context, header: &str) -> Self {
        ctx.register_header(header, &Element::from(self.clone()));
        self.0.borrow_mut().header = Some(header.to_string());
        self
    }

    pub fn style(self, style: CellStyle) -> Self {
        self.0.borrow_mut().style = style;
        self
    }

    /// Merge this cell over `rows` x `cols` cells, starting at its own.
    pub fn merge(self, rows: usize, cols: usize) -> Self {
        self.0.borrow_mut().merge = (rows.max(1), cols.max(1));
        self
    }

    pub fn value(&self) -> CellValue {
        self.0.borrow().value.clone()
    }

    pub fn formula(&self) -> Option<FormulaNode> {
        self.0.borrow().formula.clone()
    }

    pub fn has_formula(&self) -> bool {
        self.0.borrow().formula.is_some()
    }

    pub fn cell_style(&self) -> CellStyle {
        self.0.borrow().style.clone()
    }

    pub fn merge_span(&self) -> (usize, usize) {
        self.0.borrow().merge
    }

    pub fn location(&self) -> Option<Location> {
        self.0.borrow().location.clone()
    }

    pub fn is_placed(&self) -> bool {
        self.0.borrow().location.is_some()
    }

    pub fn is_written(&self) -> bool {
        self.0.borrow().written
    }

    pub fn is_header(&self) -> bool {
        self.0.borrow().is_header
    }

    pub fn ptr_eq(&self, other: &Cell) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Independent cell with the same content and style. Ids, headers and
    /// placement are not copied.
    pub fn deep_copy(&self) -> Cell {
        let data = self.0.borrow();
        let copy = Cell::new(data.value.clone()).style(data.style.clone());
        {
            let mut target = copy.0.borrow_mut();
            target.formula = data.formula.clone();
            target.merge = data.merge;
        }
        copy
    }

    pub(crate) fn set_location(&self, location: Location) {
        self.0.borrow_mut().location = Some(location);
    }

    pub(crate) fn set_value(&self, value: CellValue) {
        self.0.borrow_mut().value = value;
    }

    pub(crate) fn style_mut<R>(&self, f: impl FnOnce(&mut CellStyle) -> R) -> R {
        f(&mut self.0.borrow_mut().style)
    }

    pub(crate) fn inherits_style(&self) -> bool {
        self.0.borrow().inherits_style
    }

    /// Flip the write-once latch. Fails if it was already set.
    pub(crate) fn mark_written(&self) -> Result<()> {
        let mut data = self.0.borrow_mut();
        if data.written {
            let at = data
                .location
                .as_ref()
                .map(|loc| format!("{}!{}", loc.sheet, loc.a1()))
                .unwrap_or_else(|| "(unplaced)".to_string());
            return Err(SheetError::AlreadyWritten(at));
        }
        data.written = true;
        Ok(())
    }

    /// Human-readable name for log messages.
    pub(crate) fn describe(&self) -> String {
        let data = self.0.borrow();
        match (&data.id, &data.header) {
            (Some(id), _) => format!("cell {:?}", id),
            (None, Some(header)) => format!("cell {:?}", header),
            (None, None) => match &data.value {
                CellValue::Empty if data.formula.is_some() => "a formula cell".to_string(),
                CellValue::Empty => "an empty cell".to_string(),
                value => format!("cell {}", value.as_formula_literal()),
            },
        }
    }
}

impl Identified for Cell {
    fn id(&self) -> Option<String> {
        self.0.borrow().id.clone()
    }

    fn header(&self) -> Option<String> {
        self.0.borrow().header.clone()
    }
}

impl Bordered for Cell {
    fn outline(&self) -> Border {
        self.0.borrow().style.border
    }
}

impl Extent for Cell {
    fn extent(&self) -> (usize, usize) {
        self.0.borrow().merge
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        let mut out = f.debug_struct("Cell");
        out.field("value", &data.value);
        if data.formula.is_some() {
            out.field("formula", &true);
        }
        if let Some(id) = &data.id {
            out.field("id", id);
        }
        if let Some(loc) = &data.location {
            out.field("at", &format!("{}!{}", loc.sheet, loc.a1()));
        }
        out.finish()
    }
}
