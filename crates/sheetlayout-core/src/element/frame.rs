//! Two-dimensional blocks of parallel vectors.
//!
//! A frame with `Horizontal` orientation lays columns out left to right; a
//! `Vertical` frame lays rows out top to bottom. Children are always vectors
//! of the cross orientation; a lone cell becomes a one-cell vector. A frame
//! can be written as a spreadsheet table, in which case its vector headers
//! become the table's column names.

use crate::element::attrs::container_builders;
use crate::element::{
    Bordered, Cell, ContainerAttrs, Element, Extent, Identified, Orientation, Vector,
    stacked_extent,
};
use crate::error::{Result, SheetError};
use crate::style::Border;
use sheetlayout_engine::engine::Location;
use std::cell::RefCell;
use std::rc::Rc;

/// Table formatting for a frame. Unset fields inherit from the sheet and
/// workbook defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableOptions {
    /// Built-in table style name such as `"Medium9"` or `"Light1"`.
    pub style: Option<String>,
    pub banded_rows: Option<bool>,
    pub banded_columns: Option<bool>,
    pub autofilter: Option<bool>,
    /// Display name; derived from the sheet title when unset.
    pub name: Option<String>,
}

impl TableOptions {
    pub fn new() -> TableOptions {
        TableOptions::default()
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn banded_rows(mut self, on: bool) -> Self {
        self.banded_rows = Some(on);
        self
    }

    pub fn banded_columns(mut self, on: bool) -> Self {
        self.banded_columns = Some(on);
        self
    }

    pub fn autofilter(mut self, on: bool) -> Self {
        self.autofilter = Some(on);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn inherit_from(&mut self, parent: &TableOptions) {
        if self.style.is_none() {
            self.style = parent.style.clone();
        }
        if self.banded_rows.is_none() {
            self.banded_rows = parent.banded_rows;
        }
        if self.banded_columns.is_none() {
            self.banded_columns = parent.banded_columns;
        }
        if self.autofilter.is_none() {
            self.autofilter = parent.autofilter;
        }
    }
}

pub struct FrameData {
    pub(crate) orientation: Orientation,
    pub(crate) children: Vec<Element>,
    /// Header renames applied before writing: `(from, to)`.
    pub(crate) schema: Vec<(String, String)>,
    pub(crate) table: Option<TableOptions>,
    /// Width (columns frame) or height (rows frame) per child vector.
    pub(crate) sizes: Vec<Option<f64>>,
    /// Pad short vectors with filled cells instead of blank space.
    pub(crate) fill_empty: bool,
    pub(crate) attrs: ContainerAttrs,
}

/// Shared handle to a frame.
#[derive(Clone)]
pub struct Frame(pub(crate) Rc<RefCell<FrameData>>);

impl Frame {
    pub fn new(
        orientation: Orientation,
        items: impl IntoIterator<Item = impl Into<Element>>,
    ) -> Result<Frame> {
        let frame = Frame::empty(orientation);
        for item in items {
            frame.push(item)?;
        }
        Ok(frame)
    }

    /// Columns laid out left to right.
    pub fn columns(items: impl IntoIterator<Item = impl Into<Element>>) -> Result<Frame> {
        Frame::new(Orientation::Horizontal, items)
    }

    /// Rows laid out top to bottom.
    pub fn rows(items: impl IntoIterator<Item = impl Into<Element>>) -> Result<Frame> {
        Frame::new(Orientation::Vertical, items)
    }

    /// Build from nested literal lists, one inner list per vector.
    pub fn from_values<I, J, T>(orientation: Orientation, values: I) -> Result<Frame>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = T>,
        T: Into<Element>,
    {
        let frame = Frame::empty(orientation);
        for inner in values {
            frame.push(Vector::new(orientation.cross(), inner)?)?;
        }
        Ok(frame)
    }

    pub(crate) fn empty(orientation: Orientation) -> Frame {
        Frame(Rc::new(RefCell::new(FrameData {
            orientation,
            children: Vec::new(),
            schema: Vec::new(),
            table: None,
            sizes: Vec::new(),
            fill_empty: false,
            attrs: ContainerAttrs::default(),
        })))
    }

    pub(crate) fn from_vectors(orientation: Orientation, vectors: Vec<Vector>) -> Frame {
        let frame = Frame::empty(orientation);
        frame.0.borrow_mut().children = vectors.into_iter().map(Element::Vector).collect();
        frame
    }

    container_builders!();

    /// Rename vector headers before writing.
    pub fn schema<K, V>(self, renames: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.borrow_mut().schema = renames
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .collect();
        self
    }

    /// Write this frame as a spreadsheet table.
    pub fn table(self, options: TableOptions) -> Self {
        self.0.borrow_mut().table = Some(options);
        self
    }

    pub fn sizes(self, sizes: impl IntoIterator<Item = Option<f64>>) -> Self {
        self.0.borrow_mut().sizes = sizes.into_iter().collect();
        self
    }

    pub fn fill_empty(self, on: bool) -> Self {
        self.0.borrow_mut().fill_empty = on;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.0.borrow().orientation
    }

    pub fn is_table(&self) -> bool {
        self.0.borrow().table.is_some()
    }

    pub fn table_options(&self) -> Option<TableOptions> {
        self.0.borrow().table.clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Element> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn get_vector(&self, index: usize) -> Option<Vector> {
        match self.get(index) {
            Some(Element::Vector(v)) => Some(v),
            _ => None,
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<Element> {
        self.iter().find(|child| child.id().as_deref() == Some(id))
    }

    pub fn get_by_header(&self, header: &str) -> Option<Element> {
        self.iter().find(|child| child.header().as_deref() == Some(header))
    }

    pub fn push(&self, item: impl Into<Element>) -> Result<()> {
        let child = self.check_child(item.into())?;
        self.0.borrow_mut().children.push(child);
        Ok(())
    }

    pub fn insert(&self, index: usize, item: impl Into<Element>) -> Result<()> {
        let child = self.check_child(item.into())?;
        let mut data = self.0.borrow_mut();
        let at = index.min(data.children.len());
        data.children.insert(at, child);
        Ok(())
    }

    pub fn iter(&self) -> std::vec::IntoIter<Element> {
        self.0.borrow().children.clone().into_iter()
    }

    /// Child vectors, skipping anything not yet resolved to one.
    pub fn vectors(&self) -> Vec<Vector> {
        self.iter()
            .filter_map(|child| match child {
                Element::Vector(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// `(rows, cols)` before placement, headers counted.
    pub fn shape(&self) -> (usize, usize) {
        let vectors = self.vectors();
        let depth = vectors.iter().map(Vector::shape).max().unwrap_or(0);
        match self.orientation() {
            Orientation::Horizontal => (depth, vectors.len()),
            Orientation::Vertical => (vectors.len(), depth),
        }
    }

    /// Top-left and bottom-right placed cells. Headers count only with
    /// `include_headers`.
    /// The bottom-right corner comes from the furthest cell of any vector,
    /// so a ragged frame still covers its longest vector.
    pub fn range(&self, include_headers: bool) -> Option<(Location, Location)> {
        let ranges = self
            .vectors()
            .iter()
            .map(|v| v.range(include_headers))
            .collect::<Option<Vec<_>>>()?;
        let (first, _) = ranges.first()?.clone();
        let row = ranges.iter().map(|(_, last)| last.row).max()?;
        let col = ranges.iter().map(|(_, last)| last.col).max()?;
        let last = Location::new(first.sheet.clone(), row, col);
        Some((first, last))
    }

    /// Independent frame of copied vectors.
    pub fn deep_copy(&self) -> Frame {
        Frame::from_vectors(
            self.orientation(),
            self.vectors().iter().map(Vector::deep_copy).collect(),
        )
    }

    fn check_child(&self, item: Element) -> Result<Element> {
        let along = self.orientation().cross();
        match item {
            Element::Vector(v) if v.orientation() == along => Ok(Element::Vector(v)),
            Element::Cell(cell) => Ok(Element::Vector(promote_cell(cell, along))),
            Element::Gap(_) | Element::Expr(_) | Element::Func(_) => Ok(item),
            other => Err(SheetError::IncompatibleChild {
                container: "Frame",
                child: other.kind_name(),
            }),
        }
    }
}

/// Wrap a lone cell in a one-cell vector, moving its header onto the vector.
pub(crate) fn promote_cell(cell: Cell, orientation: Orientation) -> Vector {
    let header = cell.header();
    let vector = Vector::from_cells(orientation, vec![cell]);
    vector.set_header(header);
    vector
}

impl Identified for Frame {
    fn id(&self) -> Option<String> {
        self.0.borrow().attrs.id.clone()
    }

    fn header(&self) -> Option<String> {
        None
    }
}

impl Bordered for Frame {
    fn outline(&self) -> Border {
        self.0.borrow().attrs.border
    }
}

impl Extent for Frame {
    fn extent(&self) -> (usize, usize) {
        let data = self.0.borrow();
        stacked_extent(&data.children, data.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn test_columns_frame_shape() {
        let ctx = Context::new();
        let a = Vector::col([1, 2, 3]).unwrap().with_header(&ctx, "A");
        let b = Vector::col([4, 5]).unwrap();
        let frame = Frame::columns([a, b]).unwrap();
        assert_eq!(frame.shape(), (4, 2));
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_cell_is_promoted_with_header() {
        let ctx = Context::new();
        let cell = Cell::new(1).with_header(&ctx, "Solo");
        let frame = Frame::columns([cell]).unwrap();
        let v = frame.get_vector(0).unwrap();
        assert_eq!(v.orientation(), Orientation::Vertical);
        assert_eq!(v.header().as_deref(), Some("Solo"));
    }

    #[test]
    fn test_rejects_misoriented_vector() {
        let row = Vector::row([1, 2]).unwrap();
        assert!(matches!(
            Frame::columns([row]),
            Err(SheetError::IncompatibleChild { container: "Frame", child: "Row" })
        ));
    }

    #[test]
    fn test_from_values() {
        let frame = Frame::from_values(Orientation::Vertical, vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.get_vector(1).unwrap().orientation(), Orientation::Horizontal);
    }

    #[test]
    fn test_table_options_inherit() {
        let mut own = TableOptions::new().banded_rows(false);
        own.inherit_from(&TableOptions::new().style("Light1").banded_rows(true));
        assert_eq!(own.style.as_deref(), Some("Light1"));
        assert_eq!(own.banded_rows, Some(false));
    }
}
