//! One-dimensional runs of cells: columns and rows.
//!
//! A vector's header is not a child until layout inserts it. Until then
//! every index and length refers to content cells only, and [`Vector::shape`]
//! counts the header that will be added.

use crate::context::Context;
use crate::element::attrs::container_builders;
use crate::element::{
    Bordered, Cell, ContainerAttrs, Element, Extent, Identified, Orientation, stacked_extent,
};
use crate::error::{Result, SheetError};
use crate::style::Border;
use sheetlayout_engine::engine::Location;
use std::cell::RefCell;
use std::rc::Rc;

pub struct VectorData {
    pub(crate) orientation: Orientation,
    pub(crate) children: Vec<Element>,
    pub(crate) header: Option<String>,
    pub(crate) header_inserted: bool,
    pub(crate) attrs: ContainerAttrs,
}

/// Shared handle to a column or row.
#[derive(Clone)]
pub struct Vector(pub(crate) Rc<RefCell<VectorData>>);

impl Vector {
    pub fn new(
        orientation: Orientation,
        items: impl IntoIterator<Item = impl Into<Element>>,
    ) -> Result<Vector> {
        let vector = Vector::from_cells(orientation, Vec::new());
        for item in items {
            vector.push(item)?;
        }
        Ok(vector)
    }

    /// A column (cells top to bottom).
    pub fn col(items: impl IntoIterator<Item = impl Into<Element>>) -> Result<Vector> {
        Vector::new(Orientation::Vertical, items)
    }

    /// A row (cells left to right).
    pub fn row(items: impl IntoIterator<Item = impl Into<Element>>) -> Result<Vector> {
        Vector::new(Orientation::Horizontal, items)
    }

    pub(crate) fn from_cells(orientation: Orientation, cells: Vec<Cell>) -> Vector {
        Vector(Rc::new(RefCell::new(VectorData {
            orientation,
            children: cells.into_iter().map(Element::Cell).collect(),
            header: None,
            header_inserted: false,
            attrs: ContainerAttrs::default(),
        })))
    }

    container_builders!();

    /// Header text, written above (or left of) the content and registered
    /// for lookup.
    pub fn with_header(self, ctx: &Context, header: &str) -> Self {
        ctx.register_header(header, &Element::from(self.clone()));
        self.0.borrow_mut().header = Some(header.to_string());
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.0.borrow().orientation
    }

    pub(crate) fn set_orientation(&self, orientation: Orientation) {
        self.0.borrow_mut().orientation = orientation;
    }

    pub(crate) fn set_header(&self, header: Option<String>) {
        self.0.borrow_mut().header = header;
    }

    fn content_offset(&self) -> usize {
        usize::from(self.0.borrow().header_inserted)
    }

    /// Number of content children, header excluded.
    pub fn len(&self) -> usize {
        self.0.borrow().children.len() - self.content_offset()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length including the header, whether or not it has been inserted yet.
    pub fn shape(&self) -> usize {
        let data = self.0.borrow();
        let content = data.children.len() - usize::from(data.header_inserted);
        content + usize::from(data.header.is_some())
    }

    pub fn get(&self, index: usize) -> Option<Element> {
        let offset = self.content_offset();
        self.0.borrow().children.get(index + offset).cloned()
    }

    pub fn get_cell(&self, index: usize) -> Option<Cell> {
        match self.get(index) {
            Some(Element::Cell(cell)) => Some(cell),
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
        let offset = self.content_offset();
        let mut data = self.0.borrow_mut();
        let at = (index + offset).min(data.children.len());
        data.children.insert(at, child);
        Ok(())
    }

    /// Content children, header excluded.
    pub fn iter(&self) -> std::vec::IntoIter<Element> {
        let offset = self.content_offset();
        self.0.borrow().children[offset..].to_vec().into_iter()
    }

    /// Content cells, skipping anything not yet resolved to a cell.
    pub fn cells(&self) -> Vec<Cell> {
        self.iter()
            .filter_map(|child| match child {
                Element::Cell(cell) => Some(cell),
                _ => None,
            })
            .collect()
    }

    pub fn header_cell(&self) -> Option<Cell> {
        let data = self.0.borrow();
        if !data.header_inserted {
            return None;
        }
        match data.children.first() {
            Some(Element::Cell(cell)) => Some(cell.clone()),
            _ => None,
        }
    }

    /// Insert the header as the first child. Runs once; later calls are no-ops.
    pub(crate) fn insert_header_cell(&self) {
        let mut data = self.0.borrow_mut();
        if data.header_inserted {
            return;
        }
        let Some(text) = data.header.clone() else {
            return;
        };
        let cell = Cell::header_cell(&text, data.attrs.header_style.clone());
        data.children.insert(0, Element::Cell(cell));
        data.header_inserted = true;
    }

    /// First and last placed cell. The header counts only with
    /// `include_headers`.
    pub fn range(&self, include_headers: bool) -> Option<(Location, Location)> {
        let cells = self.cells();
        let first = match (include_headers, self.header_cell()) {
            (true, Some(header)) => header,
            _ => cells.first()?.clone(),
        };
        let last = cells.last().cloned().unwrap_or_else(|| first.clone());
        Some((first.location()?, last.location()?))
    }

    /// Independent vector of copied cells, same orientation and header.
    pub fn deep_copy(&self) -> Vector {
        let copy = Vector::from_cells(
            self.orientation(),
            self.cells().iter().map(Cell::deep_copy).collect(),
        );
        copy.set_header(self.0.borrow().header.clone());
        copy
    }

    fn check_child(&self, item: Element) -> Result<Element> {
        match item {
            Element::Cell(_) | Element::Gap(_) | Element::Expr(_) | Element::Func(_) => Ok(item),
            other => Err(SheetError::IncompatibleChild {
                container: Element::from(self.clone()).kind_name(),
                child: other.kind_name(),
            }),
        }
    }
}

impl Identified for Vector {
    fn id(&self) -> Option<String> {
        self.0.borrow().attrs.id.clone()
    }

    fn header(&self) -> Option<String> {
        self.0.borrow().header.clone()
    }
}

impl Bordered for Vector {
    fn outline(&self) -> Border {
        self.0.borrow().attrs.border
    }
}

impl Extent for Vector {
    fn extent(&self) -> (usize, usize) {
        let data = self.0.borrow();
        let (rows, cols) = stacked_extent(&data.children, data.orientation);
        let pending_header = usize::from(data.header.is_some() && !data.header_inserted);
        let (rows, cols) = match data.orientation {
            Orientation::Vertical => (rows + pending_header, cols.max(1)),
            Orientation::Horizontal => (rows.max(1), cols + pending_header),
        };
        (rows, cols)
    }
}
