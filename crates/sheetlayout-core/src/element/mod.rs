//! The layout tree.
//!
//! A workbook is a tree of [`Element`]s. Leaves are [`Cell`]s, [`Gap`]s and
//! the two kinds of pending formula producer ([`Expression`] and
//! [`FunctionCall`]); containers are [`Vector`]s (one row or column),
//! [`Frame`]s (a block of parallel vectors) and [`Stack`]s (heterogeneous
//! groups). Every node except [`Gap`] is a cheap-to-clone shared handle, so
//! the same cell can sit in a container and in another cell's formula.
//!
//! Pending producers are replaced in their container by the element they
//! evaluate to during resolution; by the time a sheet is placed the tree
//! only holds cells and containers.

pub mod cell;
pub mod frame;
pub mod gap;
pub mod sheet;
pub mod stack;
pub mod vector;
pub mod workbook;

mod attrs;

use crate::resolve::expression::{Expression, ExpressionData};
use crate::resolve::function::{FunctionCall, FunctionData};
use crate::style::Border;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub use attrs::ContainerAttrs;
pub use cell::{Cell, CellData, CellValue};
pub use frame::{Frame, FrameData, TableOptions};
pub use gap::Gap;
pub use sheet::Sheet;
pub use stack::{Stack, StackData};
pub use vector::{Vector, VectorData};
pub use workbook::Workbook;

/// Axis along which a container lays out its children.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// Children left to right.
    Horizontal,
    /// Children top to bottom.
    Vertical,
}

impl Orientation {
    pub fn cross(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// `(rows, cols)` step for one unit along this axis.
    pub fn step(self) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        }
    }

    /// Length along this axis of an extent given as `(rows, cols)`.
    pub fn along(self, extent: (usize, usize)) -> usize {
        match self {
            Orientation::Horizontal => extent.1,
            Orientation::Vertical => extent.0,
        }
    }

    /// Length across this axis of an extent given as `(rows, cols)`.
    pub fn across(self, extent: (usize, usize)) -> usize {
        self.cross().along(extent)
    }
}

/// Element dimensionality used by function calls and coercion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Dimension {
    Scalar,
    Vector,
    Frame,
    /// Stacks and sheets: children of mixed dimension.
    Heterogeneous,
}

/// Anything that can carry an id and a header.
pub trait Identified {
    fn id(&self) -> Option<String>;
    fn header(&self) -> Option<String>;
}

/// Anything that draws a border.
pub trait Bordered {
    fn outline(&self) -> Border;
}

/// Footprint on the sheet as `(rows, cols)`.
pub trait Extent {
    fn extent(&self) -> (usize, usize);
}

#[derive(Clone)]
pub enum Element {
    Cell(Cell),
    Vector(Vector),
    Frame(Frame),
    Stack(Stack),
    Gap(Gap),
    Expr(Expression),
    Func(FunctionCall),
}

/// Non-owning twin of [`Element`], as stored in the symbol table.
#[derive(Clone)]
pub enum WeakElement {
    Cell(Weak<RefCell<CellData>>),
    Vector(Weak<RefCell<VectorData>>),
    Frame(Weak<RefCell<FrameData>>),
    Stack(Weak<RefCell<StackData>>),
    Expr(Weak<RefCell<ExpressionData>>),
    Func(Weak<RefCell<FunctionData>>),
    /// Gaps have no identity and are never registered.
    Gap,
}

impl WeakElement {
    pub fn upgrade(&self) -> Option<Element> {
        match self {
            WeakElement::Cell(w) => w.upgrade().map(|rc| Element::Cell(Cell(rc))),
            WeakElement::Vector(w) => w.upgrade().map(|rc| Element::Vector(Vector(rc))),
            WeakElement::Frame(w) => w.upgrade().map(|rc| Element::Frame(Frame(rc))),
            WeakElement::Stack(w) => w.upgrade().map(|rc| Element::Stack(Stack(rc))),
            WeakElement::Expr(w) => w.upgrade().map(|rc| Element::Expr(Expression(rc))),
            WeakElement::Func(w) => w.upgrade().map(|rc| Element::Func(FunctionCall(rc))),
            WeakElement::Gap => None,
        }
    }
}

impl Element {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Cell(_) => "Cell",
            Element::Vector(v) => match v.orientation() {
                Orientation::Vertical => "Col",
                Orientation::Horizontal => "Row",
            },
            Element::Frame(_) => "Frame",
            Element::Stack(_) => "Stack",
            Element::Gap(_) => "Gap",
            Element::Expr(_) => "Expression",
            Element::Func(_) => "FunctionCall",
        }
    }

    /// Known dimension, or None for gaps and unresolved producers.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Element::Cell(_) => Some(Dimension::Scalar),
            Element::Vector(_) => Some(Dimension::Vector),
            Element::Frame(_) => Some(Dimension::Frame),
            Element::Stack(_) => Some(Dimension::Heterogeneous),
            Element::Gap(_) | Element::Expr(_) | Element::Func(_) => None,
        }
    }

    pub fn downgrade(&self) -> WeakElement {
        match self {
            Element::Cell(c) => WeakElement::Cell(Rc::downgrade(&c.0)),
            Element::Vector(v) => WeakElement::Vector(Rc::downgrade(&v.0)),
            Element::Frame(f) => WeakElement::Frame(Rc::downgrade(&f.0)),
            Element::Stack(s) => WeakElement::Stack(Rc::downgrade(&s.0)),
            Element::Expr(e) => WeakElement::Expr(Rc::downgrade(&e.0)),
            Element::Func(f) => WeakElement::Func(Rc::downgrade(&f.0)),
            Element::Gap(_) => WeakElement::Gap,
        }
    }

    /// Identity of the shared node. Gaps have none and report 0.
    pub fn addr(&self) -> usize {
        match self {
            Element::Cell(c) => Rc::as_ptr(&c.0) as *const () as usize,
            Element::Vector(v) => Rc::as_ptr(&v.0) as *const () as usize,
            Element::Frame(f) => Rc::as_ptr(&f.0) as *const () as usize,
            Element::Stack(s) => Rc::as_ptr(&s.0) as *const () as usize,
            Element::Expr(e) => Rc::as_ptr(&e.0) as *const () as usize,
            Element::Func(f) => Rc::as_ptr(&f.0) as *const () as usize,
            Element::Gap(_) => 0,
        }
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        let addr = self.addr();
        addr != 0 && addr == other.addr()
    }

    /// Children of a container, header cell included once inserted.
    pub fn children(&self) -> Vec<Element> {
        match self {
            Element::Vector(v) => v.0.borrow().children.clone(),
            Element::Frame(f) => f.0.borrow().children.clone(),
            Element::Stack(s) => s.0.borrow().children.clone(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn set_children(&self, children: Vec<Element>) {
        match self {
            Element::Vector(v) => v.0.borrow_mut().children = children,
            Element::Frame(f) => f.0.borrow_mut().children = children,
            Element::Stack(s) => s.0.borrow_mut().children = children,
            _ => {}
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Element::Vector(_) | Element::Frame(_) | Element::Stack(_))
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            Element::Vector(v) => Some(v.orientation()),
            Element::Frame(f) => Some(f.orientation()),
            Element::Stack(s) => Some(s.orientation()),
            _ => None,
        }
    }

    /// Run `f` on the shared container attributes.
    pub(crate) fn with_attrs<R>(&self, f: impl FnOnce(&mut ContainerAttrs) -> R) -> Option<R> {
        match self {
            Element::Vector(v) => Some(f(&mut v.0.borrow_mut().attrs)),
            Element::Frame(fr) => Some(f(&mut fr.0.borrow_mut().attrs)),
            Element::Stack(s) => Some(f(&mut s.0.borrow_mut().attrs)),
            _ => None,
        }
    }

    /// Pre-order walk over this element and every descendant.
    pub fn visit(&self, f: &mut dyn FnMut(&Element)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// True if this element, or anything under it, is still waiting on a
    /// reference or function to resolve.
    pub fn is_pending(&self) -> bool {
        match self {
            Element::Expr(_) | Element::Func(_) => true,
            Element::Vector(_) | Element::Frame(_) | Element::Stack(_) => {
                self.children().iter().any(Element::is_pending)
            }
            Element::Cell(_) | Element::Gap(_) => false,
        }
    }

    /// Every cell under this element, in placement order.
    pub fn leaf_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        self.visit(&mut |el| {
            if let Element::Cell(c) = el {
                out.push(c.clone());
            }
        });
        out
    }

    /// Child at `index` for positional template lookup.
    pub fn child_at(&self, index: usize) -> Option<Element> {
        match self {
            Element::Vector(v) => v.get(index),
            Element::Frame(f) => f.get(index),
            Element::Stack(s) => s.get(index),
            _ => None,
        }
    }

    /// Child whose id, then header, equals `key`.
    pub fn child_named(&self, key: &str) -> Option<Element> {
        match self {
            Element::Vector(v) => v.get_by_id(key).or_else(|| v.get_by_header(key)),
            Element::Frame(f) => f.get_by_id(key).or_else(|| f.get_by_header(key)),
            Element::Stack(s) => s.get_by_id(key).or_else(|| s.get_by_header(key)),
            _ => None,
        }
    }
}

impl Identified for Element {
    fn id(&self) -> Option<String> {
        match self {
            Element::Cell(c) => c.id(),
            Element::Vector(v) => v.id(),
            Element::Frame(f) => f.id(),
            Element::Stack(s) => s.id(),
            Element::Expr(e) => e.id(),
            Element::Func(f) => f.id(),
            Element::Gap(_) => None,
        }
    }

    fn header(&self) -> Option<String> {
        match self {
            Element::Cell(c) => c.header(),
            Element::Vector(v) => v.header(),
            Element::Frame(_) | Element::Stack(_) | Element::Gap(_) => None,
            Element::Expr(e) => e.header(),
            Element::Func(f) => f.header(),
        }
    }
}

impl Extent for Element {
    fn extent(&self) -> (usize, usize) {
        match self {
            Element::Cell(c) => c.extent(),
            Element::Vector(v) => v.extent(),
            Element::Frame(f) => f.extent(),
            Element::Stack(s) => s.extent(),
            Element::Gap(_) | Element::Expr(_) | Element::Func(_) => (0, 0),
        }
    }
}

/// Extent of children laid out one after another along `orientation`.
pub(crate) fn stacked_extent(children: &[Element], orientation: Orientation) -> (usize, usize) {
    let mut along = 0;
    let mut across = 0;
    for child in children {
        let ext = child.extent();
        along += orientation.along(ext);
        across = across.max(orientation.across(ext));
    }
    match orientation {
        Orientation::Vertical => (along, across),
        Orientation::Horizontal => (across, along),
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Cell(c) => fmt::Debug::fmt(c, f),
            Element::Gap(g) => fmt::Debug::fmt(g, f),
            other => {
                let mut out = f.debug_struct(other.kind_name());
                if let Some(id) = other.id() {
                    out.field("id", &id);
                }
                if let Some(header) = other.header() {
                    out.field("header", &header);
                }
                out.field("children", &other.children().len()).finish()
            }
        }
    }
}

macro_rules! element_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Element {
                    Element::$variant(value)
                }
            }
        )+
    };
}

element_from!(
    Cell => Cell,
    Vector => Vector,
    Frame => Frame,
    Stack => Stack,
    Gap => Gap,
    Expression => Expr,
    FunctionCall => Func,
);

macro_rules! element_from_literal {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Element {
                    Element::Cell(Cell::new(value))
                }
            }
        )+
    };
}

element_from_literal!(f64, i32, i64, u32, bool, &str, String, CellValue);

impl From<&Element> for Element {
    fn from(value: &Element) -> Element {
        value.clone()
    }
}
