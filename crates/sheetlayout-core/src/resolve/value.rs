//! Values seen while interpreting a template.
//!
//! References stay as [`Value::Element`] until something forces them into
//! numbers; arithmetic then works on formula nodes pointing at the
//! referenced cells, never on cell contents.

use crate::element::{Cell, Element, Frame, Identified, Orientation, Vector};
use crate::error::{Result, SheetError};
use crate::formula::FormulaNode;
use sheetlayout_engine::engine::{BinaryOp, IndexKey, UnaryOp};

/// One vector's worth of formula nodes.
#[derive(Clone, Debug)]
pub struct Series {
    pub items: Vec<FormulaNode>,
    pub orientation: Orientation,
}

impl Series {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn map(self, f: impl Fn(FormulaNode) -> FormulaNode) -> Series {
        Series {
            items: self.items.into_iter().map(f).collect(),
            orientation: self.orientation,
        }
    }

    fn zip(self, other: Series, f: impl Fn(FormulaNode, FormulaNode) -> FormulaNode) -> Series {
        Series {
            items: self
                .items
                .into_iter()
                .zip(other.items)
                .map(|(a, b)| f(a, b))
                .collect(),
            orientation: self.orientation,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Scalar(FormulaNode),
    Series(Series),
    /// Vectors of a frame; `orientation` is the frame's.
    Table {
        vectors: Vec<Series>,
        orientation: Orientation,
    },
    /// A reference nothing has touched yet.
    Element(Element),
}

impl Value {
    /// Force a reference into formula nodes.
    pub fn numeric(self) -> Result<Value> {
        match self {
            Value::Element(el) => element_numeric(&el),
            other => Ok(other),
        }
    }

    /// True for vectors and series.
    pub fn is_one_dimensional(&self) -> bool {
        matches!(self, Value::Series(_) | Value::Element(Element::Vector(_)))
    }

    /// Turn the value into a layout element. With `use_ref` a referenced
    /// element becomes cells pointing at it; otherwise it is copied.
    pub fn into_element(self, use_ref: bool) -> Result<Element> {
        match self {
            Value::Scalar(FormulaNode::Literal(value)) => Ok(Element::Cell(Cell::new(value))),
            Value::Scalar(node) => Ok(Element::Cell(Cell::from_formula(node))),
            Value::Series(series) => Ok(Element::Vector(series_vector(series))),
            Value::Table {
                vectors,
                orientation,
            } => Ok(Element::Frame(Frame::from_vectors(
                orientation,
                vectors.into_iter().map(series_vector).collect(),
            ))),
            Value::Element(el) if use_ref => match el {
                Element::Stack(_) => Err(SheetError::IncompatibleChild {
                    container: "reference",
                    child: "Stack",
                }),
                other => element_numeric(&other)?.into_element(false),
            },
            Value::Element(el) => match el {
                Element::Cell(c) => Ok(Element::Cell(c.deep_copy())),
                Element::Vector(v) => Ok(Element::Vector(v.deep_copy())),
                Element::Frame(f) => Ok(Element::Frame(f.deep_copy())),
                other => element_numeric(&other)?.into_element(false),
            },
        }
    }
}

fn series_vector(series: Series) -> Vector {
    let cells = series
        .items
        .into_iter()
        .map(|node| match node {
            FormulaNode::Literal(value) => Cell::new(value),
            node => Cell::from_formula(node),
        })
        .collect();
    Vector::from_cells(series.orientation, cells)
}

/// Formula nodes pointing at the content of `el`.
fn element_numeric(el: &Element) -> Result<Value> {
    match el {
        Element::Cell(c) => Ok(Value::Scalar(FormulaNode::Ref(c.clone()))),
        Element::Vector(v) => Ok(Value::Series(vector_series(v)?)),
        Element::Frame(f) => {
            let vectors = f
                .iter()
                .map(|child| match child {
                    Element::Vector(v) => vector_series(&v),
                    other => Err(pending_error(&other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Table {
                vectors,
                orientation: f.orientation(),
            })
        }
        other => Err(pending_error(other)),
    }
}

pub(crate) fn vector_series(v: &Vector) -> Result<Series> {
    let items = v
        .iter()
        .map(|child| match child {
            Element::Cell(c) => Ok(FormulaNode::Ref(c)),
            other => Err(pending_error(&other)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Series {
        items,
        orientation: v.orientation(),
    })
}

/// Error for an element that cannot take part in arithmetic.
pub(crate) fn pending_error(el: &Element) -> SheetError {
    match el {
        Element::Stack(_) => SheetError::ArithmeticOnStack,
        Element::Expr(e) => SheetError::ArithmeticOnPendingExpression(e.template()),
        Element::Func(f) => SheetError::ArithmeticOnPendingFunction(f.name()),
        Element::Gap(_) => SheetError::ArithmeticOnGap,
        other => SheetError::IncompatibleChild {
            container: "formula",
            child: other.kind_name(),
        },
    }
}

/// Elementwise binary operation with broadcasting.
pub fn combine(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    let lhs = lhs.numeric()?;
    let rhs = rhs.numeric()?;
    let node = |a, b| FormulaNode::binary(op, a, b);
    Ok(match (lhs, rhs) {
        (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(node(a, b)),
        (Value::Scalar(a), Value::Series(s)) => Value::Series(s.map(|b| node(a.clone(), b))),
        (Value::Series(s), Value::Scalar(b)) => Value::Series(s.map(|a| node(a, b.clone()))),
        (Value::Series(a), Value::Series(b)) => Value::Series(a.zip(b, node)),
        (
            Value::Table {
                vectors,
                orientation,
            },
            other,
        ) => Value::Table {
            vectors: table_with(vectors, other, |a, b| node(a, b))?,
            orientation,
        },
        (
            other,
            Value::Table {
                vectors,
                orientation,
            },
        ) => Value::Table {
            vectors: table_with(vectors, other, |t, o| node(o, t))?,
            orientation,
        },
        (Value::Element(_), _) | (_, Value::Element(_)) => {
            return Err(SheetError::ShapeMismatch(
                "unresolved element in arithmetic".to_string(),
            ));
        }
    })
}

/// Combine every vector of a table with `other`. `f` always receives the
/// table's item first.
fn table_with(
    vectors: Vec<Series>,
    other: Value,
    f: impl Fn(FormulaNode, FormulaNode) -> FormulaNode,
) -> Result<Vec<Series>> {
    match other {
        Value::Scalar(b) => Ok(vectors
            .into_iter()
            .map(|s| s.map(|a| f(a, b.clone())))
            .collect()),
        Value::Series(b) => Ok(vectors.into_iter().map(|s| s.zip(b.clone(), &f)).collect()),
        Value::Table { vectors: other, .. } => {
            if other.len() != vectors.len() {
                log::debug!(
                    "combining frames of {} and {} vectors; extra vectors dropped",
                    vectors.len(),
                    other.len()
                );
            }
            Ok(vectors
                .into_iter()
                .zip(other)
                .map(|(a, b)| a.zip(b, &f))
                .collect())
        }
        Value::Element(_) => Err(SheetError::ShapeMismatch(
            "unresolved element in arithmetic".to_string(),
        )),
    }
}

pub fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    let node = |a| FormulaNode::unary(op, a);
    Ok(match value.numeric()? {
        Value::Scalar(a) => Value::Scalar(node(a)),
        Value::Series(s) => Value::Series(s.map(node)),
        Value::Table {
            vectors,
            orientation,
        } => Value::Table {
            vectors: vectors.into_iter().map(|s| s.map(node)).collect(),
            orientation,
        },
        Value::Element(_) => {
            return Err(SheetError::ShapeMismatch(
                "unresolved element in arithmetic".to_string(),
            ));
        }
    })
}

/// Apply a postfix `[...]` index.
pub fn index(value: Value, key: &IndexKey) -> Result<Value> {
    match (value, key) {
        (Value::Element(el), IndexKey::Position(i)) => match &el {
            Element::Cell(_) if *i == 0 => Ok(Value::Element(el)),
            _ => el.child_at(*i).map(Value::Element).ok_or(SheetError::IndexOutOfRange {
                kind: el.kind_name(),
                index: *i,
                len: content_len(&el),
            }),
        },
        (Value::Element(el), IndexKey::Name(name)) => el
            .child_named(name)
            .map(Value::Element)
            .ok_or_else(|| SheetError::UnknownChild(name.clone())),
        (Value::Series(s), IndexKey::Position(i)) => {
            let len = s.len();
            s.items
                .into_iter()
                .nth(*i)
                .map(Value::Scalar)
                .ok_or(SheetError::IndexOutOfRange {
                    kind: "series",
                    index: *i,
                    len,
                })
        }
        (Value::Table { vectors, .. }, IndexKey::Position(i)) => {
            let len = vectors.len();
            vectors
                .into_iter()
                .nth(*i)
                .map(Value::Series)
                .ok_or(SheetError::IndexOutOfRange {
                    kind: "frame",
                    index: *i,
                    len,
                })
        }
        (Value::Scalar(node), IndexKey::Position(0)) => Ok(Value::Scalar(node)),
        (Value::Scalar(_), IndexKey::Position(i)) => Err(SheetError::IndexOutOfRange {
            kind: "scalar",
            index: *i,
            len: 1,
        }),
        (_, IndexKey::Name(name)) => Err(SheetError::UnknownChild(name.clone())),
    }
}

fn content_len(el: &Element) -> usize {
    match el {
        Element::Vector(v) => v.len(),
        Element::Frame(f) => f.len(),
        Element::Stack(s) => s.len(),
        Element::Cell(_) => 1,
        _ => 0,
    }
}

/// Name an element for error messages.
pub(crate) fn describe(el: &Element) -> String {
    match (el.id(), el.header()) {
        (Some(id), _) => format!("{} {:?}", el.kind_name(), id),
        (None, Some(header)) => format!("{} {:?}", el.kind_name(), header),
        (None, None) => el.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CellValue, Gap, Stack};

    fn refs(series: &Series) -> Vec<Cell> {
        series
            .items
            .iter()
            .map(|item| match item {
                FormulaNode::Ref(c) => c.clone(),
                other => panic!("expected a ref, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_vector_becomes_series_of_refs() {
        let v = Vector::col([1, 2, 3]).unwrap();
        match Value::Element(Element::from(v.clone())).numeric().unwrap() {
            Value::Series(s) => {
                assert_eq!(s.len(), 3);
                assert!(refs(&s)[1].ptr_eq(&v.get_cell(1).unwrap()));
            }
            other => panic!("expected a series, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_broadcasts_over_series() {
        let v = Vector::row([1, 2]).unwrap();
        let out = combine(
            BinaryOp::Mul,
            Value::Element(Element::from(v)),
            Value::Scalar(FormulaNode::number(2.0)),
        )
        .unwrap();
        match out {
            Value::Series(s) => {
                assert_eq!(s.len(), 2);
                assert_eq!(s.orientation, Orientation::Horizontal);
                assert!(matches!(s.items[0], FormulaNode::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected a series, got {:?}", other),
        }
    }

    #[test]
    fn test_series_zip_truncates() {
        let a = Vector::col([1, 2, 3]).unwrap();
        let b = Vector::col([1, 2]).unwrap();
        let out = combine(
            BinaryOp::Add,
            Value::Element(Element::from(a)),
            Value::Element(Element::from(b)),
        )
        .unwrap();
        assert!(matches!(out, Value::Series(s) if s.len() == 2));
    }

    #[test]
    fn test_stack_and_gap_arithmetic_fail() {
        let stack = Stack::vertical([Vector::col([1]).unwrap()]).unwrap();
        let err = combine(
            BinaryOp::Add,
            Value::Element(Element::from(stack)),
            Value::Scalar(FormulaNode::number(1.0)),
        )
        .unwrap_err();
        assert!(matches!(err, SheetError::ArithmeticOnStack));

        let v = Vector::col([Element::from(1), Element::from(Gap::new(1))]).unwrap();
        let err = Value::Element(Element::from(v)).numeric().unwrap_err();
        assert!(matches!(err, SheetError::ArithmeticOnGap));
    }

    #[test]
    fn test_index_element_and_table() {
        let frame = Frame::from_values(Orientation::Horizontal, vec![vec![1, 2], vec![3, 4]]).unwrap();
        let col = index(Value::Element(Element::from(frame.clone())), &IndexKey::Position(1)).unwrap();
        assert!(matches!(col, Value::Element(Element::Vector(_))));

        let table = Value::Element(Element::from(frame)).numeric().unwrap();
        assert!(matches!(index(table, &IndexKey::Position(0)).unwrap(), Value::Series(_)));

        let err = index(
            Value::Element(Element::from(Vector::col([1]).unwrap())),
            &IndexKey::Position(5),
        )
        .unwrap_err();
        assert!(matches!(err, SheetError::IndexOutOfRange { index: 5, len: 1, .. }));
    }

    #[test]
    fn test_into_element_reference_wrapper() {
        let v = Vector::col([1, 2]).unwrap();
        let wrapped = Value::Element(Element::from(v.clone())).into_element(true).unwrap();
        let Element::Vector(w) = wrapped else {
            panic!("expected a vector");
        };
        let first = w.get_cell(0).unwrap();
        assert!(matches!(first.formula(), Some(FormulaNode::Ref(c)) if c.ptr_eq(&v.get_cell(0).unwrap())));

        let copied = Value::Element(Element::from(v)).into_element(false).unwrap();
        let Element::Vector(c) = copied else {
            panic!("expected a vector");
        };
        assert_eq!(c.get_cell(1).unwrap().value(), CellValue::Number(2.0));
        assert!(!c.get_cell(1).unwrap().has_formula());
    }
}
