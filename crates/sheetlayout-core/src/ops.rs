//! Arithmetic on layout elements.
//!
//! Every combinator returns a new element whose cells hold formulas over the
//! operands, never computed values. Vectors and frames broadcast the same way
//! they do inside templates. The operator impls at the bottom are shorthand
//! for the named functions.

use crate::element::{Cell, Element, Frame, Vector};
use crate::error::{Result, SheetError};
use crate::formula::FormulaNode;
use crate::resolve::Operand;
use crate::resolve::value::{self, Value};
use sheetlayout_engine::engine::{BinaryOp, UnaryOp};
use std::ops::{Add, Div, Mul, Neg, Shr, Sub};

fn binary(op: BinaryOp, lhs: &Element, rhs: &Element) -> Result<Element> {
    value::combine(op, Value::Element(lhs.clone()), Value::Element(rhs.clone()))?
        .into_element(false)
}

fn with_number(op: BinaryOp, lhs: &Element, n: f64, number_first: bool) -> Result<Element> {
    let (a, b) = if number_first {
        (Value::Scalar(FormulaNode::number(n)), Value::Element(lhs.clone()))
    } else {
        (Value::Element(lhs.clone()), Value::Scalar(FormulaNode::number(n)))
    };
    value::combine(op, a, b)?.into_element(false)
}

pub fn add(lhs: &Element, rhs: &Element) -> Result<Element> {
    binary(BinaryOp::Add, lhs, rhs)
}

pub fn sub(lhs: &Element, rhs: &Element) -> Result<Element> {
    binary(BinaryOp::Sub, lhs, rhs)
}

pub fn mul(lhs: &Element, rhs: &Element) -> Result<Element> {
    binary(BinaryOp::Mul, lhs, rhs)
}

pub fn div(lhs: &Element, rhs: &Element) -> Result<Element> {
    binary(BinaryOp::Div, lhs, rhs)
}

pub fn pow(lhs: &Element, rhs: &Element) -> Result<Element> {
    binary(BinaryOp::Pow, lhs, rhs)
}

/// Text concatenation (`&`).
pub fn concat(lhs: &Element, rhs: &Element) -> Result<Element> {
    binary(BinaryOp::Concat, lhs, rhs)
}

pub fn neg(operand: &Element) -> Result<Element> {
    value::unary(UnaryOp::Neg, Value::Element(operand.clone()))?.into_element(false)
}

/// A cell whose formula is the range from `first` to `last`.
pub fn range_of(first: &Element, last: &Element) -> Result<Element> {
    match (first, last) {
        (Element::Cell(a), Element::Cell(b)) => Ok(Element::Cell(Cell::from_formula(
            FormulaNode::Span(a.clone(), b.clone()),
        ))),
        (Element::Cell(_), other) | (other, _) => Err(SheetError::IncompatibleChild {
            container: "range",
            child: other.kind_name(),
        }),
    }
}

/// `first >> last`: two cells taken as one range operand.
#[derive(Clone, Debug)]
pub struct CellSpan {
    pub first: Cell,
    pub last: Cell,
}

impl From<CellSpan> for Operand {
    fn from(span: CellSpan) -> Operand {
        Operand::Span(span.first, span.last)
    }
}

impl Shr<&Cell> for &Cell {
    type Output = CellSpan;

    fn shr(self, last: &Cell) -> CellSpan {
        CellSpan {
            first: self.clone(),
            last: last.clone(),
        }
    }
}

fn cell_formula(op: BinaryOp, lhs: FormulaNode, rhs: FormulaNode) -> Cell {
    Cell::from_formula(FormulaNode::binary(op, lhs, rhs))
}

macro_rules! cell_operators {
    ($($trait:ident, $method:ident => $op:ident;)+) => {
        $(
            impl $trait<&Cell> for &Cell {
                type Output = Cell;

                fn $method(self, rhs: &Cell) -> Cell {
                    cell_formula(
                        BinaryOp::$op,
                        FormulaNode::Ref(self.clone()),
                        FormulaNode::Ref(rhs.clone()),
                    )
                }
            }

            impl $trait<f64> for &Cell {
                type Output = Cell;

                fn $method(self, rhs: f64) -> Cell {
                    cell_formula(
                        BinaryOp::$op,
                        FormulaNode::Ref(self.clone()),
                        FormulaNode::number(rhs),
                    )
                }
            }

            impl $trait<&Cell> for f64 {
                type Output = Cell;

                fn $method(self, rhs: &Cell) -> Cell {
                    cell_formula(
                        BinaryOp::$op,
                        FormulaNode::number(self),
                        FormulaNode::Ref(rhs.clone()),
                    )
                }
            }
        )+
    };
}

cell_operators! {
    Add, add => Add;
    Sub, sub => Sub;
    Mul, mul => Mul;
    Div, div => Div;
}

impl Neg for &Cell {
    type Output = Cell;

    fn neg(self) -> Cell {
        Cell::from_formula(FormulaNode::unary(UnaryOp::Neg, FormulaNode::Ref(self.clone())))
    }
}

/// Operators on vectors and frames broadcast, and fail when an operand still
/// holds pending producers.
macro_rules! block_operators {
    ($($ty:ty),+) => {
        $(
            block_operators!(@impl $ty, Add, add => Add);
            block_operators!(@impl $ty, Sub, sub => Sub);
            block_operators!(@impl $ty, Mul, mul => Mul);
            block_operators!(@impl $ty, Div, div => Div);

            impl Neg for &$ty {
                type Output = Result<Element>;

                fn neg(self) -> Result<Element> {
                    neg(&Element::from(self.clone()))
                }
            }
        )+
    };
    (@impl $ty:ty, $trait:ident, $method:ident => $op:ident) => {
        impl<R: Into<Element> + Clone> $trait<&R> for &$ty {
            type Output = Result<Element>;

            fn $method(self, rhs: &R) -> Result<Element> {
                binary(BinaryOp::$op, &Element::from(self.clone()), &rhs.clone().into())
            }
        }

        impl $trait<f64> for &$ty {
            type Output = Result<Element>;

            fn $method(self, rhs: f64) -> Result<Element> {
                with_number(BinaryOp::$op, &Element::from(self.clone()), rhs, false)
            }
        }

        impl $trait<&$ty> for f64 {
            type Output = Result<Element>;

            fn $method(self, rhs: &$ty) -> Result<Element> {
                with_number(BinaryOp::$op, &Element::from(rhs.clone()), self, true)
            }
        }
    };
}

block_operators!(Vector, Frame);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CellValue, Identified, Orientation};
    use crate::resolve::{Expression, FunctionCall};

    fn formula_of(el: &Element) -> FormulaNode {
        match el {
            Element::Cell(c) => c.formula().expect("formula cell"),
            other => panic!("expected a cell, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_operators_build_formulas() {
        let a = Cell::new(1);
        let b = Cell::new(2);
        let sum = &a + &b;
        assert!(matches!(
            sum.formula(),
            Some(FormulaNode::Binary { op: BinaryOp::Add, .. })
        ));
        let scaled = 2.0 * &a;
        assert!(matches!(
            scaled.formula(),
            Some(FormulaNode::Binary { op: BinaryOp::Mul, ref lhs, .. })
                if matches!(**lhs, FormulaNode::Literal(CellValue::Number(n)) if n == 2.0)
        ));
        assert!(matches!(
            (-&a).formula(),
            Some(FormulaNode::Unary { op: UnaryOp::Neg, .. })
        ));
    }

    #[test]
    fn test_vector_broadcasts_over_scalar() {
        let v = Vector::col([1, 2, 3]).unwrap();
        let doubled = (&v * 2.0).unwrap();
        match doubled {
            Element::Vector(out) => {
                assert_eq!(out.len(), 3);
                assert_eq!(out.orientation(), Orientation::Vertical);
                assert!(out.get_cell(2).unwrap().has_formula());
            }
            other => panic!("expected a vector, got {:?}", other),
        }
    }

    #[test]
    fn test_vectors_zip_to_shorter() {
        let a = Vector::col([1, 2, 3]).unwrap();
        let b = Vector::col([4, 5]).unwrap();
        let Element::Vector(out) = (&a + &b).unwrap() else {
            panic!("expected a vector");
        };
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_frame_minus_vector() {
        let frame = Frame::from_values(Orientation::Horizontal, vec![vec![1, 2], vec![3, 4]]).unwrap();
        let v = Vector::col([10, 20]).unwrap();
        let Element::Frame(out) = (&frame - &v).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(out.len(), 2);
        assert_eq!(out.get_vector(0).unwrap().len(), 2);
    }

    #[test]
    fn test_named_combinators() {
        let a = Element::from(Cell::new("x"));
        let b = Element::from(Cell::new("y"));
        assert!(matches!(
            formula_of(&concat(&a, &b).unwrap()),
            FormulaNode::Binary { op: BinaryOp::Concat, .. }
        ));
        assert!(matches!(
            formula_of(&pow(&a, &b).unwrap()),
            FormulaNode::Binary { op: BinaryOp::Pow, .. }
        ));
        assert!(matches!(formula_of(&range_of(&a, &b).unwrap()), FormulaNode::Span(..)));
    }

    #[test]
    fn test_pending_operands_are_rejected() {
        let expr = Element::from(Expression::new("[x] + 1").unwrap());
        let cell = Element::from(Cell::new(1));
        assert!(matches!(
            add(&expr, &cell),
            Err(SheetError::ArithmeticOnPendingExpression(ref t)) if t == "[x] + 1"
        ));
        let func = Element::from(FunctionCall::new("SUM", [1, 2]).unwrap());
        assert!(matches!(
            mul(&func, &cell),
            Err(SheetError::ArithmeticOnPendingFunction(ref n)) if n == "SUM"
        ));
        let stack = Element::from(crate::element::Stack::vertical([cell.clone()]).unwrap());
        assert!(matches!(sub(&stack, &cell), Err(SheetError::ArithmeticOnStack)));
        assert!(range_of(&stack, &cell).is_err());
    }

    #[test]
    fn test_span_operand() {
        let a = Cell::new(1);
        let b = Cell::new(2);
        let op = Operand::from(&a >> &b);
        assert!(matches!(op, Operand::Span(ref x, ref y) if x.ptr_eq(&a) && y.ptr_eq(&b)));
        assert!(a.id().is_none());
    }
}
