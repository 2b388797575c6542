//! Formula trees attached to cells.
//!
//! A [`FormulaNode`] points at other layout elements rather than at
//! coordinates; the coordinates only exist once the tree is placed, and are
//! filled in by [`serialize::FormulaWriter`] when the cell is written.

pub mod serialize;

use crate::element::{Cell, CellValue, Element};
use sheetlayout_engine::engine::{BinaryOp, UnaryOp};

pub use serialize::FormulaWriter;

#[derive(Clone, Debug)]
pub enum FormulaNode {
    Literal(CellValue),
    /// A single cell.
    Ref(Cell),
    /// The block a vector, frame or stack covers.
    Range {
        target: Element,
        include_headers: bool,
    },
    /// From one cell to another, e.g. one row across a frame.
    Span(Cell, Cell),
    Unary {
        op: UnaryOp,
        operand: Box<FormulaNode>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<FormulaNode>,
        rhs: Box<FormulaNode>,
    },
    Call {
        name: String,
        args: Vec<FormulaNode>,
    },
    /// Comma-separated arguments spread into a call.
    List(Vec<FormulaNode>),
}

impl FormulaNode {
    pub fn binary(op: BinaryOp, lhs: FormulaNode, rhs: FormulaNode) -> FormulaNode {
        FormulaNode::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, operand: FormulaNode) -> FormulaNode {
        FormulaNode::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<FormulaNode>) -> FormulaNode {
        FormulaNode::Call {
            name: name.into(),
            args,
        }
    }

    pub fn number(n: f64) -> FormulaNode {
        FormulaNode::Literal(CellValue::Number(n))
    }

    pub fn text(s: impl Into<String>) -> FormulaNode {
        FormulaNode::Literal(CellValue::Text(s.into()))
    }
}
