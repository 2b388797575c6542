//! Formula text generation.
//!
//! Runs at write time, after placement, so every placed cell has a
//! coordinate. Rules:
//!
//! - a placed cell renders as its coordinate, sheet-qualified only when it
//!   lives on another sheet
//! - an unplaced cell with a formula or a literal is inlined (warned once)
//! - an unplaced empty cell is `#REF!` (warned once)
//! - with strict references, any unplaced cell is an error
//! - ranges render `first:last`; headers count only when asked for
//! - binary operations are parenthesized, and one redundant outer pair is
//!   stripped from the finished formula

use crate::context::Context;
use crate::element::{Cell, CellValue, Element};
use crate::error::{Result, SheetError};
use crate::formula::FormulaNode;
use sheetlayout_engine::engine::{
    Location, UnaryOp, collapse_separators, escape_future_functions, strip_outer_parens,
};

const REF_ERROR: &str = "#REF!";
const MAX_INLINE_DEPTH: usize = 64;

pub struct FormulaWriter<'a> {
    sheet: &'a str,
    ctx: &'a Context,
    is_builtin: &'a dyn Fn(&str) -> bool,
}

impl<'a> FormulaWriter<'a> {
    /// Writer for formulas living on `sheet`.
    pub fn new(sheet: &'a str, ctx: &'a Context, is_builtin: &'a dyn Fn(&str) -> bool) -> Self {
        FormulaWriter {
            sheet,
            ctx,
            is_builtin,
        }
    }

    /// Complete `=`-prefixed cell formula.
    pub fn cell_formula(&self, node: &FormulaNode) -> Result<String> {
        let text = self.render(node, 0)?;
        let body = collapse_separators(strip_outer_parens(&text));
        let body = escape_future_functions(&body, |name| (self.is_builtin)(name));
        Ok(format!("={}", body))
    }

    fn render(&self, node: &FormulaNode, depth: usize) -> Result<String> {
        if depth > MAX_INLINE_DEPTH {
            return Err(SheetError::MissingReference(
                "formula nests too deeply through unplaced cells".to_string(),
            ));
        }
        match node {
            FormulaNode::Literal(value) => Ok(value.as_formula_literal()),
            FormulaNode::Ref(cell) => self.render_cell(cell, depth),
            FormulaNode::Range {
                target,
                include_headers,
            } => self.render_range(target, *include_headers, depth),
            FormulaNode::Span(first, last) => match (first.location(), last.location()) {
                (Some(a), Some(b)) => Ok(self.span(&a, &b)),
                _ => self.render_unplaced_block(
                    &[first.clone(), last.clone()],
                    "a cell span",
                    depth,
                ),
            },
            FormulaNode::Unary { op, operand } => {
                let inner = self.render(operand, depth)?;
                Ok(match op {
                    UnaryOp::Neg => format!("-{}", inner),
                    UnaryOp::Plus => format!("+{}", inner),
                    UnaryOp::Percent => format!("{}%", inner),
                })
            }
            FormulaNode::Binary { op, lhs, rhs } => {
                let lhs = self.render(lhs, depth)?;
                let rhs = self.render(rhs, depth)?;
                let symbol = op.symbol();
                if self.ctx.config().operator_spacing {
                    Ok(format!("({} {} {})", lhs, symbol, rhs))
                } else {
                    Ok(format!("({}{}{})", lhs, symbol, rhs))
                }
            }
            FormulaNode::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.render(arg, depth))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{}({})", name, args.join(", ")))
            }
            FormulaNode::List(items) => Ok(items
                .iter()
                .map(|item| self.render(item, depth))
                .collect::<Result<Vec<_>>>()?
                .join(", ")),
        }
    }

    fn render_cell(&self, cell: &Cell, depth: usize) -> Result<String> {
        if let Some(location) = cell.location() {
            return Ok(location.qualified(self.sheet));
        }
        if cell.value().is_empty() && !cell.has_formula() {
            return self.missing(&cell.describe());
        }
        if self.ctx.config().strict_references {
            return Err(SheetError::MissingReference(cell.describe()));
        }
        self.ctx.warn_inline_once(&cell.describe());
        match cell.formula() {
            Some(formula) => {
                let inner = self.render(&formula, depth + 1)?;
                Ok(format!("({})", strip_outer_parens(&inner)))
            }
            None => Ok(cell.value().as_formula_literal()),
        }
    }

    fn render_range(&self, target: &Element, include_headers: bool, depth: usize) -> Result<String> {
        let bounds = match target {
            Element::Cell(cell) => return self.render_cell(cell, depth),
            Element::Vector(v) => v.range(include_headers),
            Element::Frame(f) => f.range(include_headers),
            Element::Stack(_) => {
                let cells = block_cells(target, include_headers);
                match (cells.first(), cells.last()) {
                    (Some(first), Some(last)) => first.location().zip(last.location()),
                    _ => None,
                }
            }
            Element::Gap(_) => return Err(SheetError::ArithmeticOnGap),
            Element::Expr(e) => return Err(SheetError::ArithmeticOnPendingExpression(e.template())),
            Element::Func(f) => return Err(SheetError::ArithmeticOnPendingFunction(f.name())),
        };
        match bounds {
            Some((first, last)) => Ok(self.span(&first, &last)),
            None => {
                let cells = block_cells(target, include_headers);
                let what = format!("a {}", target.kind_name());
                self.render_unplaced_block(&cells, &what, depth)
            }
        }
    }

    /// Inline the content of cells that were never placed.
    fn render_unplaced_block(&self, cells: &[Cell], what: &str, depth: usize) -> Result<String> {
        if self.ctx.config().strict_references {
            return Err(SheetError::MissingReference(what.to_string()));
        }
        if cells.is_empty() {
            return self.missing(what);
        }
        self.ctx.warn_inline_once(what);
        let parts = cells
            .iter()
            .map(|cell| self.render_cell(cell, depth + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    fn missing(&self, what: &str) -> Result<String> {
        if self.ctx.config().strict_references {
            return Err(SheetError::MissingReference(what.to_string()));
        }
        self.ctx.warn_missing_once(what);
        Ok(REF_ERROR.to_string())
    }

    fn span(&self, first: &Location, last: &Location) -> String {
        if first == last {
            first.qualified(self.sheet)
        } else {
            format!("{}:{}", first.qualified(self.sheet), last.a1())
        }
    }
}

/// Cells covered by a block, optionally leaving header cells out.
fn block_cells(target: &Element, include_headers: bool) -> Vec<Cell> {
    target
        .leaf_cells()
        .into_iter()
        .filter(|cell| include_headers || !cell.is_header())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildConfig;
    use crate::element::{Orientation, Vector};
    use pretty_assertions::assert_eq;
    use sheetlayout_engine::builtins::is_builtin_function;
    use sheetlayout_engine::engine::BinaryOp;

    fn placed(value: i32, sheet: &str, row: usize, col: usize) -> Cell {
        let cell = Cell::new(value);
        cell.set_location(Location::new(sheet, row, col));
        cell
    }

    fn write(ctx: &Context, node: &FormulaNode) -> Result<String> {
        let builtin = |name: &str| is_builtin_function(name);
        FormulaWriter::new("Sheet1", ctx, &builtin).cell_formula(node)
    }

    #[test]
    fn test_binary_of_two_placed_cells() {
        let ctx = Context::new();
        let node = FormulaNode::binary(
            BinaryOp::Add,
            FormulaNode::Ref(placed(1, "Sheet1", 1, 1)),
            FormulaNode::Ref(placed(2, "Sheet1", 1, 2)),
        );
        assert_eq!(write(&ctx, &node).unwrap(), "=B2 + C2");
    }

    #[test]
    fn test_nested_binary_keeps_inner_parens() {
        let ctx = Context::new();
        let sum = FormulaNode::binary(
            BinaryOp::Add,
            FormulaNode::Ref(placed(1, "Sheet1", 0, 0)),
            FormulaNode::Ref(placed(2, "Sheet1", 0, 1)),
        );
        let node = FormulaNode::binary(BinaryOp::Mul, sum, FormulaNode::number(2.0));
        assert_eq!(write(&ctx, &node).unwrap(), "=(A1 + B1) * 2");
    }

    #[test]
    fn test_operator_spacing_off() {
        let ctx = Context::with_config(BuildConfig {
            operator_spacing: false,
            ..BuildConfig::default()
        });
        let node = FormulaNode::binary(
            BinaryOp::Sub,
            FormulaNode::Ref(placed(1, "Sheet1", 0, 0)),
            FormulaNode::number(1.0),
        );
        assert_eq!(write(&ctx, &node).unwrap(), "=A1-1");
    }

    #[test]
    fn test_cross_sheet_reference() {
        let ctx = Context::new();
        let node = FormulaNode::Ref(placed(1, "My Data", 2, 0));
        assert_eq!(write(&ctx, &node).unwrap(), "='My Data'!A3");
    }

    #[test]
    fn test_vector_range_and_future_function() {
        let ctx = Context::new();
        let cells: Vec<Cell> = (0..3).map(|i| placed(i, "Sheet1", i as usize, 3)).collect();
        let v = Vector::from_cells(Orientation::Vertical, cells);
        let node = FormulaNode::call(
            "XLOOKUP",
            vec![FormulaNode::Range {
                target: Element::Vector(v),
                include_headers: false,
            }],
        );
        assert_eq!(write(&ctx, &node).unwrap(), "=_xlfn.XLOOKUP(D1:D3)");
    }

    #[test]
    fn test_unplaced_cells() {
        let ctx = Context::new();
        let literal = FormulaNode::Ref(Cell::new("hi"));
        assert_eq!(write(&ctx, &literal).unwrap(), "=\"hi\"");
        assert!(ctx.inline_warned());

        let inner = Cell::from_formula(FormulaNode::binary(
            BinaryOp::Add,
            FormulaNode::Ref(placed(1, "Sheet1", 0, 0)),
            FormulaNode::number(1.0),
        ));
        let node = FormulaNode::binary(BinaryOp::Mul, FormulaNode::Ref(inner), FormulaNode::number(2.0));
        assert_eq!(write(&ctx, &node).unwrap(), "=(A1 + 1) * 2");

        let empty = FormulaNode::Ref(Cell::empty());
        assert_eq!(write(&ctx, &empty).unwrap(), "=#REF!");
    }

    #[test]
    fn test_strict_missing_reference() {
        let ctx = Context::with_config(BuildConfig {
            strict_references: true,
            ..BuildConfig::default()
        });
        let empty = FormulaNode::Ref(Cell::empty());
        assert!(matches!(write(&ctx, &empty), Err(SheetError::MissingReference(_))));

        let literal = FormulaNode::binary(
            BinaryOp::Add,
            FormulaNode::Ref(Cell::new(5)),
            FormulaNode::number(1.0),
        );
        assert!(matches!(write(&ctx, &literal), Err(SheetError::MissingReference(_))));
        let derived = FormulaNode::Ref(Cell::from_formula(FormulaNode::number(2.0)));
        assert!(matches!(write(&ctx, &derived), Err(SheetError::MissingReference(_))));
        assert!(!ctx.inline_warned());

        let v = Vector::col([1, 2]).unwrap();
        let range = FormulaNode::call(
            "SUM",
            vec![FormulaNode::Range {
                target: Element::Vector(v),
                include_headers: false,
            }],
        );
        assert!(matches!(write(&ctx, &range), Err(SheetError::MissingReference(_))));
    }

    #[test]
    fn test_unplaced_vector_is_inlined_leniently() {
        let ctx = Context::new();
        let v = Vector::col([1, 2]).unwrap();
        let node = FormulaNode::call(
            "SUM",
            vec![FormulaNode::Range {
                target: Element::Vector(v),
                include_headers: false,
            }],
        );
        assert_eq!(write(&ctx, &node).unwrap(), "=SUM(1, 2)");
    }

    #[test]
    fn test_dangling_separator_collapses() {
        let ctx = Context::new();
        let node = FormulaNode::call(
            "SUM",
            vec![
                FormulaNode::Ref(placed(1, "Sheet1", 0, 0)),
                FormulaNode::Literal(CellValue::Empty),
            ],
        );
        assert_eq!(write(&ctx, &node).unwrap(), "=SUM(A1)");
    }
}
