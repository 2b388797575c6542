//! Reference and function resolution.
//!
//! Expressions and function calls sit in the tree as pending producers.
//! Each pass of [`resolve_to_fixed_point`] binds whatever keys it can, then
//! evaluates every producer whose keys are all bound and splices the result
//! into the parent container. Passes repeat until nothing is pending, no
//! progress is made, or the configured attempt limit runs out.

pub mod driver;
pub mod expression;
pub mod function;
pub mod value;

use crate::context::Context;
use crate::element::{Element, Identified};
use crate::error::Result;
use crate::style::CellStyle;

pub use driver::{resolve_container_recursive, resolve_to_fixed_point};
pub use expression::Expression;
pub use function::{FunctionCall, Operand};
pub use value::{Series, Value};

/// What a producer stamps onto the element it evaluates to.
#[derive(Clone, Debug, Default)]
pub(crate) struct Produces {
    pub id: Option<String>,
    pub header: Option<String>,
    pub cell_style: CellStyle,
    pub header_style: CellStyle,
}

impl Produces {
    /// Apply to `el` without overriding anything it already has, and
    /// register the declared id and header against it.
    pub fn apply(&self, el: &Element, ctx: &Context) -> Result<()> {
        if let Some(id) = &self.id {
            ctx.register_id(id, el)?;
            if el.id().is_none() {
                match el {
                    Element::Cell(c) => c.0.borrow_mut().id = Some(id.clone()),
                    other => {
                        other.with_attrs(|attrs| attrs.id = Some(id.clone()));
                    }
                }
            }
        }
        if let Some(header) = &self.header {
            ctx.register_header(header, el);
            if el.header().is_none() {
                match el {
                    Element::Cell(c) => c.0.borrow_mut().header = Some(header.clone()),
                    Element::Vector(v) => v.set_header(Some(header.clone())),
                    _ => log::debug!("{} cannot carry header {:?}", el.kind_name(), header),
                }
            }
        }
        match el {
            Element::Cell(c) => c.style_mut(|style| style.inherit_from(&self.cell_style)),
            other => {
                other.with_attrs(|attrs| {
                    attrs.cell_style.inherit_from(&self.cell_style);
                    attrs.header_style.inherit_from(&self.header_style);
                });
            }
        }
        Ok(())
    }
}
