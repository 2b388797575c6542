//! Reference template and formula text API.
//!
//! This module provides the tree-agnostic pieces of the layout compiler:
//!
//! - [`Location`] - Placed cell positions (row/col on a sheet ↔ A1 notation)
//! - [`extract_placeholders`] - Find `[key]` placeholders in a template
//! - [`prepare_template`] - Rewrite placeholders and parse into an [`Expr`]
//! - [`parse_expression`] - The restricted expression grammar
//! - [`detect_cycle`] - Circular reference detection between keys
//! - [`strip_outer_parens`], [`collapse_separators`], [`escape_future_functions`] -
//!   Formula text clean-up

mod ast;
mod cycle;
mod deps;
mod format;
mod location;
mod parser;
mod preprocess;

pub use ast::{BinaryOp, Expr, IndexKey, UnaryOp};
pub use cycle::detect_cycle;
pub use deps::{Placeholder, RefKey, distinct_keys, extract_placeholders};
pub use format::{
    collapse_separators, escape_future_functions, format_number, quote_text, strip_outer_parens,
};
pub use location::{Location, quote_sheet_name};
pub use parser::parse_expression;
pub use preprocess::{PreparedTemplate, prepare_template, rewrite_template};
