//! From a resolved tree to placed, styled cells.
//!
//! Steps, in order, for one sheet root:
//!
//! 1. schema renames and table column names ([`table`])
//! 2. header cells become the first child of their vector
//! 3. frame sizes, then margin and padding wrappers, then gap cells ([`expand`])
//! 4. coordinates ([`place`])
//! 5. style and border cascade ([`cascade`])
//!
//! Writing ([`write`]) and table definition follow once every sheet is laid
//! out, so cross-sheet formulas see final coordinates.

pub mod cascade;
pub mod expand;
pub mod place;
pub mod table;
pub mod write;

use crate::element::Element;
use sheetlayout_engine::engine::Location;

pub use cascade::{Inherited, cascade};
pub use place::place;

/// Steps 1 to 5 for a root placed at A1 of `sheet`.
pub fn lay_out(root: &Element, sheet: &str, inherited: &Inherited) {
    table::prepare_headers(root);
    root.visit(&mut |el| {
        if let Element::Vector(v) = el {
            v.insert_header_cell();
        }
    });
    expand::apply_sizes(root);
    expand::wrap_spacing(root);
    expand::explode_gaps(root);
    place(root, &Location::new(sheet, 0, 0));
    cascade(root, inherited);
}
