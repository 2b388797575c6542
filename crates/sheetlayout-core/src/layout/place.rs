//! Coordinate assignment.

use crate::element::{Element, Extent};
use sheetlayout_engine::engine::Location;

/// Give `el` and everything below it a location, depth first, with `el`'s
/// top-left corner at `origin`.
pub fn place(el: &Element, origin: &Location) {
    match el {
        Element::Cell(cell) => cell.set_location(origin.clone()),
        Element::Gap(_) | Element::Expr(_) | Element::Func(_) => {}
        container => {
            container.with_attrs(|attrs| attrs.location = Some(origin.clone()));
            let Some(orientation) = container.orientation() else {
                return;
            };
            let (rows, cols) = orientation.step();
            let mut offset = 0;
            for child in container.children() {
                place(&child, &origin.offset(rows * offset, cols * offset));
                offset += match &child {
                    Element::Gap(gap) => gap.size,
                    other => orientation.along(other.extent()),
                };
            }
        }
    }
}
