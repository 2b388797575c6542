//! Style propagation and border masks.
//!
//! Walks the placed tree once. Each container merges its own attributes
//! over what it inherited, then hands every child its slice of the border:
//! the first child gets the leading edge, the last child the trailing edge,
//! and every child the two sides along the axis.

use crate::element::{ContainerAttrs, Element, Orientation};
use crate::style::{Border, CellStyle, Color};

/// What a node receives from its parent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inherited {
    pub cell_style: CellStyle,
    pub header_style: CellStyle,
    pub background: Option<Color>,
    pub border: Border,
}

pub fn cascade(el: &Element, parent: &Inherited) {
    match el {
        Element::Cell(cell) => {
            if !cell.inherits_style() {
                return;
            }
            let is_header = cell.is_header();
            cell.style_mut(|style| {
                style.border.inherit_from(&parent.border);
                if is_header {
                    style.inherit_from(&parent.header_style);
                }
                style.inherit_from(&parent.cell_style);
                if style.fill_color.is_none() {
                    style.fill_color = parent.background;
                }
            });
        }
        Element::Vector(_) | Element::Frame(_) | Element::Stack(_) => {
            let Some(Some(own)) =
                el.with_attrs(|attrs| attrs.inherits_style.then(|| merge(attrs, parent)))
            else {
                return;
            };
            let orientation = el.orientation().unwrap_or(Orientation::Vertical);
            let children = el.children();
            let len = children.len();
            for (index, child) in children.iter().enumerate() {
                let inherited = Inherited {
                    border: own.border.for_child(index, len, orientation),
                    ..own.clone()
                };
                cascade(child, &inherited);
            }
        }
        Element::Gap(_) | Element::Expr(_) | Element::Func(_) => {}
    }
}

fn merge(attrs: &ContainerAttrs, parent: &Inherited) -> Inherited {
    let mut cell_style = attrs.cell_style.clone();
    cell_style.inherit_from(&parent.cell_style);
    let mut header_style = attrs.header_style.clone();
    header_style.inherit_from(&parent.header_style);
    let mut border = attrs.border;
    border.inherit_from(&parent.border);
    Inherited {
        cell_style,
        header_style,
        background: attrs.background.or(parent.background),
        border,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::element::{Cell, Frame, Stack, Vector};
    use crate::style::BorderSide;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_border_splits_over_column() {
        let v = Vector::col([1, 2, 3]).unwrap().border(true).unwrap();
        cascade(&Element::from(v.clone()), &Inherited::default());
        let top = v.get_cell(0).unwrap().cell_style().border;
        let mid = v.get_cell(1).unwrap().cell_style().border;
        let bottom = v.get_cell(2).unwrap().cell_style().border;
        assert_eq!(top.top, BorderSide::DEFAULT);
        assert_eq!(top.bottom, BorderSide::Unset);
        assert_eq!(mid.top, BorderSide::Unset);
        assert_eq!(mid.left, BorderSide::DEFAULT);
        assert_eq!(mid.right, BorderSide::DEFAULT);
        assert_eq!(bottom.bottom, BorderSide::DEFAULT);
    }

    #[test]
    fn test_removed_side_blocks_parent() {
        let cell = Cell::new(1).style(CellStyle::new().border(false).unwrap());
        let v = Vector::col([cell.clone()]).unwrap().border(true).unwrap();
        cascade(&Element::from(v), &Inherited::default());
        assert_eq!(cell.cell_style().border.top, BorderSide::Removed);
    }

    #[test]
    fn test_header_style_beats_cell_style() {
        let ctx = Context::new();
        let v = Vector::col([1])
            .unwrap()
            .with_header(&ctx, "H")
            .cell_style(CellStyle::new().bold(false).italic(true))
            .header_style(CellStyle::new().bold(true));
        v.insert_header_cell();
        cascade(&Element::from(v.clone()), &Inherited::default());
        let header = v.header_cell().unwrap().cell_style();
        assert_eq!(header.bold, Some(true));
        assert_eq!(header.italic, Some(true));
        assert_eq!(v.get_cell(0).unwrap().cell_style().bold, Some(false));
    }

    #[test]
    fn test_background_fills_unset_cells_only() {
        let red = Color::rgb(0xFF0000);
        let blue = Color::rgb(0x0000FF);
        let plain = Cell::new(1);
        let painted = Cell::new(2).style(CellStyle::new().fill_color(blue));
        let frame = Frame::columns([Vector::col([plain.clone(), painted.clone()]).unwrap()])
            .unwrap()
            .background(red);
        let stack = Stack::vertical([frame]).unwrap();
        cascade(&Element::from(stack), &Inherited::default());
        assert_eq!(plain.cell_style().fill_color, Some(red));
        assert_eq!(painted.cell_style().fill_color, Some(blue));
    }

    #[test]
    fn test_blank_gap_material_is_skipped() {
        let gap = Cell::gap_cell(CellStyle::default(), false);
        let v = Vector::col([gap.clone()]).unwrap().cell_style(CellStyle::new().bold(true));
        cascade(&Element::from(v), &Inherited::default());
        assert!(gap.cell_style().is_unset());
    }

    proptest! {
        #[test]
        fn prop_set_values_survive_cascade(
            own in proptest::option::of(any::<bool>()),
            parent in proptest::option::of(any::<bool>()),
            grand in proptest::option::of(any::<bool>()),
        ) {
            let mut cell_style = CellStyle::new();
            cell_style.bold = own;
            let cell = Cell::new(1).style(cell_style);
            let mut vector_style = CellStyle::new();
            vector_style.bold = parent;
            let v = Vector::col([cell.clone()]).unwrap().cell_style(vector_style);
            let mut top = CellStyle::new();
            top.bold = grand;
            let inherited = Inherited { cell_style: top, ..Inherited::default() };
            cascade(&Element::from(v), &inherited);
            prop_assert_eq!(cell.cell_style().bold, own.or(parent).or(grand));
        }

        #[test]
        fn prop_cascade_is_idempotent_on_set_fields(width in 1.0f64..200.0, parent in 1.0f64..200.0) {
            let cell = Cell::new(1).style(CellStyle::new().col_width(width));
            let v = Vector::col([cell.clone()]).unwrap().cell_style(CellStyle::new().col_width(parent));
            let el = Element::from(v);
            cascade(&el, &Inherited::default());
            cascade(&el, &Inherited::default());
            prop_assert_eq!(cell.cell_style().col_width, Some(width));
        }
    }
}
