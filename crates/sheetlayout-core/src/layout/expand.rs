//! Turning spacing and gaps into real cells.
//!
//! Runs after headers are inserted so every extent is final. Margin and
//! padding become wrapper stacks of gaps; gaps then become empty cells,
//! vectors or frames sized to their siblings.

use crate::element::{
    Cell, ContainerAttrs, Element, Extent, Frame, Gap, Orientation, Stack, Vector, stacked_extent,
};
use crate::style::{Border, Sides};

/// Replace every child that carries margin or padding by a stack that
/// surrounds it with gaps. Padding gaps are filled and take over the
/// child's border; margin gaps stay blank.
pub fn wrap_spacing(el: &Element) {
    if !el.is_container() {
        return;
    }
    let inside_frame = matches!(el, Element::Frame(_));
    let mut children = el.children();
    let mut changed = false;
    for child in children.iter_mut() {
        wrap_spacing(child);
        let Some((margin, padding)) = child.with_attrs(|a| (a.margin, a.padding)) else {
            continue;
        };
        if margin.is_zero() && padding.is_zero() {
            continue;
        }
        if inside_frame {
            log::warn!(
                "margin and padding are ignored on {} inside a Frame",
                child.kind_name()
            );
            continue;
        }
        let mut wrapped = child.clone();
        if !padding.is_zero() {
            wrapped = wrap(wrapped, padding.resolved(), true);
        }
        if !margin.is_zero() {
            wrapped = wrap(wrapped, margin.resolved(), false);
        }
        *child = wrapped;
        changed = true;
    }
    if changed {
        el.set_children(children);
    }
}

fn stack_of(orientation: Orientation, children: Vec<Element>, attrs: ContainerAttrs) -> Stack {
    let stack = Stack::empty(orientation);
    {
        let mut data = stack.0.borrow_mut();
        data.children = children;
        data.attrs = attrs;
    }
    stack
}

fn wrap(inner: Element, sides: Sides<usize>, filled: bool) -> Element {
    let gap = |size: usize| Element::Gap(Gap::new(size).filled(filled));

    let mut across = Vec::with_capacity(3);
    if sides.left > 0 {
        across.push(gap(sides.left));
    }
    across.push(inner.clone());
    if sides.right > 0 {
        across.push(gap(sides.right));
    }
    let middle = stack_of(Orientation::Horizontal, across, ContainerAttrs::default());

    let mut down = Vec::with_capacity(3);
    if sides.top > 0 {
        down.push(gap(sides.top));
    }
    down.push(Element::Stack(middle));
    if sides.bottom > 0 {
        down.push(gap(sides.bottom));
    }

    let mut attrs = ContainerAttrs::default();
    if filled {
        // The padded block is what the border goes around.
        inner.with_attrs(|inner_attrs| {
            attrs.border = std::mem::replace(&mut inner_attrs.border, Border::default());
            attrs.background = inner_attrs.background;
            attrs.cell_style = inner_attrs.cell_style.clone();
        });
    }
    Element::Stack(stack_of(Orientation::Vertical, down, attrs))
}

/// Apply frame column widths / row heights to the vectors they name.
pub fn apply_sizes(el: &Element) {
    el.visit(&mut |node| {
        let Element::Frame(frame) = node else {
            return;
        };
        let (sizes, orientation) = {
            let data = frame.0.borrow();
            (data.sizes.clone(), data.orientation)
        };
        for (child, size) in frame.iter().zip(sizes) {
            let (Element::Vector(v), Some(size)) = (child, size) else {
                continue;
            };
            let mut data = v.0.borrow_mut();
            let style = &mut data.attrs.cell_style;
            match orientation {
                Orientation::Horizontal if style.col_width.is_none() => {
                    style.col_width = Some(size)
                }
                Orientation::Vertical if style.row_height.is_none() => {
                    style.row_height = Some(size)
                }
                _ => {}
            }
        }
    });
}

fn gap_cells(gap: &Gap, count: usize) -> Vec<Element> {
    (0..count)
        .map(|_| Element::Cell(Cell::gap_cell(gap.style.clone(), gap.fill)))
        .collect()
}

fn gap_vector(gap: &Gap, orientation: Orientation, len: usize) -> Vector {
    let vector = Vector::from_cells(orientation, Vec::new());
    {
        let mut data = vector.0.borrow_mut();
        data.children = gap_cells(gap, len);
        data.attrs.inherits_style = gap.fill;
    }
    vector
}

/// Length of a vector along its own axis, header included.
fn vector_len(v: &Vector) -> usize {
    v.orientation().along(v.extent())
}

/// Replace gaps by empty cells, bottom-up, and pad short frame vectors to
/// the longest one. Padding is styled only when the frame fills empties.
pub fn explode_gaps(el: &Element) {
    for child in el.children() {
        if child.is_container() {
            explode_gaps(&child);
        }
    }
    match el {
        Element::Vector(_) => {
            let children = el
                .children()
                .into_iter()
                .flat_map(|child| match child {
                    Element::Gap(gap) => gap_cells(&gap, gap.size),
                    other => vec![other],
                })
                .collect();
            el.set_children(children);
        }
        Element::Frame(frame) => explode_frame(el, frame),
        Element::Stack(stack) => {
            let orientation = stack.orientation();
            let children = el.children();
            let solid: Vec<Element> = children
                .iter()
                .filter(|c| !matches!(c, Element::Gap(_)))
                .cloned()
                .collect();
            let cross = orientation.across(stacked_extent(&solid, orientation)).max(1);
            let children = children
                .into_iter()
                .map(|child| match child {
                    Element::Gap(gap) => {
                        let vectors = (0..gap.size)
                            .map(|_| gap_vector(&gap, orientation.cross(), cross))
                            .collect();
                        let block = Frame::from_vectors(orientation, vectors);
                        block.0.borrow_mut().attrs.inherits_style = gap.fill;
                        Element::Frame(block)
                    }
                    other => other,
                })
                .collect();
            el.set_children(children);
        }
        _ => {}
    }
}

fn explode_frame(el: &Element, frame: &Frame) {
    let along = frame.orientation().cross();
    let depth = frame.vectors().iter().map(vector_len).max().unwrap_or(0);
    let children = el
        .children()
        .into_iter()
        .flat_map(|child| match child {
            Element::Gap(gap) => (0..gap.size)
                .map(|_| Element::Vector(gap_vector(&gap, along, depth.max(1))))
                .collect(),
            other => vec![other],
        })
        .collect();
    el.set_children(children);

    let filler = Gap::new(0).filled(frame.0.borrow().fill_empty);
    for v in frame.vectors() {
        let missing = depth.saturating_sub(vector_len(&v));
        if missing > 0 {
            v.0.borrow_mut().children.extend(gap_cells(&filler, missing));
        }
    }
}
