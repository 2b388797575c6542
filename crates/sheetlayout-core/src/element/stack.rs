//! Heterogeneous groups: vectors, frames and other stacks side by side or
//! one above the other.

use crate::element::attrs::container_builders;
use crate::element::frame::promote_cell;
use crate::element::{
    Bordered, ContainerAttrs, Element, Extent, Identified, Orientation, stacked_extent,
};
use crate::error::Result;
use crate::style::Border;
use std::cell::RefCell;
use std::rc::Rc;

pub struct StackData {
    pub(crate) orientation: Orientation,
    pub(crate) children: Vec<Element>,
    pub(crate) attrs: ContainerAttrs,
}

/// Shared handle to a stack.
#[derive(Clone)]
pub struct Stack(pub(crate) Rc<RefCell<StackData>>);

impl Stack {
    pub fn new(
        orientation: Orientation,
        items: impl IntoIterator<Item = impl Into<Element>>,
    ) -> Result<Stack> {
        let stack = Stack::empty(orientation);
        for item in items {
            stack.push(item)?;
        }
        Ok(stack)
    }

    /// Children left to right.
    pub fn horizontal(items: impl IntoIterator<Item = impl Into<Element>>) -> Result<Stack> {
        Stack::new(Orientation::Horizontal, items)
    }

    /// Children top to bottom.
    pub fn vertical(items: impl IntoIterator<Item = impl Into<Element>>) -> Result<Stack> {
        Stack::new(Orientation::Vertical, items)
    }

    pub(crate) fn empty(orientation: Orientation) -> Stack {
        Stack(Rc::new(RefCell::new(StackData {
            orientation,
            children: Vec::new(),
            attrs: ContainerAttrs::default(),
        })))
    }

    container_builders!();

    pub fn orientation(&self) -> Orientation {
        self.0.borrow().orientation
    }

    pub fn len(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Element> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Element> {
        self.iter().find(|child| child.id().as_deref() == Some(id))
    }

    pub fn get_by_header(&self, header: &str) -> Option<Element> {
        self.iter().find(|child| child.header().as_deref() == Some(header))
    }

    /// Add a child. A lone cell becomes a one-cell vector across the stack.
    pub fn push(&self, item: impl Into<Element>) -> Result<()> {
        let child = self.check_child(item.into());
        self.0.borrow_mut().children.push(child);
        Ok(())
    }

    pub fn insert(&self, index: usize, item: impl Into<Element>) -> Result<()> {
        let child = self.check_child(item.into());
        let mut data = self.0.borrow_mut();
        let at = index.min(data.children.len());
        data.children.insert(at, child);
        Ok(())
    }

    pub fn iter(&self) -> std::vec::IntoIter<Element> {
        self.0.borrow().children.clone().into_iter()
    }

    fn check_child(&self, item: Element) -> Element {
        match item {
            Element::Cell(cell) => Element::Vector(promote_cell(cell, self.orientation().cross())),
            other => other,
        }
    }
}

impl Identified for Stack {
    fn id(&self) -> Option<String> {
        self.0.borrow().attrs.id.clone()
    }

    fn header(&self) -> Option<String> {
        None
    }
}

impl Bordered for Stack {
    fn outline(&self) -> Border {
        self.0.borrow().attrs.border
    }
}

impl Extent for Stack {
    fn extent(&self) -> (usize, usize) {
        let data = self.0.borrow();
        stacked_extent(&data.children, data.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Cell, Frame, Vector};

    #[test]
    fn test_mixed_children_extent() {
        let col = Vector::col([1, 2, 3]).unwrap();
        let frame = Frame::from_values(Orientation::Horizontal, vec![vec![1, 2], vec![3, 4]]).unwrap();
        let stack = Stack::horizontal([Element::from(col), Element::from(frame)]).unwrap();
        assert_eq!(stack.extent(), (3, 3));
    }

    #[test]
    fn test_cell_child_becomes_vector() {
        let stack = Stack::vertical([Cell::new(1)]).unwrap();
        match stack.get(0) {
            Some(Element::Vector(v)) => assert_eq!(v.orientation(), Orientation::Horizontal),
            other => panic!("expected a vector, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_stacks() {
        let inner = Stack::horizontal([Vector::col([1]).unwrap()]).unwrap();
        let outer = Stack::vertical([inner.clone()]).unwrap();
        assert_eq!(outer.len(), 1);
        assert!(matches!(outer.get(0), Some(Element::Stack(s)) if s.ptr_eq(&inner)));
    }
}
