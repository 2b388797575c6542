//! Attributes shared by every container kind.

use crate::style::{Border, CellStyle, Color, Spacing};
use sheetlayout_engine::engine::Location;

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerAttrs {
    pub id: Option<String>,
    /// Perimeter border, split over the children by position.
    pub border: Border,
    /// Style every cell inside inherits.
    pub cell_style: CellStyle,
    /// Style header cells inside inherit, ahead of `cell_style`.
    pub header_style: CellStyle,
    /// Fill colour for cells (and filled gaps) that set none.
    pub background: Option<Color>,
    pub margin: Spacing,
    pub padding: Spacing,
    pub location: Option<Location>,
    /// False for unfilled gap material, which takes no styling at all.
    pub inherits_style: bool,
}

impl Default for ContainerAttrs {
    fn default() -> Self {
        ContainerAttrs {
            id: None,
            border: Border::default(),
            cell_style: CellStyle::default(),
            header_style: CellStyle::default(),
            background: None,
            margin: Spacing::default(),
            padding: Spacing::default(),
            location: None,
            inherits_style: true,
        }
    }
}

/// Builder and accessor methods every container handle exposes. Expanded
/// inside each handle's `impl` block; the handle must be a tuple struct over
/// `Rc<RefCell<Data>>` where `Data` has an `attrs: ContainerAttrs` field.
macro_rules! container_builders {
    () => {
        /// Register this container under `id` in the build context.
        pub fn with_id(self, ctx: &$crate::context::Context, id: &str) -> $crate::error::Result<Self> {
            ctx.register_id(id, &$crate::element::Element::from(self.clone()))?;
            self.0.borrow_mut().attrs.id = Some(id.to_string());
            Ok(self)
        }

        /// Same border on all four sides of the perimeter.
        pub fn border(self, spec: impl Into<$crate::style::BorderSpec>) -> $crate::error::Result<Self> {
            self.0.borrow_mut().attrs.border = $crate::style::Border::all(spec)?;
            Ok(self)
        }

        pub fn border_side(
            self,
            side: $crate::style::Side,
            spec: impl Into<$crate::style::BorderSpec>,
        ) -> $crate::error::Result<Self> {
            self.0.borrow_mut().attrs.border.set(side, spec)?;
            Ok(self)
        }

        pub fn cell_style(self, style: $crate::style::CellStyle) -> Self {
            self.0.borrow_mut().attrs.cell_style = style;
            self
        }

        pub fn header_style(self, style: $crate::style::CellStyle) -> Self {
            self.0.borrow_mut().attrs.header_style = style;
            self
        }

        pub fn background(self, color: $crate::style::Color) -> Self {
            self.0.borrow_mut().attrs.background = Some(color);
            self
        }

        /// Unfilled space outside the element, as 1 to 4 values.
        pub fn margin(self, values: &[usize]) -> $crate::error::Result<Self> {
            self.0.borrow_mut().attrs.margin.set_shorthand(values)?;
            Ok(self)
        }

        pub fn margin_side(self, side: $crate::style::Side, value: usize) -> Self {
            self.0.borrow_mut().attrs.margin.set(side, value);
            self
        }

        /// Filled space inside the element's border, as 1 to 4 values.
        pub fn padding(self, values: &[usize]) -> $crate::error::Result<Self> {
            self.0.borrow_mut().attrs.padding.set_shorthand(values)?;
            Ok(self)
        }

        pub fn padding_side(self, side: $crate::style::Side, value: usize) -> Self {
            self.0.borrow_mut().attrs.padding.set(side, value);
            self
        }

        /// Top-left corner once placed.
        pub fn location(&self) -> Option<sheetlayout_engine::engine::Location> {
            self.0.borrow().attrs.location.clone()
        }

        pub fn attrs(&self) -> $crate::element::ContainerAttrs {
            self.0.borrow().attrs.clone()
        }

        pub fn ptr_eq(&self, other: &Self) -> bool {
            std::rc::Rc::ptr_eq(&self.0, &other.0)
        }
    };
}

pub(crate) use container_builders;
