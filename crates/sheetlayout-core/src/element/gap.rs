//! Empty space inside a container.

use crate::style::CellStyle;

/// `size` empty cells along the parent's axis. Inside a Frame or Stack a gap
/// becomes whole empty vectors, sized to its siblings.
#[derive(Clone, Debug, PartialEq)]
pub struct Gap {
    pub size: usize,
    /// Filled gaps take the container's background and cell style; unfilled
    /// gaps stay blank.
    pub fill: bool,
    pub style: CellStyle,
}

impl Gap {
    pub fn new(size: usize) -> Gap {
        Gap {
            size,
            fill: false,
            style: CellStyle::default(),
        }
    }

    pub fn filled(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }
}
