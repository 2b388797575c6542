//! Cell styling and the "unset wins" cascade.
//!
//! Every attribute of a [`CellStyle`] is optional. A style only ever fills
//! the attributes it has not set itself from a parent style, so a value set
//! close to the cell always beats one set further up the tree:
//!
//! - Workbook -> Sheet -> Stack -> Frame -> Vector -> Cell
//! - borders cascade per side (see [`border`])
//! - margins and padding resolve per side (see [`spacing`])

pub mod border;
pub mod spacing;

use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use border::{Border, BorderMasks, BorderSide, BorderSpec, BorderWeight, Side, Sides, Slot};
pub use spacing::Spacing;

/// 24-bit RGB colour.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    pub fn rgb(value: u32) -> Color {
        Color(value & 0xFF_FFFF)
    }

    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn hex(text: &str) -> Result<Color> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SheetError::InvalidColor(text.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color)
            .map_err(|_| SheetError::InvalidColor(text.to_string()))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl FromStr for Color {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Color> {
        Color::hex(s)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Fill,
    Justify,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Formatting applied to a single cell once the cascade has run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<Color>,
    pub fill_color: Option<Color>,
    pub align: Option<Align>,
    pub valign: Option<VAlign>,
    pub indent: Option<u8>,
    pub wrap: Option<bool>,
    pub number_format: Option<String>,
    pub border: Border,
    pub col_width: Option<f64>,
    pub row_height: Option<f64>,
    pub autofit: Option<bool>,
}

macro_rules! inherit_fields {
    ($self:ident, $parent:ident, $($field:ident),+ $(,)?) => {
        $(
            if $self.$field.is_none() {
                $self.$field = $parent.$field.clone();
            }
        )+
    };
}

impl CellStyle {
    pub fn new() -> CellStyle {
        CellStyle::default()
    }

    /// Fill every attribute this style leaves unset from `parent`.
    pub fn inherit_from(&mut self, parent: &CellStyle) {
        inherit_fields!(
            self,
            parent,
            bold,
            italic,
            underline,
            font_name,
            font_size,
            font_color,
            fill_color,
            align,
            valign,
            indent,
            wrap,
            number_format,
            col_width,
            row_height,
            autofit,
        );
        self.border.inherit_from(&parent.border);
    }

    /// True if nothing is set, so the cell takes the writer's default format.
    pub fn is_unset(&self) -> bool {
        *self == CellStyle::default()
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.bold = Some(on);
        self
    }

    pub fn italic(mut self, on: bool) -> Self {
        self.italic = Some(on);
        self
    }

    pub fn underline(mut self, on: bool) -> Self {
        self.underline = Some(on);
        self
    }

    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_color(mut self, color: Color) -> Self {
        self.font_color = Some(color);
        self
    }

    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = Some(valign);
        self
    }

    pub fn indent(mut self, level: u8) -> Self {
        self.indent = Some(level);
        self
    }

    pub fn wrap(mut self, on: bool) -> Self {
        self.wrap = Some(on);
        self
    }

    pub fn number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = Some(format.into());
        self
    }

    /// Same border on all four sides.
    pub fn border(mut self, spec: impl Into<BorderSpec>) -> Result<Self> {
        self.border = Border::all(spec)?;
        Ok(self)
    }

    pub fn col_width(mut self, width: f64) -> Self {
        self.col_width = Some(width);
        self
    }

    pub fn row_height(mut self, height: f64) -> Self {
        self.row_height = Some(height);
        self
    }

    pub fn autofit(mut self, on: bool) -> Self {
        self.autofit = Some(on);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::hex("FFEE00").unwrap().value(), 0xFFEE00);
        assert_eq!(Color::hex("#00ff00").unwrap().value(), 0x00FF00);
        assert_eq!(Color::hex("00ff00").unwrap().to_string(), "00FF00");
        assert!(matches!(Color::hex("FFF"), Err(SheetError::InvalidColor(_))));
        assert!(matches!(Color::hex("GGGGGG"), Err(SheetError::InvalidColor(_))));
    }

    #[test]
    fn test_unset_wins() {
        let parent = CellStyle::new().bold(true).font_size(14.0);
        let mut child = CellStyle::new().bold(false);
        child.inherit_from(&parent);
        assert_eq!(child.bold, Some(false));
        assert_eq!(child.font_size, Some(14.0));
    }

    #[test]
    fn test_empty_style_is_unset() {
        assert!(CellStyle::new().is_unset());
        assert!(!CellStyle::new().wrap(true).is_unset());
    }

    fn arb_style() -> impl Strategy<Value = CellStyle> {
        (
            proptest::option::of(any::<bool>()),
            proptest::option::of(1.0f64..40.0),
            proptest::option::of(0u32..0xFF_FFFF),
            proptest::option::of(0u8..5),
        )
            .prop_map(|(bold, size, fill, indent)| CellStyle {
                bold,
                font_size: size,
                fill_color: fill.map(Color::rgb),
                indent,
                ..CellStyle::default()
            })
    }

    proptest! {
        #[test]
        fn test_inherit_never_overrides_set_fields(child in arb_style(), parent in arb_style()) {
            let mut merged = child.clone();
            merged.inherit_from(&parent);
            if child.bold.is_some() { prop_assert_eq!(merged.bold, child.bold); }
            else { prop_assert_eq!(merged.bold, parent.bold); }
            if child.font_size.is_some() { prop_assert_eq!(merged.font_size, child.font_size); }
            else { prop_assert_eq!(merged.font_size, parent.font_size); }
            if child.fill_color.is_some() { prop_assert_eq!(merged.fill_color, child.fill_color); }
            else { prop_assert_eq!(merged.fill_color, parent.fill_color); }
            if child.indent.is_some() { prop_assert_eq!(merged.indent, child.indent); }
            else { prop_assert_eq!(merged.indent, parent.indent); }
        }

        #[test]
        fn test_inherit_is_idempotent(child in arb_style(), parent in arb_style()) {
            let mut once = child.clone();
            once.inherit_from(&parent);
            let mut twice = once.clone();
            twice.inherit_from(&parent);
            prop_assert_eq!(once, twice);
        }
    }
}
