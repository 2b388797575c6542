//! Border normalization and per-child border masks.
//!
//! Users describe a border side loosely: `true`/`false`, a weight name
//! (`"thin"`, `"medium_dashed"`), a colour (`"FF0000"`), or a
//! `(weight, colour)` pair where either slot can be left unset, removed or
//! defaulted. [`BorderSide::normalize`] turns all of these into one canonical
//! form so that equivalent specs compare equal.
//!
//! A container's border draws the perimeter of the container, not a box
//! around every child. [`Border::masks`] splits it into the pieces the first,
//! middle and last child receive.

use crate::element::Orientation;
use crate::error::{Result, SheetError};
use crate::style::Color;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BorderWeight {
    Thin,
    Medium,
    Thick,
    Double,
    Hair,
    Dashed,
    Dotted,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl FromStr for BorderWeight {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<BorderWeight> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        let weight = match key.as_str() {
            "thin" => BorderWeight::Thin,
            "medium" => BorderWeight::Medium,
            "thick" => BorderWeight::Thick,
            "double" => BorderWeight::Double,
            "hair" => BorderWeight::Hair,
            "dashed" => BorderWeight::Dashed,
            "dotted" => BorderWeight::Dotted,
            "mediumdashed" => BorderWeight::MediumDashed,
            "dashdot" => BorderWeight::DashDot,
            "mediumdashdot" => BorderWeight::MediumDashDot,
            "dashdotdot" => BorderWeight::DashDotDot,
            "mediumdashdotdot" => BorderWeight::MediumDashDotDot,
            "slantdashdot" => BorderWeight::SlantDashDot,
            _ => return Err(SheetError::InvalidBorder(format!("unknown border weight {:?}", s))),
        };
        Ok(weight)
    }
}

/// Canonical state of one side.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum BorderSide {
    /// Not specified here; a parent may still supply it.
    #[default]
    Unset,
    /// Explicitly no border, which also blocks inheritance.
    Removed,
    Line { weight: BorderWeight, color: Color },
}

impl BorderSide {
    pub const DEFAULT: BorderSide = BorderSide::Line {
        weight: BorderWeight::Thin,
        color: Color::BLACK,
    };

    pub fn normalize(spec: impl Into<BorderSpec>) -> Result<BorderSide> {
        match spec.into() {
            BorderSpec::Unset => Ok(BorderSide::Unset),
            BorderSpec::Remove => Ok(BorderSide::Removed),
            BorderSpec::Default => Ok(BorderSide::DEFAULT),
            BorderSpec::Text(text) => {
                if let Ok(weight) = text.parse::<BorderWeight>() {
                    Ok(BorderSide::Line {
                        weight,
                        color: Color::BLACK,
                    })
                } else {
                    Ok(BorderSide::Line {
                        weight: BorderWeight::Thin,
                        color: parse_border_color(&text)?,
                    })
                }
            }
            BorderSpec::Pair(weight, color) => {
                if weight == Slot::Remove || color == Slot::Remove {
                    return Ok(BorderSide::Removed);
                }
                if weight == Slot::Unset && color == Slot::Unset {
                    return Ok(BorderSide::Unset);
                }
                let weight = match weight {
                    Slot::Value(text) => text.parse()?,
                    _ => BorderWeight::Thin,
                };
                let color = match color {
                    Slot::Value(text) => parse_border_color(&text)?,
                    _ => Color::BLACK,
                };
                Ok(BorderSide::Line { weight, color })
            }
        }
    }

    pub fn is_unset(self) -> bool {
        self == BorderSide::Unset
    }
}

fn parse_border_color(text: &str) -> Result<Color> {
    Color::hex(text).map_err(|_| {
        SheetError::InvalidBorder(format!(
            "{:?} is neither a border weight nor a 6-digit hex colour",
            text
        ))
    })
}

/// One slot of a `(weight, colour)` pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    Unset,
    Remove,
    Default,
    Value(String),
}

impl From<bool> for Slot {
    fn from(on: bool) -> Slot {
        if on { Slot::Default } else { Slot::Remove }
    }
}

impl From<&str> for Slot {
    fn from(text: &str) -> Slot {
        Slot::Value(text.to_string())
    }
}

impl<T: Into<Slot>> From<Option<T>> for Slot {
    fn from(value: Option<T>) -> Slot {
        value.map(Into::into).unwrap_or(Slot::Unset)
    }
}

/// Any accepted way of describing one border side.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BorderSpec {
    Unset,
    Remove,
    Default,
    /// A weight name or a hex colour.
    Text(String),
    Pair(Slot, Slot),
}

impl From<bool> for BorderSpec {
    fn from(on: bool) -> BorderSpec {
        if on { BorderSpec::Default } else { BorderSpec::Remove }
    }
}

impl From<&str> for BorderSpec {
    fn from(text: &str) -> BorderSpec {
        BorderSpec::Text(text.to_string())
    }
}

impl From<String> for BorderSpec {
    fn from(text: String) -> BorderSpec {
        BorderSpec::Text(text)
    }
}

impl<W: Into<Slot>, C: Into<Slot>> From<(W, C)> for BorderSpec {
    fn from((weight, color): (W, C)) -> BorderSpec {
        BorderSpec::Pair(weight.into(), color.into())
    }
}

impl<T: Into<BorderSpec>> From<Option<T>> for BorderSpec {
    fn from(value: Option<T>) -> BorderSpec {
        value.map(Into::into).unwrap_or(BorderSpec::Unset)
    }
}

/// A value per side, in CSS order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Clone> Sides<T> {
    pub fn uniform(value: T) -> Sides<T> {
        Sides {
            top: value.clone(),
            right: value.clone(),
            bottom: value.clone(),
            left: value,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

pub type Border = Sides<BorderSide>;

/// Border pieces for the first, middle and last child of a container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BorderMasks {
    pub first: Border,
    pub middle: Border,
    pub last: Border,
}

impl Border {
    pub fn all(spec: impl Into<BorderSpec>) -> Result<Border> {
        Ok(Sides::uniform(BorderSide::normalize(spec)?))
    }

    pub fn from_specs(
        top: impl Into<BorderSpec>,
        right: impl Into<BorderSpec>,
        bottom: impl Into<BorderSpec>,
        left: impl Into<BorderSpec>,
    ) -> Result<Border> {
        Ok(Sides {
            top: BorderSide::normalize(top)?,
            right: BorderSide::normalize(right)?,
            bottom: BorderSide::normalize(bottom)?,
            left: BorderSide::normalize(left)?,
        })
    }

    pub fn set(&mut self, side: Side, spec: impl Into<BorderSpec>) -> Result<()> {
        let value = BorderSide::normalize(spec)?;
        match side {
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Left => self.left = value,
        }
        Ok(())
    }

    pub fn is_unset(&self) -> bool {
        self.top.is_unset() && self.right.is_unset() && self.bottom.is_unset() && self.left.is_unset()
    }

    pub fn inherit_from(&mut self, parent: &Border) {
        for (mine, theirs) in [
            (&mut self.top, parent.top),
            (&mut self.right, parent.right),
            (&mut self.bottom, parent.bottom),
            (&mut self.left, parent.left),
        ] {
            if mine.is_unset() {
                *mine = theirs;
            }
        }
    }

    /// Split the perimeter for children laid out along `orientation`.
    pub fn masks(&self, orientation: Orientation) -> BorderMasks {
        let unset = BorderSide::Unset;
        match orientation {
            Orientation::Vertical => BorderMasks {
                first: Sides { bottom: unset, ..*self },
                middle: Sides { top: unset, bottom: unset, ..*self },
                last: Sides { top: unset, ..*self },
            },
            Orientation::Horizontal => BorderMasks {
                first: Sides { right: unset, ..*self },
                middle: Sides { left: unset, right: unset, ..*self },
                last: Sides { left: unset, ..*self },
            },
        }
    }

    /// The piece of this border that child `index` of `len` receives.
    pub fn for_child(&self, index: usize, len: usize, orientation: Orientation) -> Border {
        if len <= 1 {
            return *self;
        }
        let masks = self.masks(orientation);
        if index == 0 {
            masks.first
        } else if index + 1 == len {
            masks.last
        } else {
            masks.middle
        }
    }
}
