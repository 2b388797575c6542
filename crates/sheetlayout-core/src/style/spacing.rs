//! Margin and padding specs.
//!
//! Accepts the CSS shorthand forms:
//! - `[all]`
//! - `[vertical, horizontal]`
//! - `[top, horizontal, bottom]`
//! - `[top, right, bottom, left]`
//!
//! Per-side values set with [`Spacing::set`] always beat the shorthand,
//! regardless of the order they were given in.

use crate::error::{Result, SheetError};
use crate::style::{Side, Sides};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Spacing {
    shorthand: Option<Sides<usize>>,
    explicit: Sides<Option<usize>>,
}

impl Spacing {
    pub fn new() -> Spacing {
        Spacing::default()
    }

    /// Parse a 1 to 4 value shorthand.
    pub fn shorthand(values: &[usize]) -> Result<Sides<usize>> {
        let sides = match *values {
            [all] => Sides::uniform(all),
            [vertical, horizontal] => Sides {
                top: vertical,
                right: horizontal,
                bottom: vertical,
                left: horizontal,
            },
            [top, horizontal, bottom] => Sides {
                top,
                right: horizontal,
                bottom,
                left: horizontal,
            },
            [top, right, bottom, left] => Sides { top, right, bottom, left },
            _ => return Err(SheetError::InvalidSpacing(values.len())),
        };
        Ok(sides)
    }

    pub fn set_shorthand(&mut self, values: &[usize]) -> Result<()> {
        self.shorthand = Some(Spacing::shorthand(values)?);
        Ok(())
    }

    pub fn set(&mut self, side: Side, value: usize) {
        match side {
            Side::Top => self.explicit.top = Some(value),
            Side::Right => self.explicit.right = Some(value),
            Side::Bottom => self.explicit.bottom = Some(value),
            Side::Left => self.explicit.left = Some(value),
        }
    }

    /// Final per-side amounts. Unspecified sides are zero.
    pub fn resolved(&self) -> Sides<usize> {
        let base = self.shorthand.unwrap_or_default();
        Sides {
            top: self.explicit.top.unwrap_or(base.top),
            right: self.explicit.right.unwrap_or(base.right),
            bottom: self.explicit.bottom.unwrap_or(base.bottom),
            left: self.explicit.left.unwrap_or(base.left),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.resolved() == Sides::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_forms() {
        assert_eq!(Spacing::shorthand(&[2]).unwrap(), Sides::uniform(2));
        assert_eq!(
            Spacing::shorthand(&[1, 2]).unwrap(),
            Sides { top: 1, right: 2, bottom: 1, left: 2 }
        );
        assert_eq!(
            Spacing::shorthand(&[1, 2, 3]).unwrap(),
            Sides { top: 1, right: 2, bottom: 3, left: 2 }
        );
        assert_eq!(
            Spacing::shorthand(&[1, 2, 3, 4]).unwrap(),
            Sides { top: 1, right: 2, bottom: 3, left: 4 }
        );
    }

    #[test]
    fn test_bad_lengths() {
        assert!(matches!(Spacing::shorthand(&[]), Err(SheetError::InvalidSpacing(0))));
        assert!(matches!(Spacing::shorthand(&[1, 2, 3, 4, 5]), Err(SheetError::InvalidSpacing(5))));
    }

    #[test]
    fn test_explicit_side_wins_in_any_order() {
        let mut a = Spacing::new();
        a.set(Side::Left, 7);
        a.set_shorthand(&[1]).unwrap();

        let mut b = Spacing::new();
        b.set_shorthand(&[1]).unwrap();
        b.set(Side::Left, 7);

        assert_eq!(a.resolved(), b.resolved());
        assert_eq!(a.resolved().left, 7);
        assert_eq!(a.resolved().top, 1);
    }

    #[test]
    fn test_default_is_zero() {
        assert!(Spacing::new().is_zero());
    }
}
