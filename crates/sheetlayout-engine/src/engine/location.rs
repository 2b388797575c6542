//! Cell locations and A1 notation.
//!
//! A [`Location`] is a zero-indexed `(row, col)` pair bound to a sheet name.
//! It renders as spreadsheet-style `A1` text, and as a sheet-qualified
//! reference (`'My Sheet'!B2`) when a formula on another sheet points at it.
//!
//! # Examples
//!
//! ```ignore
//! let loc = Location::new("Sheet1", 2, 1);
//! assert_eq!(loc.to_string(), "B3");
//! assert_eq!(loc.qualified("Other"), "Sheet1!B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A placed cell position (0-indexed) on a named sheet.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
    pub sheet: String,
}

impl Location {
    pub fn new(sheet: impl Into<String>, row: usize, col: usize) -> Location {
        Location {
            row,
            col,
            sheet: sheet.into(),
        }
    }

    /// Location shifted down by `rows` and right by `cols` on the same sheet.
    pub fn offset(&self, rows: usize, cols: usize) -> Location {
        Location {
            row: self.row + rows,
            col: self.col + cols,
            sheet: self.sheet.clone(),
        }
    }

    /// Parse `A1` notation on the given sheet. Returns None if the input is invalid.
    pub fn parse_a1(sheet: &str, name: &str) -> Option<Location> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;
        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(Location::new(sheet, row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Unqualified `A1` text.
    pub fn a1(&self) -> String {
        format!("{}{}", Location::col_to_letters(self.col), self.row + 1)
    }

    /// Reference text as seen from a formula living on `from_sheet`.
    /// The sheet prefix is only emitted when the reference crosses sheets.
    pub fn qualified(&self, from_sheet: &str) -> String {
        if self.sheet == from_sheet {
            self.a1()
        } else {
            format!("{}!{}", quote_sheet_name(&self.sheet), self.a1())
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.a1())
    }
}

/// Quote a sheet name for use in a formula when it contains characters
/// (spaces, hyphens, punctuation) that the formula grammar would split on.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    let leading_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
    if plain && !leading_digit {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$")
            .expect("A1 location regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_rendering() {
        assert_eq!(Location::new("S", 0, 0).to_string(), "A1");
        assert_eq!(Location::new("S", 1, 2).to_string(), "C2");
        assert_eq!(Location::new("S", 9, 26).to_string(), "AA10");
    }

    #[test]
    fn test_parse_a1_roundtrips_and_rejects_garbage() {
        let loc = Location::parse_a1("S", "ab12").unwrap();
        assert_eq!((loc.row, loc.col), (11, 27));
        assert!(Location::parse_a1("S", "A0").is_none());
        assert!(Location::parse_a1("S", "12").is_none());
        let huge = format!("{}1", "Z".repeat(40));
        assert!(Location::parse_a1("S", &huge).is_none());
    }

    #[test]
    fn test_qualified_only_across_sheets() {
        let loc = Location::new("Data", 1, 1);
        assert_eq!(loc.qualified("Data"), "B2");
        assert_eq!(loc.qualified("Summary"), "Data!B2");
    }

    #[test]
    fn test_quote_sheet_name() {
        assert_eq!(quote_sheet_name("Sheet1"), "Sheet1");
        assert_eq!(quote_sheet_name("My Sheet"), "'My Sheet'");
        assert_eq!(quote_sheet_name("q1-q2"), "'q1-q2'");
        assert_eq!(quote_sheet_name("Bob's"), "'Bob''s'");
        assert_eq!(quote_sheet_name("2024"), "'2024'");
    }

    #[test]
    fn test_col_to_letters_handles_max_usize() {
        let letters = Location::col_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }
}
