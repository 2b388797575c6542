//! Formula text helpers.
//!
//! Serialization assembles formula text from fragments; these helpers do the
//! final clean-up passes:
//!
//! - [`strip_outer_parens`] removes one redundant pair around the whole formula
//! - [`collapse_separators`] turns leftover `", )"` into `")"`
//! - [`escape_future_functions`] prefixes function names the writer does not
//!   know with `_xlfn.` so they are not flagged as invalid syntax
//!
//! All passes leave string literals and quoted sheet names alone.

use regex::Regex;
use std::sync::OnceLock;

const FUTURE_PREFIX: &str = "_xlfn.";

/// Format a number as a formula literal.
pub fn format_number(n: f64) -> String {
    if n.is_nan() || n.is_infinite() {
        "#NUM!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Quote text as a formula string literal.
pub fn quote_text(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Strip one pair of parentheses wrapping the entire formula, if the opening
/// paren really closes at the end.
pub fn strip_outer_parens(formula: &str) -> &str {
    let trimmed = formula.trim();
    if !(trimmed.starts_with('(') && trimmed.ends_with(')')) {
        return trimmed;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, ch) in trimmed.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && idx != trimmed.len() - 1 {
                    return trimmed;
                }
            }
            _ => {}
        }
    }
    trimmed[1..trimmed.len() - 1].trim()
}

/// Collapse a separator left dangling before a closing paren.
pub fn collapse_separators(formula: &str) -> String {
    map_outside_quotes(formula, |segment| {
        dangling_separator_re().replace_all(segment, ")").to_string()
    })
}

/// Prefix upper-case function names that `is_builtin` does not recognise.
pub fn escape_future_functions(formula: &str, is_builtin: impl Fn(&str) -> bool) -> String {
    map_outside_quotes(formula, |segment| {
        function_name_re()
            .replace_all(segment, |caps: &regex::Captures| {
                let name = &caps[1];
                let is_upper = name.chars().all(|c| !c.is_ascii_lowercase());
                if !is_upper || name.starts_with(FUTURE_PREFIX) || is_builtin(name) {
                    format!("{}(", name)
                } else {
                    format!("{}{}(", FUTURE_PREFIX, name)
                }
            })
            .to_string()
    })
}

/// Apply `f` to the parts of `formula` outside `"..."` literals and `'...'`
/// sheet names.
fn map_outside_quotes(formula: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut seg_start = 0;
    let mut quote: Option<char> = None;

    for (idx, ch) in formula.char_indices() {
        match quote {
            Some(q) if ch == q => {
                out.push_str(&formula[seg_start..=idx]);
                seg_start = idx + 1;
                quote = None;
            }
            Some(_) => {}
            None if ch == '"' || ch == '\'' => {
                out.push_str(&f(&formula[seg_start..idx]));
                seg_start = idx;
                quote = Some(ch);
            }
            None => {}
        }
    }

    if seg_start < formula.len() {
        if quote.is_some() {
            out.push_str(&formula[seg_start..]);
        } else {
            out.push_str(&f(&formula[seg_start..]));
        }
    }
    out
}

fn dangling_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\)").expect("separator regex must compile"))
}

fn function_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_.]*)\(").expect("function name regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(f64::NAN), "#NUM!");
    }

    #[test]
    fn test_quote_text_escapes_quotes() {
        assert_eq!(quote_text("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_strip_outer_parens_once() {
        assert_eq!(strip_outer_parens("(A1 + B1)"), "A1 + B1");
        assert_eq!(strip_outer_parens("((A1 + B1))"), "(A1 + B1)");
        assert_eq!(strip_outer_parens("(A1) + (B1)"), "(A1) + (B1)");
        assert_eq!(strip_outer_parens("SUM(A1:A3)"), "SUM(A1:A3)");
        assert_eq!(strip_outer_parens("(\")\" & A1)"), "\")\" & A1");
    }

    #[test]
    fn test_collapse_separators() {
        assert_eq!(collapse_separators("SUM(A1, )"), "SUM(A1)");
        assert_eq!(collapse_separators("CONCAT(\"a, )\", B1,)"), "CONCAT(\"a, )\", B1)");
    }

    #[test]
    fn test_escape_future_functions() {
        let builtin = |name: &str| matches!(name, "SUM" | "IF");
        assert_eq!(
            escape_future_functions("SUM(XLOOKUP(A1, B1:B3, C1:C3))", builtin),
            "SUM(_xlfn.XLOOKUP(A1, B1:B3, C1:C3))"
        );
        assert_eq!(escape_future_functions("_xlfn.XLOOKUP(A1)", builtin), "_xlfn.XLOOKUP(A1)");
        assert_eq!(escape_future_functions("'My (Data)'!A1 + IF(1, 2)", builtin), "'My (Data)'!A1 + IF(1, 2)");
        assert_eq!(escape_future_functions("\"FOO(\" & A1", builtin), "\"FOO(\" & A1");
    }
}
