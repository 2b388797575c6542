//! Template preprocessing.
//!
//! Before a template can be interpreted, each placeholder is rewritten into an
//! indexed lookup into the reference map, and the result is parsed into an
//! expression tree:
//!
//! - `[price] * [qty]` -> `refs["price"] * refs["qty"]`
//! - `[0] + [1]` -> `refs[0] + refs[1]`
//!
//! Brackets that are not placeholders (indexing such as `[col][0]`) are left
//! untouched and parsed as postfix indexing.

use super::ast::Expr;
use super::deps::{Placeholder, RefKey, distinct_keys, extract_placeholders};
use super::parser::parse_expression;
use crate::error::TemplateError;

/// A template after placeholder extraction, rewriting and parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedTemplate {
    /// The text as written by the user.
    pub source: String,
    /// The text with placeholders rewritten into `refs[...]` lookups.
    pub rewritten: String,
    /// Distinct keys, in order of first appearance.
    pub keys: Vec<RefKey>,
    /// True when the template is a single placeholder and nothing else.
    pub is_ref: bool,
    pub ast: Expr,
}

/// Extract, rewrite and parse a template in one step.
pub fn prepare_template(template: &str) -> Result<PreparedTemplate, TemplateError> {
    let placeholders = extract_placeholders(template)?;
    let rewritten = rewrite_template(template, &placeholders);
    let ast = parse_expression(&rewritten).map_err(|err| match err {
        // Name the user's template, not the rewritten text. The offset stays rewritten.
        TemplateError::Syntax {
            position, message, ..
        } => TemplateError::Syntax {
            template: template.to_string(),
            position,
            message,
        },
        other => other,
    })?;

    let trimmed = template.trim();
    let is_ref = placeholders.len() == 1 && {
        let span = &placeholders[0].span;
        let leading = template.len() - template.trim_start().len();
        span.start == leading && span.end - span.start == trimmed.len()
    };

    Ok(PreparedTemplate {
        source: template.to_string(),
        rewritten,
        keys: distinct_keys(&placeholders),
        is_ref,
        ast,
    })
}

/// Substitute every placeholder span with a `refs[...]` lookup.
pub fn rewrite_template(template: &str, placeholders: &[Placeholder]) -> String {
    let mut out = String::with_capacity(template.len() + placeholders.len() * 8);
    let mut cursor = 0;
    for placeholder in placeholders {
        out.push_str(&template[cursor..placeholder.span.start]);
        out.push_str(&ref_lookup(&placeholder.key));
        cursor = placeholder.span.end;
    }
    out.push_str(&template[cursor..]);
    out
}

fn ref_lookup(key: &RefKey) -> String {
    match key {
        RefKey::Index(i) => format!("refs[{}]", i),
        RefKey::Name(name) => format!("refs[\"{}\"]", name.replace('"', "\"\"")),
    }
}
