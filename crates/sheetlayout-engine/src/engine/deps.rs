//! Placeholder extraction from reference templates.
//!
//! A template is formula-like text with bracketed placeholders naming other
//! layout elements, e.g. `[price] * [qty]` or `[0] + [1]`. This module finds
//! the placeholders and the keys they name.
//!
//! Handles:
//! - Positional keys: `[3]`
//! - Named keys, trimmed and stripped of quotes: `[ 'total' ]` -> `total`
//! - Ignores brackets inside string literals
//! - Ignores brackets directly after `]`, `)` or `[`, which is indexing
//!   syntax rather than a placeholder. `([a] * 2)` still names `a`.

use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use crate::error::TemplateError;

/// Key named by a placeholder.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum RefKey {
    /// Position within the lexical container.
    Index(usize),
    /// Symbol-table key (id or header).
    Name(String),
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKey::Index(i) => write!(f, "{}", i),
            RefKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A placeholder occurrence and the byte span it covers in the template.
#[derive(Clone, Debug, PartialEq)]
pub struct Placeholder {
    pub key: RefKey,
    pub span: Range<usize>,
}

/// Extract every placeholder from a template, in order of appearance.
///
/// Fails on unbalanced brackets/parentheses, unterminated strings, empty
/// placeholders anywhere in the template, and a literal `refs[`.
pub fn extract_placeholders(template: &str) -> Result<Vec<Placeholder>, TemplateError> {
    let stripped = strip_string_literals(template)?;
    check_balanced(template, &stripped)?;
    check_reserved(template, &stripped)?;

    let bytes = stripped.as_bytes();
    let mut found = Vec::new();
    for caps in placeholder_re().captures_iter(&stripped) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > 0 && matches!(bytes[whole.start() - 1], b']' | b')' | b'[') {
            continue;
        }
        let inner = &template[inner.range()];
        found.push(Placeholder {
            key: parse_key(template, inner)?,
            span: whole.range(),
        });
    }

    // `[]` never matches the regex; report it instead of silently leaving it.
    let empty = stripped
        .match_indices("[]")
        .any(|(pos, _)| pos == 0 || !matches!(bytes[pos - 1], b']' | b')' | b'['));
    if empty {
        return Err(TemplateError::EmptyPlaceholder {
            template: template.to_string(),
        });
    }

    Ok(found)
}

/// Distinct keys in order of first appearance.
pub fn distinct_keys(placeholders: &[Placeholder]) -> Vec<RefKey> {
    let mut keys: Vec<RefKey> = Vec::new();
    for p in placeholders {
        if !keys.contains(&p.key) {
            keys.push(p.key.clone());
        }
    }
    keys
}

fn parse_key(template: &str, inner: &str) -> Result<RefKey, TemplateError> {
    let trimmed = inner.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        return Ok(RefKey::Index(index));
    }
    let name = trimmed.trim_matches(|c| c == '\'' || c == '"').trim();
    if name.is_empty() {
        return Err(TemplateError::EmptyPlaceholder {
            template: template.to_string(),
        });
    }
    Ok(RefKey::Name(name.to_string()))
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[([^\[\]()]+)\]").expect("placeholder regex must compile")
    })
}

/// `refs` is reserved; a template may not index it.
fn check_reserved(template: &str, stripped: &str) -> Result<(), TemplateError> {
    let bytes = stripped.as_bytes();
    let reserved = stripped.match_indices("refs[").any(|(pos, _)| {
        pos == 0 || !(bytes[pos - 1].is_ascii_alphanumeric() || bytes[pos - 1] == b'_')
    });
    if reserved {
        return Err(TemplateError::ReservedName {
            template: template.to_string(),
            name: "refs",
        });
    }
    Ok(())
}

fn check_balanced(template: &str, stripped: &str) -> Result<(), TemplateError> {
    let mut stack: Vec<char> = Vec::new();
    let unbalanced = |open, close| TemplateError::Unbalanced {
        template: template.to_string(),
        open,
        close,
    };
    for ch in stripped.chars() {
        match ch {
            '[' | '(' => stack.push(ch),
            ']' => {
                if stack.pop() != Some('[') {
                    return Err(unbalanced('[', ']'));
                }
            }
            ')' => {
                if stack.pop() != Some('(') {
                    return Err(unbalanced('(', ')'));
                }
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some('[') => Err(unbalanced('[', ']')),
        Some(_) => Err(unbalanced('(', ')')),
        None => Ok(()),
    }
}

/// Blank out the contents of `"..."` literals byte-for-byte so offsets in the
/// result line up with the original text. `""` inside a literal is an escaped quote.
pub(crate) fn strip_string_literals(script: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(script.len());
    let mut in_string = false;
    let mut chars = script.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_string {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    out.push_str("  ");
                    continue;
                }
                in_string = false;
                out.push('"');
            } else {
                for _ in 0..ch.len_utf8() {
                    out.push(' ');
                }
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    if in_string {
        return Err(TemplateError::UnterminatedString {
            template: script.to_string(),
        });
    }
    Ok(out)
}
