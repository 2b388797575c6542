//! Error types for template parsing.

use thiserror::Error;

/// Errors raised while turning a reference template into an expression tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Unbalanced '{open}{close}' in template {template:?}")]
    Unbalanced {
        template: String,
        open: char,
        close: char,
    },

    #[error("Empty placeholder '[]' in template {template:?}")]
    EmptyPlaceholder { template: String },

    #[error("Template {template:?} uses the reserved name '{name}['")]
    ReservedName {
        template: String,
        name: &'static str,
    },

    #[error("Unterminated string literal in template {template:?}")]
    UnterminatedString { template: String },

    #[error("Syntax error in template {template:?} at offset {position}: {message}")]
    Syntax {
        template: String,
        position: usize,
        message: String,
    },
}
