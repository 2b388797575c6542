//! sheetlayout_engine - Reference templates, expression trees and formula text.

pub mod builtins;
pub mod engine;
pub mod error;

pub use error::TemplateError;
