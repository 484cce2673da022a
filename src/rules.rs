#![forbid(unsafe_code)]

//! Rules language: line tokenizer, document model, brace expansion and
//! cache directives

pub mod brace;
pub mod directives;
pub mod document;
pub mod line;

// Re-export core types
pub use brace::expand_braces;
pub use directives::{CacheDirectives, parse_duration};
pub use document::{DocumentLine, RulesDocument};
pub use line::{Directive, PatternLine, RuleLine, parse_line};
