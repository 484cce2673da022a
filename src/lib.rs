#![forbid(unsafe_code)]

//! cx-rules: rules resolution for LLM context documents
//!
//! A small line-oriented rules language selects, from a multi-repository
//! workspace, the files that go into a context document. This crate parses
//! that language, expands aliases and ruleset imports, matches the result
//! against the filesystem with gitignore-compatible semantics, and
//! attributes every selected file to the rule line that won it.

pub mod alias;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod output;
pub mod paths;
pub mod rules;
pub mod types;
pub mod workspace;

// Re-export error types for convenient access
pub use error::{ConfigError, ParseError, RulesError};

// Re-export core domain types for convenient access
pub use engine::{AttributionReport, ContextEngine, ContextFiles, Expansion};
pub use types::{FileStatus, Rule, SearchDirective, SearchKind, Section};
pub use workspace::{LazyWorkspace, NodeKind, StaticWorkspace, WorkspaceNode, WorkspaceProvider};
