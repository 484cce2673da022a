//! Error types for cx-rules
//!
//! Errors follow a hierarchical structure: per-concern enums for parsing and
//! configuration, rolled up into [`RulesError`] which every engine operation
//! returns. Any error aborts the current resolution call; there are no
//! partial rule lists.

use crate::engine::file_walker::FileWalkerError;
use crate::engine::gitignore::OracleError;
use std::path::PathBuf;

/// Errors produced while parsing a single rules line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Malformed `@alias:`/`@a:` line
    #[error("Invalid alias in line '{line}': {reason}")]
    InvalidAlias { line: String, reason: String },

    /// Malformed `project::ruleset` or `@default:` import
    #[error("Invalid ruleset import in line '{line}': {reason}")]
    InvalidImport { line: String, reason: String },

    /// Malformed trailing `@find:`/`@grep:` directive
    #[error("Invalid search directive in line '{line}': {reason}")]
    InvalidSearch { line: String, reason: String },

    /// Unknown or malformed whole-line directive
    #[error("Invalid directive in line '{line}': {reason}")]
    InvalidDirective { line: String, reason: String },

    /// Glob that cannot be compiled
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ParseError {
    /// Whether this error must abort the whole resolution call.
    ///
    /// Only unrecognized directives are skipped; anything that could change
    /// which files are selected is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::InvalidDirective { .. })
    }

    /// The offending line (or pattern) text
    pub fn line(&self) -> &str {
        match self {
            ParseError::InvalidAlias { line, .. }
            | ParseError::InvalidImport { line, .. }
            | ParseError::InvalidSearch { line, .. }
            | ParseError::InvalidDirective { line, .. } => line,
            ParseError::InvalidPattern { pattern, .. } => pattern,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `@expire-time` literal that cannot be parsed
    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Invalid configuration value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// TOML syntax or schema error
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// I/O error reading the configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type for cx-rules
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// A rules line could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No workspace node matches the alias
    #[error("Alias not found: '{alias}'")]
    AliasNotFound { alias: String },

    /// `@a:nb:` alias used without a notebook root
    #[error("Notebook alias '{alias}' used but no notebook root is configured")]
    NotebookNotConfigured { alias: String },

    /// Imported rules file does not exist
    #[error("Rules file for '{reference}' not found (searched: {})", display_paths(.searched))]
    RulesetNotFound {
        reference: String,
        searched: Vec<PathBuf>,
    },

    /// Error walking the filesystem
    #[error("File walker error: {0}")]
    Walk(#[from] FileWalkerError),

    /// Gitignore lookup failed
    #[error("Gitignore lookup failed: {0}")]
    Gitignore(#[from] OracleError),

    /// I/O error on a specific path
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RulesError {
    /// Wraps an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RulesError::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
