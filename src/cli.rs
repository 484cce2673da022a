//! CLI argument parsing and command dispatch

pub mod args;
pub mod common;
pub mod directives;
pub mod explain;
pub mod list;
pub mod resolve;

// Re-export types for convenient access
pub use args::{Cli, Command, OutputFormat};
pub use common::GlobalOptions;
