//! Workspace aliases: `@alias:`/`@a:` tokens and their resolution

pub mod resolver;
pub mod token;

pub use resolver::AliasResolver;
pub use token::{AliasToken, RulesetImportToken};
