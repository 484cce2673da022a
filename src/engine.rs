//! Rules expansion, file resolution and attribution

pub mod attribution;
pub mod expander;
pub mod file_walker;
pub mod gitignore;
pub mod resolver;
pub mod search;
pub mod status;

pub use attribution::{AttributionReport, FileMatches, attribute};
pub use expander::{Expansion, ExpansionContext, RulesetExpander};
pub use gitignore::{GitCheckIgnore, GitignoreOracle, IgnoreFileOracle, NoGitignore};
pub use resolver::{Classification, ContextEngine, ContextFiles};
