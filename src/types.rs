#![forbid(unsafe_code)]

//! Core domain types for cx-rules
//!
//! This module defines the fundamental types shared by the parser, the
//! import expander and the resolution engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Section of a rules document a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Before the `---` separator
    Hot,
    /// After the `---` separator
    Cold,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Hot => write!(f, "hot"),
            Section::Cold => write!(f, "cold"),
        }
    }
}

/// Kind of content-search filter attached to a pattern line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// `@find:` - case-insensitive substring of the file path
    Find,
    /// `@grep:` - regular expression over the file contents
    Grep,
}

impl SearchKind {
    /// The directive keyword as written in rules files
    pub fn keyword(&self) -> &'static str {
        match self {
            SearchKind::Find => "@find:",
            SearchKind::Grep => "@grep:",
        }
    }
}

/// A trailing `@find:`/`@grep:` filter on a pattern line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchDirective {
    pub kind: SearchKind,
    pub query: String,
}

impl fmt::Display for SearchDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.kind.keyword(), self.query)
    }
}

/// A fully concrete rule, ready for matching
///
/// Rules preserve document order; the last matching rule decides whether a
/// file is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Glob pattern, relative to the project root or absolute
    pub pattern: String,

    /// `true` for `!` exclusions
    pub is_exclude: bool,

    /// 1-based line in the file that literally contains the rule
    pub source_line: usize,

    /// 1-based line in the root document that pulled the rule in
    pub effective_line: usize,

    /// Optional content-search filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<SearchDirective>,

    /// Section the rule was merged into
    pub section: Section,

    /// File the rule was read from, `None` for in-memory root text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
}

impl Rule {
    /// Creates an inclusion rule declared directly in the root document
    pub fn include(pattern: impl Into<String>, line: usize) -> Self {
        Rule {
            pattern: pattern.into(),
            is_exclude: false,
            source_line: line,
            effective_line: line,
            directive: None,
            section: Section::Hot,
            source_file: None,
        }
    }

    /// Creates an exclusion rule declared directly in the root document
    pub fn exclude(pattern: impl Into<String>, line: usize) -> Self {
        Rule {
            is_exclude: true,
            ..Rule::include(pattern, line)
        }
    }

    /// Returns the rule with a search directive attached
    pub fn with_directive(mut self, directive: SearchDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    /// Returns the rule moved into the given section
    pub fn in_section(mut self, section: Section) -> Self {
        self.section = section;
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exclude {
            write!(f, "!")?;
        }
        write!(f, "{}", self.pattern)?;
        if let Some(directive) = &self.directive {
            write!(f, " {}", directive)?;
        }
        Ok(())
    }
}

/// Visualization status of a file or directory
///
/// Variants are ordered by precedence: a directory takes the highest status
/// found among its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Not matched by any rule
    Omitted,
    /// Matched by an inclusion but removed by an exclusion
    Excluded,
    /// Part of the cold context
    Cold,
    /// Part of the hot context
    Hot,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileStatus::Omitted => "omitted",
            FileStatus::Excluded => "excluded",
            FileStatus::Cold => "cold",
            FileStatus::Hot => "hot",
        };
        write!(f, "{}", label)
    }
}
