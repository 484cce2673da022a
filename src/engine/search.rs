//! `@find:` and `@grep:` filters

use crate::error::ParseError;
use crate::types::{SearchDirective, SearchKind};
use regex::Regex;
use std::path::Path;

/// A compiled search directive
///
/// `@find:` never reads the file: it keeps files whose displayed path
/// contains the query, ignoring case. `@grep:` is the content search and
/// keeps files whose contents match the query as a regex.
#[derive(Debug, Clone)]
pub enum SearchFilter {
    /// Lowercased path substring
    Find(String),
    /// Regex over file contents
    Grep(Regex),
}

impl SearchFilter {
    pub fn compile(directive: &SearchDirective) -> Result<Self, ParseError> {
        match directive.kind {
            SearchKind::Find => Ok(SearchFilter::Find(directive.query.to_lowercase())),
            SearchKind::Grep => Regex::new(&directive.query)
                .map(SearchFilter::Grep)
                .map_err(|e| ParseError::InvalidSearch {
                    line: directive.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Tests a file. `display_path` is the path the rule is written against:
    /// project-relative for internal files, absolute otherwise.
    ///
    /// Unreadable or non-UTF-8 files never match a `@grep:`.
    pub fn accepts(&self, display_path: &str, file: &Path) -> bool {
        match self {
            SearchFilter::Find(needle) => display_path.to_lowercase().contains(needle),
            SearchFilter::Grep(regex) => match std::fs::read_to_string(file) {
                Ok(content) => regex.is_match(&content),
                Err(e) => {
                    tracing::debug!(file = %file.display(), error = %e, "skipping unreadable file for @grep");
                    false
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_is_case_insensitive_path_substring() {
        let filter = SearchFilter::compile(&SearchDirective {
            kind: SearchKind::Find,
            query: "Handler".to_string(),
        })
        .unwrap();
        assert!(filter.accepts("src/http/handler.go", Path::new("/nonexistent")));
        assert!(!filter.accepts("src/http/server.go", Path::new("/nonexistent")));
    }

    #[test]
    fn test_find_ignores_file_contents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("server.go");
        std::fs::write(&file, "func Handler() {}\n").unwrap();

        let filter = SearchFilter::compile(&SearchDirective {
            kind: SearchKind::Find,
            query: "handler".to_string(),
        })
        .unwrap();
        assert!(!filter.accepts("server.go", &file));
    }

    #[test]
    fn test_grep_matches_contents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.go");
        std::fs::write(&file, "package main\n// TODO: fix\n").unwrap();

        let filter = SearchFilter::compile(&SearchDirective {
            kind: SearchKind::Grep,
            query: "TODO:\\s+fix".to_string(),
        })
        .unwrap();
        assert!(filter.accepts("a.go", &file));
        assert!(!filter.accepts("b.go", &temp.path().join("b.go")));
    }
}
