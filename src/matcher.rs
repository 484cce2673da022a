#![forbid(unsafe_code)]

//! Gitignore-compatible pattern matching
//!
//! Patterns are compiled once into a list of path segments. Each segment is
//! either a literal, a single-segment glob (compiled with `globset`), or
//! `**`, which spans zero or more whole segments. All comparisons are
//! case-insensitive.
//!
//! Pattern shapes:
//! - no `/` ("floating"): matched against every segment of the path, so
//!   `tests` selects a `tests` directory at any depth but not `testdata`;
//! - containing `/`: anchored at the root of the path, `*` never crosses
//!   `/`, and `**` spans whole segments only;
//! - leading `/`: absolute, matched against absolute paths.

use crate::error::ParseError;
use globset::{GlobBuilder, GlobMatcher};
use std::path::PathBuf;

#[derive(Debug, Clone)]
enum Segment {
    /// `**`
    AnyDepth,
    /// Lowercased literal segment
    Literal(String),
    Glob(GlobMatcher),
}

impl Segment {
    fn compile(text: &str, pattern: &str) -> Result<Self, ParseError> {
        if text == "**" {
            return Ok(Segment::AnyDepth);
        }
        // `**` inside a segment cannot cross `/`
        let text = text.replace("**", "*");
        if !has_glob_meta(&text) {
            return Ok(Segment::Literal(text.to_lowercase()));
        }

        // Braces are expanded before compilation; any left over are literal
        let escaped = text.replace('{', "[{]").replace('}', "[}]");
        let glob = GlobBuilder::new(&escaped)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| ParseError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.kind().to_string(),
            })?;
        Ok(Segment::Glob(glob.compile_matcher()))
    }

    /// Matches one lowercased path segment
    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::AnyDepth => true,
            Segment::Literal(literal) => literal == segment,
            Segment::Glob(glob) => glob.is_match(segment),
        }
    }
}

/// A compiled rules pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    absolute: bool,
    floating: bool,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles a pattern
    ///
    /// A leading `./` is dropped and a trailing `/` means everything under
    /// the directory.
    pub fn new(raw: &str) -> Result<Self, ParseError> {
        let mut text = raw.trim();
        while let Some(rest) = text.strip_prefix("./") {
            text = rest;
        }
        let absolute = text.starts_with('/');

        let mut normalized = text.to_string();
        if normalized.ends_with('/') {
            normalized.push_str("**");
        }

        let parts: Vec<&str> = normalized
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect();
        if parts.is_empty() {
            return Err(ParseError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "empty pattern".to_string(),
            });
        }

        let floating = !absolute && parts.len() == 1 && parts[0] != "**";

        let mut segments: Vec<Segment> = Vec::with_capacity(parts.len());
        for part in parts {
            let segment = Segment::compile(part, raw)?;
            let repeated = matches!(segment, Segment::AnyDepth)
                && matches!(segments.last(), Some(Segment::AnyDepth));
            if !repeated {
                segments.push(segment);
            }
        }

        Ok(Pattern {
            raw: raw.to_string(),
            absolute,
            floating,
            segments,
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern starts with `/`
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Whether the pattern has no `/` and matches any single path segment
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    /// Whether the pattern names exactly one path (no wildcards)
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Whether the pattern contains any wildcard
    pub fn has_wildcard(&self) -> bool {
        !self.is_literal()
    }

    /// Leading wildcard-free directory of the pattern
    ///
    /// `/ws/repo/src/**/*.go` yields `/ws/repo/src`. Floating patterns have
    /// no static prefix.
    pub fn static_prefix(&self) -> Option<PathBuf> {
        if self.floating {
            return None;
        }
        let literal_count = self
            .segments
            .iter()
            .take_while(|segment| matches!(segment, Segment::Literal(_)))
            .count();
        // A fully literal pattern names a file; walk its parent
        let dir_count = if literal_count == self.segments.len() {
            literal_count.saturating_sub(1)
        } else {
            literal_count
        };

        // Literals are lowercased; take the original spelling from the raw text
        let original: Vec<&str> = self
            .raw
            .trim()
            .trim_start_matches("./")
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .take(dir_count)
            .collect();

        let mut prefix = if self.absolute {
            PathBuf::from("/")
        } else {
            PathBuf::new()
        };
        prefix.extend(original);
        Some(prefix)
    }

    /// Matches a forward-slash path (relative, or absolute for absolute
    /// patterns)
    pub fn is_match(&self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        let segments: Vec<&str> = lowered
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .collect();

        if self.floating {
            let segment = &self.segments[0];
            return segments.iter().any(|s| segment.matches(s));
        }
        match_segments(&self.segments, &segments)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            if rest.is_empty() {
                return true;
            }
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => path
            .split_first()
            .is_some_and(|(first, tail)| segment.matches(first) && match_segments(rest, tail)),
    }
}

/// One-shot match of `pattern` against `path`
///
/// Patterns that fail to compile match nothing.
pub fn matches(pattern: &str, path: &str) -> bool {
    Pattern::new(pattern).is_ok_and(|p| p.is_match(path))
}

/// Whether text contains glob metacharacters
pub fn has_glob_meta(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_literal_matches_any_segment() {
        assert!(matches("tests", "tests"));
        assert!(matches("tests", "tests/unit.go"));
        assert!(matches("tests", "pkg/tests/unit.go"));
        assert!(!matches("tests", "testdata/x.go"));
        assert!(!matches("tests", "contest/x.go"));
    }

    #[test]
    fn test_floating_glob_matches_basename() {
        assert!(matches("*.go", "a.go"));
        assert!(matches("*.go", "deep/dir/a.go"));
        assert!(!matches("*.go", "a.rs"));
        assert!(matches("*_test.go", "pkg/a_test.go"));
    }

    #[test]
    fn test_double_star_spans_segments() {
        assert!(matches("**", "anything/at/all.txt"));
        assert!(matches("**/*.go", "main.go"));
        assert!(matches("**/*.go", "a/b/c.go"));
        assert!(matches("src/**/*.go", "src/main.go"));
        assert!(matches("src/**/*.go", "src/a/b/main.go"));
        assert!(!matches("src/**/*.go", "lib/main.go"));
    }

    #[test]
    fn test_double_star_dir_is_whole_segment() {
        assert!(matches("**/vendor/**", "a/vendor/x.go"));
        assert!(matches("**/vendor/**", "vendor/x.go"));
        assert!(!matches("**/vendor/**", "a/myvendor/x.go"));
        assert!(!matches("**/vendor/**", "a/vendors/x.go"));
    }

    #[test]
    fn test_embedded_double_star_stays_in_segment() {
        assert!(matches("src/**.go", "src/main.go"));
        assert!(!matches("src/**.go", "src/a/main.go"));
    }

    #[test]
    fn test_slash_pattern_is_anchored_and_star_does_not_cross() {
        assert!(matches("src/*.go", "src/main.go"));
        assert!(!matches("src/*.go", "src/a/main.go"));
        assert!(!matches("src/*.go", "lib/src/main.go"));
        assert!(matches("docs/README.md", "docs/README.md"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches("README.md", "readme.md"));
        assert!(matches("*.MD", "docs/guide.md"));
        assert!(matches("Docs/**", "docs/a.md"));
    }

    #[test]
    fn test_absolute_pattern() {
        let pattern = Pattern::new("/ws/repo/src/**/*.go").unwrap();
        assert!(pattern.is_absolute());
        assert!(pattern.is_match("/ws/repo/src/a/b.go"));
        assert!(!pattern.is_match("/ws/other/src/b.go"));
        assert_eq!(pattern.static_prefix(), Some(PathBuf::from("/ws/repo/src")));
    }

    #[test]
    fn test_trailing_slash_and_dot_prefix() {
        assert!(matches("docs/", "docs/a/b.md"));
        assert!(matches("./src/*.rs", "src/lib.rs"));
    }

    #[test]
    fn test_literal_detection() {
        assert!(Pattern::new("docs/README.md").unwrap().is_literal());
        assert!(!Pattern::new("docs/*.md").unwrap().is_literal());
        assert!(!Pattern::new("docs/**").unwrap().is_literal());
        assert_eq!(
            Pattern::new("docs/Guide/README.md").unwrap().static_prefix(),
            Some(PathBuf::from("docs/Guide"))
        );
        assert_eq!(Pattern::new("*.md").unwrap().static_prefix(), None);
    }

    #[test]
    fn test_leftover_braces_are_literal() {
        assert!(matches("docs/{draft}/*.md", "docs/{draft}/a.md"));
        assert!(!matches("docs/{draft}/*.md", "docs/draft/a.md"));
    }

    #[test]
    fn test_invalid_glob_is_error() {
        assert!(Pattern::new("src/[a-").is_err());
        assert!(Pattern::new("").is_err());
        assert!(!matches("src/[a-", "src/a"));
    }

    #[test]
    fn test_parent_segments_are_ignored_for_floating_match() {
        assert!(matches("tests", "../repo-b/tests/x.go"));
    }
}
