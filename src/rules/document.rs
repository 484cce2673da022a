//! Whole-document view of a rules file
//!
//! A [`RulesDocument`] never fails to parse as a whole: each line keeps its
//! own `Result`, and consumers decide which failures are fatal.

use super::line::{Directive, RuleLine, parse_line};
use crate::error::ParseError;
use crate::types::Section;
use std::path::Path;

/// One line of a rules document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLine {
    /// 1-based line number
    pub number: usize,
    /// Line text exactly as written
    pub raw: String,
    /// Section the line falls in
    pub section: Section,
    pub parsed: Result<RuleLine, ParseError>,
}

/// Ordered lines of a rules file, split into hot and cold sections
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RulesDocument {
    lines: Vec<DocumentLine>,
    trailing_newline: bool,
}

impl RulesDocument {
    /// Parses rules text. Never fails; see [`DocumentLine::parsed`].
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);

        let mut section = Section::Hot;
        let mut lines = Vec::new();

        if !text.is_empty() {
            for (index, raw) in body.split('\n').enumerate() {
                let number = index + 1;
                let parsed = parse_line(raw.trim_end_matches('\r'));

                let line_section = section;
                if let Ok(RuleLine::Separator) = parsed {
                    if section == Section::Hot {
                        section = Section::Cold;
                    } else {
                        tracing::warn!(line = number, "ignoring extra '---' separator");
                    }
                }

                lines.push(DocumentLine {
                    number,
                    raw: raw.to_string(),
                    section: line_section,
                    parsed,
                });
            }
        }

        RulesDocument {
            lines,
            trailing_newline,
        }
    }

    /// Reads and parses a rules file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        std::fs::read_to_string(path).map(|text| Self::parse(&text))
    }

    /// All lines in document order
    pub fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    /// Lines of one section, separators excluded
    pub fn section(&self, section: Section) -> impl Iterator<Item = &DocumentLine> {
        self.lines.iter().filter(move |line| {
            line.section == section && !matches!(line.parsed, Ok(RuleLine::Separator))
        })
    }

    /// Whether the document has a `---` separator
    pub fn has_cold_section(&self) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line.parsed, Ok(RuleLine::Separator)))
    }

    /// Document-level directives in order of appearance
    pub fn directives(&self) -> impl Iterator<Item = (usize, &Directive)> {
        self.lines.iter().filter_map(|line| match &line.parsed {
            Ok(RuleLine::Directive(directive)) => Some((line.number, directive)),
            _ => None,
        })
    }

    /// Reproduces the original text
    pub fn to_text(&self) -> String {
        let mut text = self
            .lines
            .iter()
            .map(|line| line.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline {
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_split_on_first_separator() {
        let doc = RulesDocument::parse("*.go\n!*_test.go\n---\ndocs/**\n");
        let hot: Vec<_> = doc.section(Section::Hot).map(|l| l.number).collect();
        let cold: Vec<_> = doc.section(Section::Cold).map(|l| l.number).collect();
        assert_eq!(hot, vec![1, 2]);
        assert_eq!(cold, vec![4]);
        assert!(doc.has_cold_section());
    }

    #[test]
    fn test_no_separator_means_all_hot() {
        let doc = RulesDocument::parse("a\nb");
        assert!(doc.lines().iter().all(|l| l.section == Section::Hot));
        assert!(!doc.has_cold_section());
    }

    #[test]
    fn test_extra_separator_does_not_open_third_section() {
        let doc = RulesDocument::parse("a\n---\nb\n---\nc\n");
        let cold: Vec<_> = doc.section(Section::Cold).map(|l| l.raw.as_str()).collect();
        assert_eq!(cold, vec!["b", "c"]);
    }

    #[test]
    fn test_round_trip_preserves_text() {
        for text in [
            "",
            "\n",
            "# header\n\n*.go\n  !*_test.go  \n---\n@freeze-cache\n",
            "no trailing newline",
            "crlf\r\nlines\r\n",
        ] {
            assert_eq!(RulesDocument::parse(text).to_text(), text);
        }
    }

    #[test]
    fn test_bad_lines_do_not_fail_document() {
        let doc = RulesDocument::parse("@a:a:b:c:d\n*.go\n");
        assert!(doc.lines()[0].parsed.is_err());
        assert!(doc.lines()[1].parsed.is_ok());
    }

    #[test]
    fn test_directives_listed_with_line_numbers() {
        let doc = RulesDocument::parse("@no-expire\n*.go\n@expire-time 1h\n");
        let directives: Vec<_> = doc.directives().collect();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0], (1, &Directive::NoExpire));
        assert_eq!(directives[1], (3, &Directive::ExpireTime("1h".to_string())));
    }
}
