#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order: file records
//! sorted by line then path, followed by one summary record.

use crate::engine::{AttributionReport, ContextFiles};
use crate::paths::relative_to;
use crate::types::Section;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// JSONL output formatter
pub struct JsonlFormatter {
    root: PathBuf,
}

impl JsonlFormatter {
    /// Creates a formatter printing paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonlFormatter { root: root.into() }
    }

    /// One `file` record per hot then cold file, then a summary
    pub fn format_context(&self, files: &ContextFiles) -> String {
        let mut output = String::new();

        for (section, paths) in [(Section::Hot, &files.hot), (Section::Cold, &files.cold)] {
            for path in paths {
                push_record(
                    &mut output,
                    &FileRecord {
                        record_type: "file",
                        section,
                        path: self.display(path),
                    },
                );
            }
        }

        push_record(
            &mut output,
            &ContextSummary {
                record_type: "summary",
                hot: files.hot.len(),
                cold: files.cold.len(),
            },
        );
        output
    }

    /// Attribution, exclusion and filtered records, then a summary
    pub fn format_attribution(&self, report: &AttributionReport) -> String {
        let mut output = String::new();

        let groups: [(&str, &BTreeMap<usize, Vec<PathBuf>>); 3] = [
            ("attribution", &report.attribution),
            ("exclusion", &report.exclusions),
            ("filtered", &report.filtered),
        ];
        for (record_type, lines) in groups {
            for (line, paths) in lines {
                let rule = rule_text(report, *line);
                for path in paths {
                    push_record(
                        &mut output,
                        &LineRecord {
                            record_type,
                            line: *line,
                            rule: rule.clone(),
                            path: self.display(path),
                        },
                    );
                }
            }
        }

        push_record(
            &mut output,
            &AttributionSummary {
                record_type: "summary",
                rules: report.rules.len(),
                included: report.included_files().len(),
                excluded: report.exclusions.values().map(Vec::len).sum(),
            },
        );
        output
    }

    fn display(&self, path: &Path) -> String {
        relative_to(path, &self.root)
    }
}

/// Rules on an effective line, as written after expansion
pub(crate) fn rule_text(report: &AttributionReport, line: usize) -> String {
    report
        .rules_on_line(line)
        .map(|rule| rule.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_record<T: Serialize>(output: &mut String, record: &T) {
    if let Ok(json) = serde_json::to_string(record) {
        output.push_str(&json);
        output.push('\n');
    }
}

#[derive(Debug, Serialize)]
struct FileRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    section: Section,
    path: String,
}

#[derive(Debug, Serialize)]
struct ContextSummary {
    #[serde(rename = "type")]
    record_type: &'static str,
    hot: usize,
    cold: usize,
}

#[derive(Debug, Serialize)]
struct LineRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    line: usize,
    rule: String,
    path: String,
}

#[derive(Debug, Serialize)]
struct AttributionSummary {
    #[serde(rename = "type")]
    record_type: &'static str,
    rules: usize,
    included: usize,
    excluded: usize,
}
