//! Human-readable output formatter

use super::jsonl::rule_text;
use crate::engine::{AttributionReport, ContextFiles};
use crate::paths::relative_to;
use crate::rules::CacheDirectives;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Plain-text formatter with paths relative to the project root
pub struct HumanFormatter {
    root: PathBuf,
}

impl HumanFormatter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        HumanFormatter { root: root.into() }
    }

    pub fn format_context(&self, files: &ContextFiles) -> String {
        let mut output = String::new();
        self.section(&mut output, "Hot context", &files.hot);
        if !files.cold.is_empty() {
            output.push('\n');
            self.section(&mut output, "Cold context", &files.cold);
        }
        output
    }

    pub fn format_attribution(&self, report: &AttributionReport) -> String {
        let mut output = String::new();

        let mut lines: Vec<usize> = report
            .attribution
            .keys()
            .chain(report.exclusions.keys())
            .chain(report.filtered.keys())
            .copied()
            .collect();
        lines.sort_unstable();
        lines.dedup();

        if lines.is_empty() {
            output.push_str("No files matched.\n");
            return output;
        }

        for line in lines {
            let _ = writeln!(output, "line {}: {}", line, rule_text(report, line));
            let groups = [
                ("+", report.attribution.get(&line)),
                ("-", report.exclusions.get(&line)),
                ("~", report.filtered.get(&line)),
            ];
            for (marker, paths) in groups {
                for path in paths.into_iter().flatten() {
                    let _ = writeln!(output, "  {} {}", marker, self.display(path));
                }
            }
        }

        let _ = writeln!(
            output,
            "\n{} included, {} excluded, {} shadowed lines",
            report.included_files().len(),
            report.exclusions.values().map(Vec::len).sum::<usize>(),
            report.shadowed_lines().len()
        );
        output
    }

    pub fn format_directives(&self, directives: &CacheDirectives) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "freeze-cache:  {}", directives.freeze_cache);
        let _ = writeln!(output, "no-expire:     {}", directives.no_expire);
        let _ = writeln!(output, "disable-cache: {}", directives.disable_cache);
        match directives.expire_time {
            Some(duration) => {
                let _ = writeln!(output, "expire-time:   {}s", duration.as_secs());
            }
            None => output.push_str("expire-time:   none\n"),
        }
        output
    }

    fn section(&self, output: &mut String, title: &str, files: &[PathBuf]) {
        let _ = writeln!(output, "{} ({} files):", title, files.len());
        for path in files {
            let _ = writeln!(output, "  {}", self.display(path));
        }
    }

    fn display(&self, path: &Path) -> String {
        relative_to(path, &self.root)
    }
}
