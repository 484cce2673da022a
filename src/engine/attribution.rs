//! Rule attribution
//!
//! Given the ordered rule list and, for every candidate file, the indices of
//! the rules that match it, a single file-major pass decides the final set
//! and records, per effective line, which files it won, excluded, or
//! matched but lost to a later rule.

use crate::types::Rule;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Rules matching one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatches {
    pub path: PathBuf,
    /// Ascending indices into the rule list
    pub matched: Vec<usize>,
}

/// Outcome of a resolution with attribution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributionReport {
    /// Effective line -> files it won
    pub attribution: BTreeMap<usize, Vec<PathBuf>>,
    /// The expanded rule list the report refers to
    pub rules: Vec<Rule>,
    /// Effective line -> files it excluded
    pub exclusions: BTreeMap<usize, Vec<PathBuf>>,
    /// Effective line -> files it matched but a later line won
    pub filtered: BTreeMap<usize, Vec<PathBuf>>,
}

impl AttributionReport {
    /// Every included file, sorted
    pub fn included_files(&self) -> Vec<PathBuf> {
        let files: BTreeSet<&PathBuf> = self.attribution.values().flatten().collect();
        files.into_iter().cloned().collect()
    }

    /// The line that won `path`, if it is included
    pub fn winner_of(&self, path: &Path) -> Option<usize> {
        self.attribution
            .iter()
            .find(|(_, files)| files.iter().any(|f| f == path))
            .map(|(line, _)| *line)
    }

    /// Lines that matched some included file without winning it
    pub fn shadowed_lines(&self) -> Vec<usize> {
        self.filtered.keys().copied().collect()
    }

    /// Rules declared on an effective line
    pub fn rules_on_line(&self, line: usize) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.effective_line == line)
    }
}

type LineFiles = BTreeMap<usize, BTreeSet<PathBuf>>;

/// Attributes candidate files to rule lines; last match wins
pub fn attribute(rules: Vec<Rule>, candidates: &[FileMatches]) -> AttributionReport {
    let mut attribution = LineFiles::new();
    let mut exclusions = LineFiles::new();
    let mut filtered = LineFiles::new();

    for candidate in candidates {
        let Some(&last) = candidate.matched.last() else {
            continue;
        };
        let last_rule = &rules[last];

        if last_rule.is_exclude {
            exclusions
                .entry(last_rule.effective_line)
                .or_default()
                .insert(candidate.path.clone());
            continue;
        }

        let winner_line = last_rule.effective_line;
        attribution
            .entry(winner_line)
            .or_default()
            .insert(candidate.path.clone());

        for &index in &candidate.matched {
            let rule = &rules[index];
            if !rule.is_exclude && rule.effective_line != winner_line {
                filtered
                    .entry(rule.effective_line)
                    .or_default()
                    .insert(candidate.path.clone());
            }
        }
    }

    tracing::debug!(
        rules = rules.len(),
        candidates = candidates.len(),
        winning_lines = attribution.len(),
        "attribution complete"
    );

    AttributionReport {
        attribution: flatten(attribution),
        rules,
        exclusions: flatten(exclusions),
        filtered: flatten(filtered),
    }
}

fn flatten(map: LineFiles) -> BTreeMap<usize, Vec<PathBuf>> {
    map.into_iter()
        .map(|(line, files)| (line, files.into_iter().collect()))
        .collect()
}
