//! File resolution
//!
//! [`ContextEngine`] is the entry point for callers: it expands a rules
//! document, walks the directories its inclusion patterns can reach,
//! matches every file against every rule in parallel, drops gitignored
//! candidates, and attributes the survivors to the rule lines that won them.

use super::attribution::{AttributionReport, FileMatches, attribute};
use super::expander::{Expansion, RulesetExpander};
use super::file_walker::{FileEntry, FileWalker};
use super::gitignore::{GitignoreOracle, IgnoreFileOracle};
use super::search::SearchFilter;
use super::status::infer_directory_statuses;
use crate::alias::AliasResolver;
use crate::error::RulesError;
use crate::matcher::{Pattern, has_glob_meta};
use crate::paths::{expand_tilde, normalize_lexically, to_slash};
use crate::rules::CacheDirectives;
use crate::types::{FileStatus, Rule};
use crate::workspace::WorkspaceProvider;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Hot and cold file sets of a rules document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextFiles {
    pub hot: Vec<PathBuf>,
    /// Files selected by the cold section; never also listed in `hot`
    pub cold: Vec<PathBuf>,
}

/// Per-file and per-directory statuses for tree views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub files: BTreeMap<PathBuf, FileStatus>,
    pub directories: BTreeMap<PathBuf, FileStatus>,
}

/// A rule compiled for matching
struct CompiledRule {
    pattern: Pattern,
    filter: Option<SearchFilter>,
    is_exclude: bool,
}

/// Resolves rules documents to files under one project root
pub struct ContextEngine<'w> {
    root: PathBuf,
    rules_path: PathBuf,
    resolver: AliasResolver<'w>,
    oracle: Box<dyn GitignoreOracle>,
}

impl<'w> ContextEngine<'w> {
    /// Creates an engine for the project at `root`, reading
    /// `<root>/.grove/rules` by default
    pub fn new(root: impl Into<PathBuf>, workspace: &'w dyn WorkspaceProvider) -> Self {
        let root = root.into();
        let root = root
            .canonicalize()
            .or_else(|_| std::path::absolute(&root))
            .unwrap_or(root);

        Self {
            rules_path: root.join(".grove").join("rules"),
            resolver: AliasResolver::new(workspace, root.clone()),
            oracle: Box::new(IgnoreFileOracle),
            root,
        }
    }

    /// Uses a different root rules file; relative paths are taken from the
    /// project root
    pub fn with_rules_path(mut self, path: impl AsRef<Path>) -> Self {
        self.rules_path = self.root.join(path.as_ref());
        self
    }

    pub fn with_oracle(mut self, oracle: Box<dyn GitignoreOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_notebook_root(mut self, root: Option<PathBuf>) -> Self {
        self.resolver = self.resolver.with_notebook_root(root);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rules_path(&self) -> &Path {
        &self.rules_path
    }

    fn expander(&self) -> RulesetExpander<'_, 'w> {
        RulesetExpander::new(&self.resolver, self.root.clone())
    }

    /// Expands the root rules file
    pub fn expand(&self) -> Result<Expansion, RulesError> {
        self.expand_file(&self.rules_path)
    }

    pub fn expand_file(&self, path: &Path) -> Result<Expansion, RulesError> {
        self.expander().expand(path)
    }

    /// Expands rules text standing in for the root rules file
    pub fn expand_text(&self, text: &str) -> Result<Expansion, RulesError> {
        self.expander().expand_text(text, Some(&self.rules_path))
    }

    /// Resolves an alias relative to the project root
    pub fn resolve(&self, alias: &str) -> Result<PathBuf, RulesError> {
        self.resolver.resolve(alias)
    }

    /// Resolves the alias embedded in a rules line
    pub fn resolve_line(&self, line: &str) -> Result<String, RulesError> {
        self.resolver.resolve_line(line)
    }

    /// Cache directives of the root rules file
    pub fn cache_directives(&self) -> Result<CacheDirectives, RulesError> {
        let text = std::fs::read_to_string(&self.rules_path)
            .map_err(|e| RulesError::io(&self.rules_path, e))?;
        Ok(CacheDirectives::from_text(&text)?)
    }

    /// Files selected by an ad-hoc pattern list, treated as one section
    pub fn resolve_files_from_patterns<S: AsRef<str>>(
        &self,
        patterns: &[S],
    ) -> Result<Vec<PathBuf>, RulesError> {
        let text = patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        let expansion = self.expander().expand_text(&text, None)?;
        Ok(self.attribute_rules(expansion.combined())?.included_files())
    }

    /// Resolves rules text and attributes every selected file
    pub fn resolve_files_with_attribution(
        &self,
        rules_text: &str,
    ) -> Result<AttributionReport, RulesError> {
        let expansion = self.expand_text(rules_text)?;
        self.attribute_rules(expansion.combined())
    }

    /// Hot and cold file sets of the root rules file
    pub fn resolve_context(&self) -> Result<ContextFiles, RulesError> {
        let expansion = self.expand()?;
        self.context_files(&expansion)
    }

    /// Hot and cold file sets of rules text
    pub fn resolve_context_text(&self, rules_text: &str) -> Result<ContextFiles, RulesError> {
        let expansion = self.expand_text(rules_text)?;
        self.context_files(&expansion)
    }

    fn context_files(&self, expansion: &Expansion) -> Result<ContextFiles, RulesError> {
        let cold = self.attribute_rules(expansion.cold.clone())?.included_files();
        let cold_set: HashSet<&PathBuf> = cold.iter().collect();
        let hot = self
            .attribute_rules(expansion.hot.clone())?
            .included_files()
            .into_iter()
            .filter(|file| !cold_set.contains(file))
            .collect();
        Ok(ContextFiles { hot, cold })
    }

    /// Status of every file under the project root, plus inferred
    /// directory statuses
    pub fn classify(&self) -> Result<Classification, RulesError> {
        let expansion = self.expand()?;
        let hot = self.attribute_rules(expansion.hot)?;
        let cold = self.attribute_rules(expansion.cold)?;

        let hot_files: HashSet<PathBuf> = hot.included_files().into_iter().collect();
        let cold_files: HashSet<PathBuf> = cold.included_files().into_iter().collect();
        let excluded: HashSet<&PathBuf> = hot
            .exclusions
            .values()
            .chain(cold.exclusions.values())
            .flatten()
            .collect();

        let mut files = BTreeMap::new();
        for entry in FileWalker::new(&self.root).collect_files()? {
            let status = if cold_files.contains(&entry.path) {
                FileStatus::Cold
            } else if hot_files.contains(&entry.path) {
                FileStatus::Hot
            } else if excluded.contains(&entry.path) {
                FileStatus::Excluded
            } else {
                FileStatus::Omitted
            };
            files.insert(entry.path, status);
        }

        let directories = infer_directory_statuses(&self.root, &files);
        Ok(Classification { files, directories })
    }

    /// Matches rules against the filesystem and attributes the result
    fn attribute_rules(&self, rules: Vec<Rule>) -> Result<AttributionReport, RulesError> {
        let compiled = rules
            .iter()
            .map(|rule| self.compile(rule))
            .collect::<Result<Vec<_>, _>>()?;

        let walker = FileWalker::with_bases(&self.root, self.walk_bases(&compiled));
        let files = walker.collect_files()?;

        let matched: Vec<(FileEntry, Vec<usize>)> = files
            .into_par_iter()
            .filter_map(|file| {
                let hits: Vec<usize> = compiled
                    .iter()
                    .enumerate()
                    .filter(|(_, rule)| self.rule_matches(rule, &file))
                    .map(|(index, _)| index)
                    .collect();
                let included_by_any = hits.iter().any(|&i| !compiled[i].is_exclude);
                included_by_any.then_some((file, hits))
            })
            .collect();

        let ignored = self.ignored_candidates(walker.bases(), &matched, &compiled)?;
        let candidates: Vec<FileMatches> = matched
            .into_iter()
            .filter(|(file, _)| !ignored.contains(&file.path))
            .map(|(file, matched)| FileMatches {
                path: file.path,
                matched,
            })
            .collect();

        if candidates.is_empty() {
            tracing::debug!(rules = rules.len(), "no files matched");
        }
        Ok(attribute(rules, &candidates))
    }

    /// Compiles a rule, making `~/` and `../` patterns absolute and
    /// turning bare directories into `dir/**`
    fn compile(&self, rule: &Rule) -> Result<CompiledRule, RulesError> {
        let mut text = rule.pattern.trim().to_string();
        while let Some(rest) = text.strip_prefix("./") {
            text = rest.to_string();
        }
        if text.starts_with('~') {
            text = to_slash(&expand_tilde(&text));
        } else if text.starts_with("../") || text == ".." {
            let trailing = text.ends_with('/');
            text = to_slash(&normalize_lexically(&self.root.join(&text)));
            if trailing {
                text.push('/');
            }
        }

        if !has_glob_meta(&text) && !text.ends_with('/') && text.contains('/') {
            let path = if text.starts_with('/') {
                PathBuf::from(&text)
            } else {
                self.root.join(&text)
            };
            if path.is_dir() {
                text.push_str("/**");
            }
        }

        let pattern = Pattern::new(&text)?;
        let filter = rule
            .directive
            .as_ref()
            .map(SearchFilter::compile)
            .transpose()?;

        Ok(CompiledRule {
            pattern,
            filter,
            is_exclude: rule.is_exclude,
        })
    }

    /// The project root for relative inclusions, the static prefix of
    /// each absolute one
    fn walk_bases(&self, compiled: &[CompiledRule]) -> Vec<PathBuf> {
        let mut bases = Vec::new();
        for rule in compiled.iter().filter(|rule| !rule.is_exclude) {
            if rule.pattern.is_absolute() {
                bases.push(rule.pattern.static_prefix().unwrap_or_else(|| PathBuf::from("/")));
            } else {
                bases.push(self.root.clone());
            }
        }
        tracing::debug!(bases = ?bases, "walk bases");
        bases
    }

    fn rule_matches(&self, rule: &CompiledRule, file: &FileEntry) -> bool {
        let display_path = if rule.pattern.is_absolute() || file.is_external() {
            to_slash(&file.path)
        } else {
            file.relative.clone()
        };

        let hit = if rule.pattern.is_absolute() {
            rule.pattern.is_match(&display_path)
        } else if file.is_external() {
            // Relative inclusions stay inside the project root
            rule.is_exclude && rule.pattern.is_match(&file.relative)
        } else {
            rule.pattern.is_match(&file.relative)
        };

        hit && rule
            .filter
            .as_ref()
            .is_none_or(|filter| filter.accepts(&display_path, &file.path))
    }

    /// Gitignored candidates, except those named literally by an inclusion
    fn ignored_candidates(
        &self,
        bases: &[PathBuf],
        matched: &[(FileEntry, Vec<usize>)],
        compiled: &[CompiledRule],
    ) -> Result<HashSet<PathBuf>, RulesError> {
        let mut ignored = HashSet::new();
        for base in bases {
            let files: Vec<PathBuf> = matched
                .iter()
                .filter(|(file, _)| file.path.starts_with(base))
                .filter(|(_, hits)| {
                    !hits.iter().any(|&i| {
                        let rule = &compiled[i];
                        !rule.is_exclude && rule.pattern.is_literal()
                    })
                })
                .map(|(file, _)| file.path.clone())
                .collect();
            ignored.extend(self.oracle.ignored(base, &files)?);
        }
        if !ignored.is_empty() {
            tracing::debug!(count = ignored.len(), "dropped gitignored candidates");
        }
        Ok(ignored)
    }
}
