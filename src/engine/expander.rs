//! Ruleset import expansion
//!
//! Turns a rules document into a flat, ordered list of concrete rules:
//! aliases are resolved, braces expanded, and `@default:` and
//! `project::ruleset` imports inlined in place. Imported hot rules join the
//! importer's hot list and imported cold rules its cold list, unless the
//! import line itself sits in the cold section, in which case everything it
//! pulls in is cold.

use crate::alias::AliasResolver;
use crate::error::RulesError;
use crate::paths::{expand_tilde, normalize_lexically, project_root_of, to_slash};
use crate::rules::{PatternLine, RuleLine, RulesDocument, expand_braces, parse_line};
use crate::types::{Rule, Section, SearchDirective};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Flat result of expanding a rules document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub hot: Vec<Rule>,
    pub cold: Vec<Rule>,
    /// Resolved `@view:` patterns, for visualization only
    pub views: Vec<String>,
}

impl Expansion {
    /// Hot then cold rules, stably ordered by effective line
    pub fn combined(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self.hot.iter().chain(self.cold.iter()).cloned().collect();
        rules.sort_by_key(|rule| rule.effective_line);
        rules
    }

    pub fn is_empty(&self) -> bool {
        self.hot.is_empty() && self.cold.is_empty()
    }

    fn push(&mut self, rule: Rule) {
        match rule.section {
            Section::Hot => self.hot.push(rule),
            Section::Cold => self.cold.push(rule),
        }
    }
}

/// Rules files already expanded during one expansion call
#[derive(Debug, Default)]
pub struct ExpansionContext {
    visited: HashSet<PathBuf>,
}

impl ExpansionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a canonical path visited; false if it already was
    pub fn enter(&mut self, path: PathBuf) -> bool {
        self.visited.insert(path)
    }

    pub fn visited(&self) -> &HashSet<PathBuf> {
        &self.visited
    }
}

/// Where the lines being expanded came from
struct Frame<'a> {
    source_file: Option<&'a Path>,
    /// Directory relative patterns and bare aliases refer to
    project_root: PathBuf,
    /// Whether relative patterns must be rewritten onto `project_root`
    rebase: bool,
    /// Root-level line and section of the import that pulled this file in
    import: Option<(usize, Section)>,
}

/// Expands rules documents against one project root
pub struct RulesetExpander<'a, 'w> {
    resolver: &'a AliasResolver<'w>,
    root: PathBuf,
}

impl<'a, 'w> RulesetExpander<'a, 'w> {
    pub fn new(resolver: &'a AliasResolver<'w>, root: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            root: root.into(),
        }
    }

    /// Expands the rules file at `path`
    pub fn expand(&self, path: &Path) -> Result<Expansion, RulesError> {
        let canonical = canonical(path)?;
        let document = RulesDocument::load(path).map_err(|e| RulesError::io(path, e))?;

        let mut context = ExpansionContext::new();
        context.enter(canonical.clone());
        self.expand_root(&document, Some(&canonical), &mut context)
    }

    /// Expands in-memory rules text
    ///
    /// `origin`, when given, is the file the text stands for; importing it
    /// again is treated as a cycle.
    pub fn expand_text(&self, text: &str, origin: Option<&Path>) -> Result<Expansion, RulesError> {
        let mut context = ExpansionContext::new();
        let origin = match origin {
            Some(path) => {
                let canonical = canonical(path).unwrap_or_else(|_| path.to_path_buf());
                context.enter(canonical.clone());
                Some(canonical)
            }
            None => None,
        };
        self.expand_root(&RulesDocument::parse(text), origin.as_deref(), &mut context)
    }

    fn expand_root(
        &self,
        document: &RulesDocument,
        source_file: Option<&Path>,
        context: &mut ExpansionContext,
    ) -> Result<Expansion, RulesError> {
        let frame = Frame {
            source_file,
            project_root: self.root.clone(),
            rebase: false,
            import: None,
        };
        let mut out = Expansion::default();
        self.expand_document(document, &frame, context, &mut out)?;
        tracing::debug!(
            hot = out.hot.len(),
            cold = out.cold.len(),
            files = context.visited().len(),
            "rules expanded"
        );
        Ok(out)
    }

    fn expand_document(
        &self,
        document: &RulesDocument,
        frame: &Frame<'_>,
        context: &mut ExpansionContext,
        out: &mut Expansion,
    ) -> Result<(), RulesError> {
        for line in document.lines() {
            let (effective_line, section) = match frame.import {
                Some((import_line, Section::Cold)) => (import_line, Section::Cold),
                Some((import_line, Section::Hot)) => (import_line, line.section),
                None => (line.number, line.section),
            };
            let site = Site {
                source_line: line.number,
                effective_line,
                section,
            };

            let parsed = match &line.parsed {
                Ok(parsed) => parsed.clone(),
                Err(e) if e.is_fatal() => return Err(e.clone().into()),
                Err(e) => {
                    tracing::warn!(line = line.number, error = %e, "skipping rules line");
                    continue;
                }
            };

            self.expand_line(parsed, &site, frame, context, out)?;
        }
        Ok(())
    }

    fn expand_line(
        &self,
        parsed: RuleLine,
        site: &Site,
        frame: &Frame<'_>,
        context: &mut ExpansionContext,
        out: &mut Expansion,
    ) -> Result<(), RulesError> {
        match parsed {
            RuleLine::Blank | RuleLine::Comment(_) | RuleLine::Separator | RuleLine::Directive(_) => {}
            RuleLine::Pattern(pattern) => self.push_rules(pattern, false, site, frame, out),
            RuleLine::Exclude(pattern) => self.push_rules(pattern, true, site, frame, out),
            RuleLine::View(pattern) => {
                for glob in expand_braces(&pattern.glob) {
                    out.views.push(self.rebase(&glob, frame));
                }
            }
            RuleLine::AliasPattern(mut token) => {
                let resolved = self.resolver.resolve_token(&mut token, &frame.project_root)?;
                let reparsed = parse_line(&resolved)?;
                self.expand_line(reparsed, site, frame, context, out)?;
            }
            RuleLine::RulesetImport(token) => {
                let path = self.resolver.resolve_ruleset(&token, &frame.project_root)?;
                self.import(&path, site, context, out)?;
            }
            RuleLine::DefaultImport(target) => {
                let path = self.default_target(&target, frame)?;
                self.import(&path, site, context, out)?;
            }
        }
        Ok(())
    }

    fn push_rules(
        &self,
        pattern: PatternLine,
        is_exclude: bool,
        site: &Site,
        frame: &Frame<'_>,
        out: &mut Expansion,
    ) {
        let PatternLine { glob, search } = pattern;
        for expanded in expand_braces(&glob) {
            out.push(self.rule(self.rebase(&expanded, frame), is_exclude, search.clone(), site, frame));
        }
    }

    fn rule(
        &self,
        pattern: String,
        is_exclude: bool,
        directive: Option<SearchDirective>,
        site: &Site,
        frame: &Frame<'_>,
    ) -> Rule {
        Rule {
            pattern,
            is_exclude,
            source_line: site.source_line,
            effective_line: site.effective_line,
            directive,
            section: site.section,
            source_file: frame.source_file.map(Path::to_path_buf),
        }
    }

    /// Resolves a `@default:` target relative to the current project root
    fn default_target(&self, target: &str, frame: &Frame<'_>) -> Result<PathBuf, RulesError> {
        let expanded = expand_tilde(target);
        let mut path = if expanded.is_absolute() {
            expanded
        } else {
            normalize_lexically(&frame.project_root.join(expanded))
        };
        if path.is_dir() {
            path = path.join(".grove").join("rules");
        }
        if !path.is_file() {
            return Err(RulesError::RulesetNotFound {
                reference: target.to_string(),
                searched: vec![path],
            });
        }
        Ok(path)
    }

    fn import(
        &self,
        path: &Path,
        site: &Site,
        context: &mut ExpansionContext,
        out: &mut Expansion,
    ) -> Result<(), RulesError> {
        let canonical = canonical(path)?;
        if !context.enter(canonical.clone()) {
            tracing::debug!(file = %canonical.display(), "skipping already expanded rules file");
            return Ok(());
        }

        let document = RulesDocument::load(&canonical).map_err(|e| RulesError::io(&canonical, e))?;
        let project_root = project_root_of(&canonical);
        tracing::debug!(
            file = %canonical.display(),
            line = site.effective_line,
            "expanding import"
        );

        let child = Frame {
            source_file: Some(&canonical),
            rebase: project_root != self.root,
            project_root,
            import: Some((site.effective_line, site.section)),
        };
        self.expand_document(&document, &child, context, out)
    }

    /// Rewrites a relative pattern of an imported project onto its root
    fn rebase(&self, pattern: &str, frame: &Frame<'_>) -> String {
        if !frame.rebase || pattern.starts_with('/') || pattern.starts_with('~') {
            return pattern.to_string();
        }

        let mut relative = pattern;
        while let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        }
        let root = to_slash(&frame.project_root);
        let root = root.trim_end_matches('/');

        if relative.starts_with("../") {
            let joined = normalize_lexically(&frame.project_root.join(relative));
            let mut rebased = to_slash(&joined);
            if relative.ends_with('/') {
                rebased.push('/');
            }
            return rebased;
        }
        if relative.trim_end_matches('/').contains('/') || relative == "**" {
            format!("{root}/{relative}")
        } else {
            // A floating pattern matches any segment, so keep everything below it too
            let name = relative.trim_end_matches('/');
            format!("{root}/**/{name}/**")
        }
    }
}

/// Position of a rules line within the expansion
struct Site {
    source_line: usize,
    effective_line: usize,
    section: Section,
}

fn canonical(path: &Path) -> Result<PathBuf, RulesError> {
    std::fs::canonicalize(path).map_err(|e| RulesError::io(path, e))
}
