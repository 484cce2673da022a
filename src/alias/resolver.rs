//! Context-aware alias resolution over the workspace node graph
//!
//! Aliases have one to three colon-separated components. Multi-component
//! aliases are structural and resolve the same way from anywhere; a bare
//! name is resolved relative to the node containing the caller's context
//! directory.

use super::token::{AliasToken, RulesetImportToken};
use crate::error::RulesError;
use crate::matcher::has_glob_meta;
use crate::paths::to_slash;
use crate::workspace::{NodeKind, WorkspaceNode, WorkspaceProvider};
use std::path::{Path, PathBuf};

/// Resolves aliases to absolute workspace paths
pub struct AliasResolver<'w> {
    workspace: &'w dyn WorkspaceProvider,
    context_dir: PathBuf,
    notebook_root: Option<PathBuf>,
}

impl<'w> AliasResolver<'w> {
    /// Creates a resolver whose bare aliases resolve relative to `context_dir`
    pub fn new(workspace: &'w dyn WorkspaceProvider, context_dir: impl Into<PathBuf>) -> Self {
        AliasResolver {
            workspace,
            context_dir: context_dir.into(),
            notebook_root: None,
        }
    }

    /// Sets the directory `@a:nb:` aliases resolve under
    pub fn with_notebook_root(mut self, root: Option<PathBuf>) -> Self {
        self.notebook_root = root;
        self
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    /// Resolves an alias from the resolver's context directory
    pub fn resolve(&self, alias: &str) -> Result<PathBuf, RulesError> {
        self.resolve_from(alias, &self.context_dir)
    }

    /// Resolves an alias from an explicit context directory
    pub fn resolve_from(&self, alias: &str, context_dir: &Path) -> Result<PathBuf, RulesError> {
        let not_found = || RulesError::AliasNotFound {
            alias: alias.to_string(),
        };

        let components: Vec<&str> = alias.split(':').collect();
        if components.iter().any(|c| c.is_empty()) {
            return Err(not_found());
        }

        let node = match components.as_slice() {
            [namespace, name] if *namespace == super::token::NOTEBOOK_NAMESPACE => {
                return self.notebook_path(alias, name);
            }
            [a, b, c] => self.resolve_three(a, b, c),
            [a, b] => self.resolve_two(a, b),
            [name] => self.resolve_one(name, context_dir),
            _ => None,
        };

        let node = node.ok_or_else(not_found)?;
        tracing::debug!(alias, path = %node.path.display(), "alias resolved");
        Ok(node.path.clone())
    }

    /// Resolves an alias line from the resolver's context directory
    ///
    /// Lines that carry no alias come back unchanged.
    pub fn resolve_line(&self, line: &str) -> Result<String, RulesError> {
        self.resolve_line_from(line, &self.context_dir)
    }

    pub fn resolve_line_from(&self, line: &str, context_dir: &Path) -> Result<String, RulesError> {
        if !AliasToken::is_alias_line(line) {
            return Ok(line.to_string());
        }
        let mut token = AliasToken::parse(line)?;
        self.resolve_token(&mut token, context_dir)
    }

    /// Resolves a parsed token, filling in its `resolved_line`
    pub fn resolve_token(
        &self,
        token: &mut AliasToken,
        context_dir: &Path,
    ) -> Result<String, RulesError> {
        let base = to_slash(&self.resolve_from(&token.alias, context_dir)?);
        let base = base.trim_end_matches('/');

        let mut target = match &token.trailing_pattern {
            Some(pattern) => format!("{base}/{pattern}"),
            None => format!("{base}/**"),
        };

        let mut line = String::new();
        line.push_str(&token.prefix);
        if let Some(search) = &token.search {
            if !has_glob_meta(&target) {
                target.push_str("/**");
            }
            line.push_str(&target);
            line.push(' ');
            line.push_str(search);
        } else {
            line.push_str(&target);
        }

        token.resolved_line = Some(line.clone());
        Ok(line)
    }

    /// Locates the rules file a `project::ruleset` import refers to
    ///
    /// `<project>/.cx/<ruleset>.rules` is preferred over
    /// `<project>/.cx.work/<ruleset>.rules`.
    pub fn resolve_ruleset(
        &self,
        token: &RulesetImportToken,
        context_dir: &Path,
    ) -> Result<PathBuf, RulesError> {
        let project = self.resolve_from(&token.project_alias, context_dir)?;
        let file_name = format!("{}.rules", token.ruleset_name);
        let searched: Vec<PathBuf> = [".cx", ".cx.work"]
            .iter()
            .map(|dir| project.join(dir).join(&file_name))
            .collect();

        searched
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| RulesError::RulesetNotFound {
                reference: token.to_string(),
                searched,
            })
    }

    fn notebook_path(&self, alias: &str, name: &str) -> Result<PathBuf, RulesError> {
        match &self.notebook_root {
            Some(root) => Ok(root.join(name)),
            None => Err(RulesError::NotebookNotConfigured {
                alias: alias.to_string(),
            }),
        }
    }

    fn nodes(&self) -> impl Iterator<Item = &'w WorkspaceNode> {
        self.workspace.all().iter()
    }

    fn node_by_path(&self, path: Option<&PathBuf>) -> Option<&'w WorkspaceNode> {
        let path = path?;
        self.workspace.node_at(path)
    }

    /// `ecosystem:repo:worktree`, then `rootEcosystem:ecosystemWorktree:project`
    fn resolve_three(&self, a: &str, b: &str, c: &str) -> Option<&'w WorkspaceNode> {
        let project_worktree = self.nodes().find(|node| {
            node.name == c
                && node.kind.is_worktree()
                && self
                    .node_by_path(node.parent_project_path.as_ref())
                    .is_some_and(|project| {
                        project.name == b
                            && self
                                .node_by_path(project.parent_ecosystem_path.as_ref())
                                .is_some_and(|eco| eco.name == a && eco.kind.is_ecosystem())
                    })
        });

        project_worktree.or_else(|| {
            self.nodes().find(|node| {
                node.name == c
                    && self
                        .node_by_path(node.parent_ecosystem_path.as_ref())
                        .is_some_and(|eco_worktree| {
                            eco_worktree.name == b
                                && eco_worktree.kind == NodeKind::EcosystemWorktree
                                && self.owner_of(eco_worktree).is_some_and(|root| {
                                    root.name == a && root.kind == NodeKind::EcosystemRoot
                                })
                        })
            })
        })
    }

    /// `ecosystem:repo`, then `repo:worktree`, then `ecosystemWorktree:project`
    fn resolve_two(&self, a: &str, b: &str) -> Option<&'w WorkspaceNode> {
        let in_parent_ecosystem = |kind: NodeKind| {
            self.nodes().find(move |node| {
                node.name == b
                    && self
                        .node_by_path(node.parent_ecosystem_path.as_ref())
                        .is_some_and(|eco| eco.name == a && eco.kind == kind)
            })
        };

        in_parent_ecosystem(NodeKind::EcosystemRoot)
            .or_else(|| {
                self.nodes().find(|node| {
                    node.name == b
                        && node.kind.is_worktree()
                        && self
                            .node_by_path(node.parent_project_path.as_ref())
                            .is_some_and(|project| project.name == a)
                })
            })
            .or_else(|| in_parent_ecosystem(NodeKind::EcosystemWorktree))
    }

    /// Bare name relative to the node containing `context_dir`
    fn resolve_one(&self, name: &str, context_dir: &Path) -> Option<&'w WorkspaceNode> {
        let current = self.workspace.find_by_path(context_dir);

        if let Some(current) = current {
            if current.kind.is_ecosystem()
                && let Some(child) = self.nodes().find(|node| {
                    node.name == name && node.parent_ecosystem_path.as_ref() == Some(&current.path)
                })
            {
                return Some(child);
            }
            if let Some(parent) = &current.parent_ecosystem_path
                && let Some(sibling) = self.nodes().find(|node| {
                    node.name == name && node.parent_ecosystem_path.as_ref() == Some(parent)
                })
            {
                return Some(sibling);
            }
        }

        // Shallowest wins; ties keep discovery order
        self.nodes()
            .filter(|node| node.name == name)
            .min_by_key(|node| node.depth)
    }

    /// The ecosystem root an ecosystem worktree was checked out from
    fn owner_of(&self, eco_worktree: &WorkspaceNode) -> Option<&'w WorkspaceNode> {
        self.node_by_path(eco_worktree.parent_project_path.as_ref())
            .or_else(|| self.node_by_path(eco_worktree.parent_ecosystem_path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::StaticWorkspace;

    fn workspace() -> StaticWorkspace {
        StaticWorkspace::new(vec![
            WorkspaceNode::new("eco1", "/ws/eco1", NodeKind::EcosystemRoot),
            WorkspaceNode::new("repo-a", "/ws/eco1/repo-a", NodeKind::EcosystemSubProject)
                .with_parent_ecosystem("/ws/eco1")
                .with_depth(1),
            WorkspaceNode::new("repo-b", "/ws/eco1/repo-b", NodeKind::EcosystemSubProject)
                .with_parent_ecosystem("/ws/eco1")
                .with_depth(1),
            WorkspaceNode::new("eco2", "/ws/eco2", NodeKind::EcosystemRoot),
            WorkspaceNode::new("repo-b", "/ws/eco2/repo-b", NodeKind::EcosystemSubProject)
                .with_parent_ecosystem("/ws/eco2")
                .with_depth(1),
            WorkspaceNode::new(
                "fix-1",
                "/ws/eco1/repo-b/.grove-worktrees/fix-1",
                NodeKind::EcosystemSubProjectWorktree,
            )
            .with_parent_ecosystem("/ws/eco1")
            .with_parent_project("/ws/eco1/repo-b")
            .with_depth(2),
            WorkspaceNode::new(
                "feat",
                "/ws/eco1/.grove-worktrees/feat",
                NodeKind::EcosystemWorktree,
            )
            .with_parent_project("/ws/eco1")
            .with_depth(1),
            WorkspaceNode::new(
                "repo-a",
                "/ws/eco1/.grove-worktrees/feat/repo-a",
                NodeKind::EcosystemSubProject,
            )
            .with_parent_ecosystem("/ws/eco1/.grove-worktrees/feat")
            .with_depth(2),
            WorkspaceNode::new("solo", "/ws/solo", NodeKind::StandaloneProject),
        ])
    }

    #[test]
    fn test_bare_alias_prefers_sibling() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws/eco1/repo-a");
        assert_eq!(resolver.resolve("repo-b").unwrap(), PathBuf::from("/ws/eco1/repo-b"));

        let resolver = AliasResolver::new(&ws, "/ws/eco2");
        assert_eq!(resolver.resolve("repo-b").unwrap(), PathBuf::from("/ws/eco2/repo-b"));
    }

    #[test]
    fn test_bare_alias_falls_back_to_top_level() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws/eco1/repo-a");
        assert_eq!(resolver.resolve("solo").unwrap(), PathBuf::from("/ws/solo"));

        let resolver = AliasResolver::new(&ws, "/tmp/outside");
        assert_eq!(resolver.resolve("repo-b").unwrap(), PathBuf::from("/ws/eco1/repo-b"));
    }

    #[test]
    fn test_two_component_forms() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws/eco1/repo-a");
        assert_eq!(
            resolver.resolve("eco2:repo-b").unwrap(),
            PathBuf::from("/ws/eco2/repo-b")
        );
        assert_eq!(
            resolver.resolve("repo-b:fix-1").unwrap(),
            PathBuf::from("/ws/eco1/repo-b/.grove-worktrees/fix-1")
        );
        assert_eq!(
            resolver.resolve("feat:repo-a").unwrap(),
            PathBuf::from("/ws/eco1/.grove-worktrees/feat/repo-a")
        );
    }

    #[test]
    fn test_three_component_forms() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/");
        assert_eq!(
            resolver.resolve("eco1:repo-b:fix-1").unwrap(),
            PathBuf::from("/ws/eco1/repo-b/.grove-worktrees/fix-1")
        );
        assert_eq!(
            resolver.resolve("eco1:feat:repo-a").unwrap(),
            PathBuf::from("/ws/eco1/.grove-worktrees/feat/repo-a")
        );
    }

    #[test]
    fn test_unknown_alias_names_the_alias() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws");
        let err = resolver.resolve("eco3:nope").unwrap_err();
        assert!(matches!(err, RulesError::AliasNotFound { ref alias } if alias == "eco3:nope"));
    }

    #[test]
    fn test_resolve_line_rendering() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws/eco1/repo-a");

        assert_eq!(
            resolver.resolve_line("@a:repo-b/src/**/*.go").unwrap(),
            "/ws/eco1/repo-b/src/**/*.go"
        );
        assert_eq!(resolver.resolve_line("@alias:solo").unwrap(), "/ws/solo/**");
        assert_eq!(
            resolver.resolve_line("!@a:repo-b/tests").unwrap(),
            "!/ws/eco1/repo-b/tests"
        );
        assert_eq!(
            resolver.resolve_line("@view: @a:solo").unwrap(),
            "@view: /ws/solo/**"
        );
        assert_eq!(
            resolver.resolve_line("@a:solo/docs @grep: \"TODO\"").unwrap(),
            "/ws/solo/docs/** @grep: \"TODO\""
        );
        assert_eq!(
            resolver.resolve_line("@a:solo/*.md @find: \"guide\"").unwrap(),
            "/ws/solo/*.md @find: \"guide\""
        );
        assert_eq!(resolver.resolve_line("src/**").unwrap(), "src/**");
    }

    #[test]
    fn test_notebook_alias() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws")
            .with_notebook_root(Some(PathBuf::from("/home/u/notebooks")));
        assert_eq!(
            resolver.resolve_line("@a:nb:research:plans/*.md").unwrap(),
            "/home/u/notebooks/research/plans/*.md"
        );

        let resolver = AliasResolver::new(&ws, "/ws");
        let err = resolver.resolve_line("@a:nb:research").unwrap_err();
        assert!(matches!(err, RulesError::NotebookNotConfigured { .. }));
    }

    #[test]
    fn test_resolve_token_records_resolved_line() {
        let ws = workspace();
        let resolver = AliasResolver::new(&ws, "/ws");
        let mut token = AliasToken::parse("@a:eco1:repo-a/lib").unwrap();
        resolver.resolve_token(&mut token, Path::new("/ws")).unwrap();
        assert_eq!(token.resolved_line.as_deref(), Some("/ws/eco1/repo-a/lib"));
    }

    #[test]
    fn test_resolve_ruleset_prefers_cx_over_cx_work() {
        let temp = tempfile::TempDir::new().unwrap();
        let project = temp.path().join("proj");
        std::fs::create_dir_all(project.join(".cx")).unwrap();
        std::fs::create_dir_all(project.join(".cx.work")).unwrap();
        std::fs::write(project.join(".cx.work/docs.rules"), "*.md\n").unwrap();
        std::fs::write(project.join(".cx.work/scratch.rules"), "*.txt\n").unwrap();
        std::fs::write(project.join(".cx/docs.rules"), "docs/**\n").unwrap();

        let ws = StaticWorkspace::new(vec![WorkspaceNode::new(
            "proj",
            &project,
            NodeKind::StandaloneProject,
        )]);
        let resolver = AliasResolver::new(&ws, temp.path());
        let context = temp.path().to_path_buf();

        let docs = RulesetImportToken::parse("@a:proj::docs").unwrap();
        assert_eq!(
            resolver.resolve_ruleset(&docs, &context).unwrap(),
            project.join(".cx/docs.rules")
        );

        let scratch = RulesetImportToken::parse("@a:proj::scratch").unwrap();
        assert_eq!(
            resolver.resolve_ruleset(&scratch, &context).unwrap(),
            project.join(".cx.work/scratch.rules")
        );

        let missing = RulesetImportToken::parse("@a:proj::nope").unwrap();
        let err = resolver.resolve_ruleset(&missing, &context).unwrap_err();
        match err {
            RulesError::RulesetNotFound { searched, .. } => assert_eq!(searched.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
