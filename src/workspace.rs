#![forbid(unsafe_code)]

//! Read-only workspace node graph
//!
//! Discovery of repositories, ecosystems and worktrees happens outside this
//! crate; the engine only consumes the resulting nodes through a
//! [`WorkspaceProvider`] handle passed in by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Structural role of a workspace node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    StandaloneProject,
    StandaloneProjectWorktree,
    EcosystemRoot,
    EcosystemWorktree,
    EcosystemSubProject,
    EcosystemSubProjectWorktree,
}

impl NodeKind {
    /// Ecosystem roots and ecosystem worktrees
    pub fn is_ecosystem(&self) -> bool {
        matches!(self, NodeKind::EcosystemRoot | NodeKind::EcosystemWorktree)
    }

    /// Any kind of worktree checkout
    pub fn is_worktree(&self) -> bool {
        matches!(
            self,
            NodeKind::StandaloneProjectWorktree
                | NodeKind::EcosystemWorktree
                | NodeKind::EcosystemSubProjectWorktree
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::StandaloneProject => "standalone-project",
            NodeKind::StandaloneProjectWorktree => "standalone-project-worktree",
            NodeKind::EcosystemRoot => "ecosystem-root",
            NodeKind::EcosystemWorktree => "ecosystem-worktree",
            NodeKind::EcosystemSubProject => "ecosystem-sub-project",
            NodeKind::EcosystemSubProjectWorktree => "ecosystem-sub-project-worktree",
        };
        write!(f, "{}", name)
    }
}

/// A discovered project, ecosystem or worktree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNode {
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    pub kind: NodeKind,
    /// Ecosystem (root or worktree) this node belongs to
    pub parent_ecosystem_path: Option<PathBuf>,
    /// Project this node is a worktree of
    pub parent_project_path: Option<PathBuf>,
    /// 0 for top-level nodes
    pub depth: usize,
}

impl WorkspaceNode {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: NodeKind) -> Self {
        WorkspaceNode {
            name: name.into(),
            path: path.into(),
            kind,
            parent_ecosystem_path: None,
            parent_project_path: None,
            depth: 0,
        }
    }

    pub fn with_parent_ecosystem(mut self, path: impl Into<PathBuf>) -> Self {
        self.parent_ecosystem_path = Some(path.into());
        self
    }

    pub fn with_parent_project(mut self, path: impl Into<PathBuf>) -> Self {
        self.parent_project_path = Some(path.into());
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

/// Read access to the workspace node graph
pub trait WorkspaceProvider: Send + Sync {
    /// Every known node
    fn all(&self) -> &[WorkspaceNode];

    /// The node containing `path` (longest path prefix)
    fn find_by_path(&self, path: &Path) -> Option<&WorkspaceNode> {
        self.all()
            .iter()
            .filter(|node| path.starts_with(&node.path))
            .max_by_key(|node| node.path.components().count())
    }

    /// The node located exactly at `path`
    fn node_at(&self, path: &Path) -> Option<&WorkspaceNode> {
        self.all().iter().find(|node| node.path == path)
    }
}

/// A provider over a fixed list of nodes
#[derive(Debug, Clone, Default)]
pub struct StaticWorkspace {
    nodes: Vec<WorkspaceNode>,
}

impl StaticWorkspace {
    pub fn new(nodes: Vec<WorkspaceNode>) -> Self {
        StaticWorkspace { nodes }
    }
}

impl WorkspaceProvider for StaticWorkspace {
    fn all(&self) -> &[WorkspaceNode] {
        &self.nodes
    }
}

type Loader = Box<dyn Fn() -> Vec<WorkspaceNode> + Send + Sync>;

/// A provider that builds its graph on first use, exactly once
///
/// Concurrent first callers block until the single loader run completes.
pub struct LazyWorkspace {
    loader: Loader,
    nodes: OnceLock<StaticWorkspace>,
}

impl LazyWorkspace {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Vec<WorkspaceNode> + Send + Sync + 'static,
    {
        LazyWorkspace {
            loader: Box::new(loader),
            nodes: OnceLock::new(),
        }
    }

    /// Whether the loader has already run
    pub fn is_initialized(&self) -> bool {
        self.nodes.get().is_some()
    }

    fn workspace(&self) -> &StaticWorkspace {
        self.nodes.get_or_init(|| {
            let nodes = (self.loader)();
            tracing::debug!(count = nodes.len(), "workspace graph loaded");
            StaticWorkspace::new(nodes)
        })
    }
}

impl WorkspaceProvider for LazyWorkspace {
    fn all(&self) -> &[WorkspaceNode] {
        self.workspace().all()
    }
}

impl fmt::Debug for LazyWorkspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyWorkspace")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
