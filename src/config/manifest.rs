//! Declarative workspace node list (`[[workspace.nodes]]`)
//!
//! Parents are referenced by path. Depth and parent links are derived here
//! so the resulting [`WorkspaceNode`]s are consistent.

use crate::error::ConfigError;
use crate::paths::{expand_tilde, normalize_lexically};
use crate::workspace::{NodeKind, WorkspaceNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Workspace configuration section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// One `[[workspace.nodes]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Node directory; `~` is expanded and relative paths are taken from
    /// the settings file's directory
    pub path: String,
    pub kind: NodeKind,
    /// Path of the ecosystem (root or worktree) containing this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ecosystem: Option<String>,
    /// Path of the project this node is a worktree of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_project: Option<String>,
}

impl WorkspaceManifest {
    /// Checks names, kinds and parent references
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_nodes(Path::new("")).map(|_| ())
    }

    /// Builds workspace nodes, resolving relative paths against `base_dir`
    pub fn to_nodes(&self, base_dir: &Path) -> Result<Vec<WorkspaceNode>, ConfigError> {
        let resolve = |raw: &str| -> PathBuf {
            let expanded = expand_tilde(raw);
            if expanded.is_absolute() {
                normalize_lexically(&expanded)
            } else {
                normalize_lexically(&base_dir.join(expanded))
            }
        };

        let mut nodes: Vec<WorkspaceNode> = Vec::with_capacity(self.nodes.len());
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for spec in &self.nodes {
            validate_name(&spec.name)?;
            let node = WorkspaceNode::new(spec.name.clone(), resolve(&spec.path), spec.kind);
            if index.insert(node.path.clone(), nodes.len()).is_some() {
                return Err(invalid(
                    &spec.name,
                    format!("duplicate node path '{}'", node.path.display()),
                ));
            }
            nodes.push(node);
        }

        for (position, spec) in self.nodes.iter().enumerate() {
            let parent_ecosystem = spec.parent_ecosystem.as_deref().map(resolve);
            let parent_project = spec.parent_project.as_deref().map(resolve);

            if let Some(path) = &parent_ecosystem {
                let parent = index
                    .get(path)
                    .map(|&i| &nodes[i])
                    .ok_or_else(|| invalid(&spec.name, unknown_parent("parent_ecosystem", path)))?;
                if !parent.kind.is_ecosystem() {
                    return Err(invalid(
                        &spec.name,
                        format!("parent_ecosystem '{}' is a {}", path.display(), parent.kind),
                    ));
                }
            }
            if let Some(path) = &parent_project
                && !index.contains_key(path)
            {
                return Err(invalid(&spec.name, unknown_parent("parent_project", path)));
            }

            if spec.kind.is_worktree() && parent_project.is_none() {
                return Err(invalid(
                    &spec.name,
                    format!("{} requires parent_project", spec.kind),
                ));
            }
            if matches!(
                spec.kind,
                NodeKind::EcosystemSubProject | NodeKind::EcosystemSubProjectWorktree
            ) && parent_ecosystem.is_none()
            {
                return Err(invalid(
                    &spec.name,
                    format!("{} requires parent_ecosystem", spec.kind),
                ));
            }

            nodes[position].parent_ecosystem_path = parent_ecosystem;
            nodes[position].parent_project_path = parent_project;
        }

        let depths = compute_depths(&nodes, &index)?;
        for (node, depth) in nodes.iter_mut().zip(depths) {
            node.depth = depth;
        }
        Ok(nodes)
    }
}

/// Depth is one more than the nearest parent (project first, then
/// ecosystem)
fn compute_depths(
    nodes: &[WorkspaceNode],
    index: &HashMap<PathBuf, usize>,
) -> Result<Vec<usize>, ConfigError> {
    let parent_of = |i: usize| -> Option<usize> {
        let node = &nodes[i];
        node.parent_project_path
            .as_ref()
            .or(node.parent_ecosystem_path.as_ref())
            .and_then(|path| index.get(path).copied())
    };

    let mut depths = Vec::with_capacity(nodes.len());
    for start in 0..nodes.len() {
        let mut depth = 0;
        let mut current = start;
        while let Some(parent) = parent_of(current) {
            depth += 1;
            if depth > nodes.len() {
                return Err(invalid(&nodes[start].name, "parent chain forms a cycle".to_string()));
            }
            current = parent;
        }
        depths.push(depth);
    }
    Ok(depths)
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.contains(':') || name.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidValue {
            field: "workspace.nodes.name".to_string(),
            message: format!("'{name}' must be non-empty without ':' or whitespace"),
        });
    }
    Ok(())
}

fn unknown_parent(field: &str, path: &Path) -> String {
    format!("{field} '{}' is not a listed node", path.display())
}

fn invalid(node: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: format!("workspace.nodes[{node}]"),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(toml_text: &str) -> WorkspaceManifest {
        #[derive(Deserialize)]
        struct Wrapper {
            workspace: WorkspaceManifest,
        }
        toml::from_str::<Wrapper>(toml_text).unwrap().workspace
    }

    #[test]
    fn test_depths_and_parents_are_derived() {
        let manifest = manifest(
            r#"
[[workspace.nodes]]
name = "eco"
path = "/ws/eco"
kind = "ecosystem-root"

[[workspace.nodes]]
name = "repo"
path = "/ws/eco/repo"
kind = "ecosystem-sub-project"
parent_ecosystem = "/ws/eco"

[[workspace.nodes]]
name = "fix"
path = "/ws/eco/repo/.grove-worktrees/fix"
kind = "ecosystem-sub-project-worktree"
parent_ecosystem = "/ws/eco"
parent_project = "/ws/eco/repo"
"#,
        );
        let nodes = manifest.to_nodes(Path::new("/")).unwrap();
        let depths: Vec<_> = nodes.iter().map(|n| (n.name.as_str(), n.depth)).collect();
        assert_eq!(depths, vec![("eco", 0), ("repo", 1), ("fix", 2)]);
        assert_eq!(
            nodes[2].parent_project_path.as_deref(),
            Some(Path::new("/ws/eco/repo"))
        );
    }

    #[test]
    fn test_relative_paths_use_base_dir() {
        let manifest = manifest(
            r#"
[[workspace.nodes]]
name = "solo"
path = "../solo"
kind = "standalone-project"
"#,
        );
        let nodes = manifest.to_nodes(Path::new("/ws/here")).unwrap();
        assert_eq!(nodes[0].path, PathBuf::from("/ws/solo"));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let manifest = manifest(
            r#"
[[workspace.nodes]]
name = "repo"
path = "/ws/eco/repo"
kind = "ecosystem-sub-project"
parent_ecosystem = "/ws/eco"
"#,
        );
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("parent_ecosystem"));
    }

    #[test]
    fn test_worktree_requires_parent_project() {
        let manifest = manifest(
            r#"
[[workspace.nodes]]
name = "wt"
path = "/ws/wt"
kind = "standalone-project-worktree"
"#,
        );
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_names_with_colons_are_rejected() {
        let manifest = manifest(
            r#"
[[workspace.nodes]]
name = "a:b"
path = "/ws/ab"
kind = "standalone-project"
"#,
        );
        assert!(manifest.validate().is_err());
    }
}
