//! Path normalization helpers
//!
//! Rules and workspace paths are compared as forward-slash strings, so these
//! helpers convert between `Path` values and that form without touching the
//! filesystem.

use std::path::{Component, Path, PathBuf};

/// Converts a path to a forward-slash string
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Resolves `.` and `..` components without consulting the filesystem
///
/// A `..` that would climb above the root of an absolute path is dropped;
/// leading `..` components of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Expresses `path` relative to `base` as a forward-slash string
///
/// Both paths are expected to be absolute. Paths outside `base` come back
/// with leading `../` segments.
pub fn relative_to(path: &Path, base: &Path) -> String {
    if let Ok(stripped) = path.strip_prefix(base) {
        return to_slash(stripped);
    }

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..base_parts.len() {
        segments.push("..".to_string());
    }
    for part in &path_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }
    segments.join("/")
}

/// Returns the project root a rules file belongs to
///
/// Rules files live in `.grove/`, `.cx/` or `.cx.work/` directories inside
/// a project; anywhere else the containing directory is the project root.
pub fn project_root_of(rules_file: &Path) -> PathBuf {
    let Some(parent) = rules_file.parent() else {
        return PathBuf::from(".");
    };
    let in_rules_dir = parent
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| matches!(n, ".grove" | ".cx" | ".cx.work"));
    if in_rules_dir {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// Expands a leading `~` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
