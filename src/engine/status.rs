//! Directory status inference for tree views

use crate::types::FileStatus;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Infers a status for every directory between `root` and the given files
///
/// A directory takes the highest-precedence status among its descendants
/// (hot, then cold, then excluded, then omitted). `root` itself is included.
pub fn infer_directory_statuses(
    root: &Path,
    files: &BTreeMap<PathBuf, FileStatus>,
) -> BTreeMap<PathBuf, FileStatus> {
    let mut directories: BTreeMap<PathBuf, FileStatus> = BTreeMap::new();

    for (file, status) in files {
        if !file.starts_with(root) {
            continue;
        }
        let mut current = file.parent();
        while let Some(dir) = current {
            let entry = directories.entry(dir.to_path_buf()).or_insert(*status);
            if *status > *entry {
                *entry = *status;
            }
            if dir == root {
                break;
            }
            current = dir.parent();
        }
    }

    directories
}
