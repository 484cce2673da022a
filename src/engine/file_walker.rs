//! File discovery and traversal
//!
//! Walks one or more base directories with the ignore crate's `WalkBuilder`.
//! Ignore files are deliberately not consulted here; gitignore filtering is
//! a separate step (see [`super::gitignore`]) so that literal inclusions can
//! bypass it.

use crate::paths::relative_to;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory names that are never descended into
pub const SKIPPED_DIRS: [&str; 2] = [".git", ".grove-worktrees"];

/// Errors that can occur during file walking
#[derive(Debug, Error)]
pub enum FileWalkerError {
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Forward-slash path relative to the project root; starts with `../`
    /// for files outside it
    pub relative: String,
}

impl FileEntry {
    pub fn new(path: PathBuf, root: &Path) -> Self {
        let relative = relative_to(&path, root);
        Self { path, relative }
    }

    /// Whether the file lies outside the project root
    pub fn is_external(&self) -> bool {
        self.relative == ".." || self.relative.starts_with("../")
    }
}

/// Walks base directories and yields regular files
pub struct FileWalker {
    root: PathBuf,
    bases: Vec<PathBuf>,
}

impl FileWalker {
    /// Creates a walker over the project root only
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            bases: vec![root.to_path_buf()],
        }
    }

    /// Creates a walker over several base directories
    ///
    /// Bases nested inside another base are dropped, and bases that do not
    /// exist are skipped with a debug log.
    pub fn with_bases(root: &Path, bases: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = bases
            .into_iter()
            .filter(|base| {
                let exists = base.is_dir();
                if !exists {
                    tracing::debug!(base = %base.display(), "skipping missing walk base");
                }
                exists
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Sorted order puts a parent before everything beneath it
        let mut kept: Vec<PathBuf> = Vec::with_capacity(unique.len());
        for base in unique.drain(..) {
            if !kept.iter().any(|parent| base.starts_with(parent)) {
                kept.push(base);
            }
        }

        Self {
            root: root.to_path_buf(),
            bases: kept,
        }
    }

    /// Base directories that will be walked
    pub fn bases(&self) -> &[PathBuf] {
        &self.bases
    }

    /// Walks every base and returns an iterator over regular files
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, FileWalkerError>> + '_ {
        self.bases.iter().flat_map(move |base| {
            let walker = WalkBuilder::new(base)
                .standard_filters(false)
                .hidden(false)
                .follow_links(false)
                .filter_entry(|entry| {
                    let skipped = entry.file_type().is_some_and(|ft| ft.is_dir())
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| SKIPPED_DIRS.contains(&name));
                    !skipped
                })
                .build();

            walker.filter_map(move |result| match result {
                Ok(entry) => {
                    // Only regular files; symlinks are not followed
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        return None;
                    }
                    Some(Ok(FileEntry::new(entry.into_path(), &self.root)))
                }
                Err(e) => Some(Err(FileWalkerError::Walk(e))),
            })
        })
    }

    /// Collects all files, sorted by path
    pub fn collect_files(&self) -> Result<Vec<FileEntry>, FileWalkerError> {
        let mut files = self.walk().collect::<Result<Vec<_>, _>>()?;
        files.sort();
        files.dedup();
        Ok(files)
    }
}
