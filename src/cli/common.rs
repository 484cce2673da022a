//! Common helper functions shared across CLI commands
//!
//! Loads settings, builds the workspace provider and the engine, and maps
//! errors to exit codes.

use crate::config::{CONFIG_FILE, Settings};
use crate::engine::ContextEngine;
use crate::error::{ConfigError, RulesError};
use crate::workspace::LazyWorkspace;
use std::path::{Path, PathBuf};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Global options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Settings and workspace for one command invocation
pub(crate) struct Session {
    pub root: PathBuf,
    pub settings: Settings,
    pub workspace: LazyWorkspace,
}

impl Session {
    /// Loads settings; a missing default `cx.toml` means defaults, a missing
    /// explicit `--config` is an error
    pub fn load(options: &GlobalOptions) -> Result<Self, ConfigError> {
        let root = match &options.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };

        let settings = match &options.config {
            Some(path) => Settings::load(path)?,
            None => Settings::load_or_default(root.join(CONFIG_FILE))?,
        };

        let base_dir = options
            .config
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.clone());
        // Relative node paths only collide once resolved against the real base
        let nodes = settings.workspace.to_nodes(&base_dir)?;
        tracing::debug!(
            nodes = nodes.len(),
            base = %base_dir.display(),
            "workspace manifest loaded"
        );
        let workspace = LazyWorkspace::new(move || nodes.clone());

        Ok(Session {
            root,
            settings,
            workspace,
        })
    }

    /// Builds an engine reading `rules` or the configured rules file
    pub fn engine(&self, rules: Option<&Path>) -> ContextEngine<'_> {
        let rules_path = rules.unwrap_or(&self.settings.rules_file);
        ContextEngine::new(&self.root, &self.workspace)
            .with_rules_path(rules_path)
            .with_oracle(self.settings.oracle())
            .with_notebook_root(self.settings.notebook_root())
    }
}

/// Prints an error and returns the matching exit code
pub(crate) fn report_error(error: &RulesError) -> i32 {
    eprintln!("Error: {}", error);
    match error {
        RulesError::Parse(_) | RulesError::Config(_) => EXIT_PARSE_ERROR,
        _ => EXIT_ERROR,
    }
}
