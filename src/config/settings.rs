//! Parsing and validation for cx.toml settings files

use super::manifest::WorkspaceManifest;
use crate::engine::gitignore::{GitCheckIgnore, GitignoreOracle, IgnoreFileOracle, NoGitignore};
use crate::error::ConfigError;
use crate::paths::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file name looked up at the project root
pub const CONFIG_FILE: &str = "cx.toml";

/// Main configuration struct for cx.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Root rules file, relative to the project root
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,

    /// Notebook settings for `@a:nb:` aliases
    #[serde(default)]
    pub notebook: NotebookConfig,

    /// Gitignore filtering
    #[serde(default)]
    pub gitignore: GitignoreConfig,

    /// Workspace node graph
    #[serde(default)]
    pub workspace: WorkspaceManifest,
}

fn default_rules_file() -> PathBuf {
    PathBuf::from(".grove/rules")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            notebook: NotebookConfig::default(),
            gitignore: GitignoreConfig::default(),
            workspace: WorkspaceManifest::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse settings from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rules_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "rules_file".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if self.gitignore.mode == GitignoreMode::Git && self.gitignore.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gitignore.timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if let Some(root) = &self.notebook.root
            && root.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "notebook.root".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        self.workspace.validate()
    }

    /// Notebook root with `~` expanded
    pub fn notebook_root(&self) -> Option<PathBuf> {
        self.notebook.root.as_deref().map(expand_tilde)
    }

    /// Builds the configured gitignore oracle
    pub fn oracle(&self) -> Box<dyn GitignoreOracle> {
        match self.gitignore.mode {
            GitignoreMode::Off => Box::new(NoGitignore),
            GitignoreMode::Files => Box::new(IgnoreFileOracle),
            GitignoreMode::Git => Box::new(
                GitCheckIgnore::new(Duration::from_millis(self.gitignore.timeout_ms))
                    .fail_open(self.gitignore.fail_open),
            ),
        }
    }
}

/// Notebook configuration section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotebookConfig {
    /// Directory holding notebooks; `~` is expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

/// Gitignore configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitignoreConfig {
    #[serde(default)]
    pub mode: GitignoreMode,

    /// Timeout for `git check-ignore`, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Treat nothing as ignored when git fails or times out
    #[serde(default)]
    pub fail_open: bool,
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for GitignoreConfig {
    fn default() -> Self {
        Self {
            mode: GitignoreMode::default(),
            timeout_ms: default_timeout_ms(),
            fail_open: false,
        }
    }
}

/// How gitignored files are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GitignoreMode {
    /// No filtering
    Off,
    /// Evaluate ignore files directly
    #[default]
    Files,
    /// Ask `git check-ignore`
    Git,
}
