//! Configuration file parsing and validation

pub mod manifest;
pub mod settings;

pub use manifest::{NodeSpec, WorkspaceManifest};
pub use settings::{
    CONFIG_FILE, GitignoreConfig, GitignoreMode, NotebookConfig, Settings,
};
