//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for cx-rules commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// cx-rules CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "cx-rules")]
#[command(about = "Resolve context rules files to the files they select")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Settings file (defaults to <root>/cx.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available cx-rules subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the hot and cold files selected by a rules file
    List {
        /// Rules file (defaults to the configured rules_file)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show which rule line selected, excluded or shadowed each file
    Explain {
        /// Rules file (defaults to the configured rules_file)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Resolve the alias in a rules line
    Resolve {
        /// Rules line, e.g. '@a:eco:repo/src/**'
        line: String,
    },

    /// Show the cache directives of a rules file
    Directives {
        /// Rules file (defaults to the configured rules_file)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}
