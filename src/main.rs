//! cx-rules CLI entry point

use clap::Parser;
use cx_rules::cli::{Cli, Command, GlobalOptions};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = GlobalOptions {
        root: cli.root,
        config: cli.config,
    };

    let exit_code = match cli.command {
        Command::List { rules, format } => {
            cx_rules::cli::list::run_list(&options, rules.as_deref(), format)
        }
        Command::Explain { rules, format } => {
            cx_rules::cli::explain::run_explain(&options, rules.as_deref(), format)
        }
        Command::Resolve { line } => cx_rules::cli::resolve::run_resolve(&options, &line),
        Command::Directives { rules } => {
            cx_rules::cli::directives::run_directives(&options, rules.as_deref())
        }
    };

    process::exit(exit_code);
}
