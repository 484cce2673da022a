//! List command implementation
//!
//! Resolves the hot and cold sections of a rules file and prints the files
//! each selects.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_SUCCESS, GlobalOptions, Session, report_error};
use crate::error::RulesError;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::path::Path;

/// Run the list command
///
/// Exit code:
/// - 0: Success
/// - 2: Error
/// - 3: Parse or configuration error
pub fn run_list(options: &GlobalOptions, rules: Option<&Path>, format: OutputFormat) -> i32 {
    match run_list_inner(options, rules, format) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_list_inner(
    options: &GlobalOptions,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<String, RulesError> {
    let session = Session::load(options)?;
    let engine = session.engine(rules);
    let files = engine.resolve_context()?;

    Ok(match format {
        OutputFormat::Human => HumanFormatter::new(engine.root()).format_context(&files),
        OutputFormat::Jsonl => JsonlFormatter::new(engine.root()).format_context(&files),
    })
}
