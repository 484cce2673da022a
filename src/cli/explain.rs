//! Explain command implementation
//!
//! Prints, per rule line, the files it won, the files it excluded, and the
//! files it matched but lost to a later line.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_SUCCESS, GlobalOptions, Session, report_error};
use crate::error::RulesError;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::path::Path;

/// Run the explain command
pub fn run_explain(options: &GlobalOptions, rules: Option<&Path>, format: OutputFormat) -> i32 {
    match run_explain_inner(options, rules, format) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_explain_inner(
    options: &GlobalOptions,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<String, RulesError> {
    let session = Session::load(options)?;
    let engine = session.engine(rules);
    let text = std::fs::read_to_string(engine.rules_path())
        .map_err(|e| RulesError::io(engine.rules_path(), e))?;
    let report = engine.resolve_files_with_attribution(&text)?;

    Ok(match format {
        OutputFormat::Human => HumanFormatter::new(engine.root()).format_attribution(&report),
        OutputFormat::Jsonl => JsonlFormatter::new(engine.root()).format_attribution(&report),
    })
}
