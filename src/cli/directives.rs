//! Directives command implementation

use crate::cli::common::{EXIT_SUCCESS, GlobalOptions, Session, report_error};
use crate::error::RulesError;
use crate::output::HumanFormatter;
use std::path::Path;

/// Run the directives command
pub fn run_directives(options: &GlobalOptions, rules: Option<&Path>) -> i32 {
    match run_directives_inner(options, rules) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_directives_inner(options: &GlobalOptions, rules: Option<&Path>) -> Result<String, RulesError> {
    let session = Session::load(options)?;
    let engine = session.engine(rules);
    let directives = engine.cache_directives()?;
    Ok(HumanFormatter::new(engine.root()).format_directives(&directives))
}
