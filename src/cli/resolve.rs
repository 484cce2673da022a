//! Resolve command implementation

use crate::cli::common::{EXIT_SUCCESS, GlobalOptions, Session, report_error};
use crate::error::RulesError;

/// Run the resolve command, printing the line with its alias resolved
pub fn run_resolve(options: &GlobalOptions, line: &str) -> i32 {
    let result = Session::load(options)
        .map_err(RulesError::from)
        .and_then(|session| session.engine(None).resolve_line(line));

    match result {
        Ok(resolved) => {
            println!("{}", resolved);
            EXIT_SUCCESS
        }
        Err(e) => report_error(&e),
    }
}
