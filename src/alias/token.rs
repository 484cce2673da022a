//! Parsed forms of alias-bearing lines
//!
//! Two shapes share the `@alias:`/`@a:` prefix:
//! - alias patterns, `@a:eco:repo/src/**/*.go`, which name a workspace node
//!   and an optional trailing glob;
//! - ruleset imports, `@a:project::docs`, which name a rules file inside
//!   another project's `.cx/` directory.

use crate::error::ParseError;

/// Long and short alias prefixes
pub const ALIAS_PREFIXES: [&str; 2] = ["@alias:", "@a:"];

/// Long and short view prefixes
pub const VIEW_PREFIXES: [&str; 2] = ["@view:", "@v:"];

/// Alias namespace for notebook paths
pub const NOTEBOOK_NAMESPACE: &str = "nb";

const SEARCH_MARKERS: [&str; 2] = [" @find:", " @grep:"];

/// An alias pattern line such as `!@a:eco:repo/tests/** @grep: "x"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasToken {
    /// The line as written
    pub original_line: String,
    /// `""`, `"!"` or `"@view: "`
    pub prefix: String,
    /// Colon-separated alias, one to three components
    pub alias: String,
    /// Glob or path after the alias, without the joining `/`
    pub trailing_pattern: Option<String>,
    /// Trailing `@find:`/`@grep:` directive, verbatim
    pub search: Option<String>,
    /// Filled in by the resolver
    pub resolved_line: Option<String>,
}

impl AliasToken {
    /// Whether `line` is an alias pattern (not a ruleset import)
    pub fn is_alias_line(line: &str) -> bool {
        let (_, rest) = split_prefix(line.trim());
        match strip_alias_prefix(rest) {
            Some(body) => !alias_part(body).contains("::"),
            None => false,
        }
    }

    /// Parses an alias pattern line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let original_line = line.to_string();
        let invalid = |reason: &str| ParseError::InvalidAlias {
            line: original_line.clone(),
            reason: reason.to_string(),
        };

        let (prefix, rest) = split_prefix(line.trim());
        let body = strip_alias_prefix(rest).ok_or_else(|| invalid("missing @alias: prefix"))?;

        let (body, search) = split_search(body);
        if body.is_empty() {
            return Err(invalid("empty alias"));
        }
        if body.contains(char::is_whitespace) {
            return Err(invalid("alias and pattern must not contain whitespace"));
        }

        let (alias, trailing) = if let Some(rest) = body
            .strip_prefix(NOTEBOOK_NAMESPACE)
            .and_then(|r| r.strip_prefix(':'))
        {
            // nb:<name>:<path> or nb:<name>/<path>
            let split_at = rest.find([':', '/']);
            let (name, path) = match split_at {
                Some(i) => (&rest[..i], Some(&rest[i + 1..])),
                None => (rest, None),
            };
            if name.is_empty() {
                return Err(invalid("notebook alias requires a notebook name"));
            }
            (format!("{NOTEBOOK_NAMESPACE}:{name}"), path)
        } else {
            let alias = alias_part(body);
            if alias.contains("::") {
                return Err(invalid("ruleset imports are not alias patterns"));
            }
            let trailing = body.get(alias.len() + 1..);
            validate_components(alias).map_err(|reason| invalid(&reason))?;
            (alias.to_string(), trailing)
        };

        let trailing_pattern = trailing
            .map(|t| t.trim_matches('/'))
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(AliasToken {
            original_line,
            prefix: prefix.to_string(),
            alias,
            trailing_pattern,
            search: search.map(str::to_string),
            resolved_line: None,
        })
    }

    /// Alias components split on `:`
    pub fn components(&self) -> Vec<&str> {
        self.alias.split(':').collect()
    }

    /// Whether the alias targets the notebook root
    pub fn is_notebook(&self) -> bool {
        self.components().first() == Some(&NOTEBOOK_NAMESPACE)
    }

    /// Whether the line is an exclusion
    pub fn is_exclude(&self) -> bool {
        self.prefix == "!"
    }

    /// Whether the line is a view
    pub fn is_view(&self) -> bool {
        self.prefix.starts_with('@')
    }
}

/// A cross-project ruleset import such as `@a:project-b::docs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesetImportToken {
    /// Alias of the project that owns the ruleset
    pub project_alias: String,
    /// Ruleset file stem under `.cx/`
    pub ruleset_name: String,
}

impl RulesetImportToken {
    /// Parses `@alias:<project>::<ruleset>` or `@a:<project>::<ruleset>`
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidImport {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let body = strip_alias_prefix(line.trim())
            .ok_or_else(|| invalid("missing @alias: prefix"))?
            .trim();
        let (project, ruleset) = body
            .split_once("::")
            .ok_or_else(|| invalid("expected <project>::<ruleset>"))?;

        validate_components(project).map_err(|reason| invalid(&reason))?;
        if ruleset.is_empty() {
            return Err(invalid("ruleset name is empty"));
        }
        if ruleset.contains(['/', ':', '\\']) || ruleset.contains(char::is_whitespace) {
            return Err(invalid("ruleset name must be a bare file stem"));
        }

        Ok(RulesetImportToken {
            project_alias: project.to_string(),
            ruleset_name: ruleset.to_string(),
        })
    }
}

impl std::fmt::Display for RulesetImportToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.project_alias, self.ruleset_name)
    }
}

/// Splits a leading `!` or `@view:` prefix off a trimmed line
///
/// The returned prefix is normalized to `"!"` or `"@view: "`.
pub(crate) fn split_prefix(line: &str) -> (&'static str, &str) {
    if let Some(rest) = line.strip_prefix('!') {
        return ("!", rest.trim_start());
    }
    for view in VIEW_PREFIXES {
        if let Some(rest) = line.strip_prefix(view) {
            return ("@view: ", rest.trim_start());
        }
    }
    ("", line)
}

/// Strips `@alias:` or `@a:` and any following spaces
pub(crate) fn strip_alias_prefix(line: &str) -> Option<&str> {
    ALIAS_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
        .map(str::trim_start)
}

/// Splits a trailing ` @find: ...` / ` @grep: ...` off a line body
pub(crate) fn split_search(body: &str) -> (&str, Option<&str>) {
    let position = SEARCH_MARKERS
        .iter()
        .filter_map(|marker| body.find(marker))
        .min();
    match position {
        Some(i) => (body[..i].trim_end(), Some(body[i..].trim())),
        None => (body.trim_end(), None),
    }
}

/// The alias portion of a body: everything before the first `/`
fn alias_part(body: &str) -> &str {
    let body = body.split_whitespace().next().unwrap_or("");
    match body.find('/') {
        Some(i) => &body[..i],
        None => body,
    }
}

fn validate_components(alias: &str) -> Result<(), String> {
    let components: Vec<&str> = alias.split(':').collect();
    if !(1..=3).contains(&components.len()) {
        return Err(format!(
            "alias must have 1 to 3 components, found {}",
            components.len()
        ));
    }
    if components.iter().any(|c| c.is_empty()) {
        return Err("alias has an empty component".to_string());
    }
    Ok(())
}
