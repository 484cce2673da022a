#![forbid(unsafe_code)]

//! Single-line tokenizer for rules documents
//!
//! Every consumer (expander, resolver, editors) matches on [`RuleLine`]
//! instead of re-inspecting raw strings.

use crate::alias::token::{
    AliasToken, RulesetImportToken, split_prefix, split_search, strip_alias_prefix,
};
use crate::error::ParseError;
use crate::types::{SearchDirective, SearchKind};

/// Separator between the hot and cold sections
pub const SEPARATOR: &str = "---";

/// A typed rules line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLine {
    /// Empty or whitespace-only line
    Blank,
    /// `# ...`
    Comment(String),
    /// `---`
    Separator,
    /// Inclusion glob
    Pattern(PatternLine),
    /// `!glob`
    Exclude(PatternLine),
    /// `@alias:`/`@a:` pattern, possibly prefixed with `!` or `@view:`
    AliasPattern(AliasToken),
    /// `@alias:<project>::<ruleset>`
    RulesetImport(RulesetImportToken),
    /// `@default: <path>`
    DefaultImport(String),
    /// `@view: <glob>`
    View(PatternLine),
    /// Document-level flag
    Directive(Directive),
}

/// Glob plus optional content-search filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternLine {
    pub glob: String,
    pub search: Option<SearchDirective>,
}

/// Whole-line document directives consumed by the caching layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    FreezeCache,
    NoExpire,
    DisableCache,
    /// Raw duration literal, validated by the cache directive evaluator
    ExpireTime(String),
}

/// Parses one line of a rules document
pub fn parse_line(line: &str) -> Result<RuleLine, ParseError> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Ok(RuleLine::Blank);
    }
    if let Some(comment) = trimmed.strip_prefix('#') {
        return Ok(RuleLine::Comment(comment.trim().to_string()));
    }
    if trimmed == SEPARATOR {
        return Ok(RuleLine::Separator);
    }

    let (prefix, rest) = split_prefix(trimmed);

    if strip_alias_prefix(rest).is_some() {
        if AliasToken::is_alias_line(trimmed) {
            return AliasToken::parse(trimmed).map(RuleLine::AliasPattern);
        }
        if !prefix.is_empty() {
            return Err(ParseError::InvalidImport {
                line: trimmed.to_string(),
                reason: format!("ruleset imports cannot be combined with '{}'", prefix.trim()),
            });
        }
        return RulesetImportToken::parse(trimmed).map(RuleLine::RulesetImport);
    }

    match prefix {
        "!" => {
            if rest.is_empty() {
                return Err(ParseError::InvalidPattern {
                    pattern: trimmed.to_string(),
                    reason: "exclusion has no pattern".to_string(),
                });
            }
            parse_pattern(rest, trimmed).map(RuleLine::Exclude)
        }
        "@view: " => {
            if rest.is_empty() {
                return Err(ParseError::InvalidDirective {
                    line: trimmed.to_string(),
                    reason: "@view: requires a pattern".to_string(),
                });
            }
            parse_pattern(rest, trimmed).map(RuleLine::View)
        }
        _ if trimmed.starts_with('@') => parse_directive(trimmed),
        _ => parse_pattern(trimmed, trimmed).map(RuleLine::Pattern),
    }
}

fn parse_directive(line: &str) -> Result<RuleLine, ParseError> {
    let name_end = line
        .find(|c: char| c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[1..name_end];
    let arg = line[name_end..].trim_start_matches(':').trim();

    let invalid = |reason: String| ParseError::InvalidDirective {
        line: line.to_string(),
        reason,
    };

    let flag = |directive: Directive| {
        if arg.is_empty() {
            Ok(RuleLine::Directive(directive))
        } else {
            Err(invalid(format!("@{name} takes no argument")))
        }
    };

    match name {
        "default" => {
            if arg.is_empty() {
                return Err(ParseError::InvalidImport {
                    line: line.to_string(),
                    reason: "@default: requires a path".to_string(),
                });
            }
            Ok(RuleLine::DefaultImport(arg.to_string()))
        }
        // A search with no pattern searches the whole project
        "find" | "grep" => parse_pattern(&format!("** {line}"), line).map(RuleLine::Pattern),
        "freeze-cache" => flag(Directive::FreezeCache),
        "no-expire" => flag(Directive::NoExpire),
        "disable-cache" => flag(Directive::DisableCache),
        // An empty duration is kept so cache directive parsing can reject it
        "expire-time" => Ok(RuleLine::Directive(Directive::ExpireTime(arg.to_string()))),
        _ => Err(invalid(format!("unknown directive '@{name}'"))),
    }
}

/// Parses `glob [@find: "q" | @grep: "q"]`
fn parse_pattern(body: &str, line: &str) -> Result<PatternLine, ParseError> {
    let (glob, search) = split_search(body);
    let search = search
        .map(|text| parse_search(text, line))
        .transpose()?;

    if glob.contains(char::is_whitespace) {
        return Err(ParseError::InvalidPattern {
            pattern: line.to_string(),
            reason: "pattern must not contain whitespace".to_string(),
        });
    }

    Ok(PatternLine {
        glob: glob.to_string(),
        search,
    })
}

/// Parses `@find: "q"` or `@grep: "q"`
pub(crate) fn parse_search(text: &str, line: &str) -> Result<SearchDirective, ParseError> {
    let invalid = |reason: String| ParseError::InvalidSearch {
        line: line.to_string(),
        reason,
    };

    let (kind, query) = if let Some(q) = text.strip_prefix(SearchKind::Find.keyword()) {
        (SearchKind::Find, q)
    } else if let Some(q) = text.strip_prefix(SearchKind::Grep.keyword()) {
        (SearchKind::Grep, q)
    } else {
        return Err(invalid("expected @find: or @grep:".to_string()));
    };

    let query = query.trim();
    let query = match query.strip_prefix('"') {
        Some(inner) => inner
            .strip_suffix('"')
            .ok_or_else(|| invalid("unterminated quoted query".to_string()))?,
        None => query,
    };
    if query.is_empty() {
        return Err(invalid("search query is empty".to_string()));
    }
    if kind == SearchKind::Grep {
        regex::Regex::new(query).map_err(|e| invalid(format!("invalid regex: {e}")))?;
    }

    Ok(SearchDirective {
        kind,
        query: query.to_string(),
    })
}
