//! Cache directive evaluation
//!
//! Only the root document is consulted; imported rules files cannot change
//! how the caller caches the context they contribute to.

use super::document::RulesDocument;
use super::line::Directive;
use crate::error::ConfigError;
use std::time::Duration;

/// Cache flags declared by a rules document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheDirectives {
    pub freeze_cache: bool,
    pub no_expire: bool,
    pub disable_cache: bool,
    pub expire_time: Option<Duration>,
}

impl CacheDirectives {
    /// Evaluates the directives of rules text
    pub fn from_text(text: &str) -> Result<Self, ConfigError> {
        Self::from_document(&RulesDocument::parse(text))
    }

    /// Evaluates the directives of a parsed document
    ///
    /// A repeated `@expire-time` overrides the earlier one.
    pub fn from_document(document: &RulesDocument) -> Result<Self, ConfigError> {
        let mut directives = CacheDirectives::default();
        for (_, directive) in document.directives() {
            match directive {
                Directive::FreezeCache => directives.freeze_cache = true,
                Directive::NoExpire => directives.no_expire = true,
                Directive::DisableCache => directives.disable_cache = true,
                Directive::ExpireTime(value) => {
                    directives.expire_time = Some(parse_duration(value)?);
                }
            }
        }
        Ok(directives)
    }
}

/// Parses a duration literal such as `24h`, `90m`, `300s`, `2d` or `1h30m`
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let literal = value.trim();
    if literal.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();

    for c in literal.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit_seconds: u64 = match c {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid(&format!("unknown unit '{c}' (expected d, h, m or s)"))),
        };
        if digits.is_empty() {
            return Err(invalid(&format!("unit '{c}' has no number")));
        }
        let amount: u64 = digits.parse().map_err(|_| invalid("number out of range"))?;
        total = amount
            .checked_mul(unit_seconds)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| invalid("duration overflows"))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(invalid("missing unit"));
    }
    if total == 0 {
        return Err(invalid("duration must be positive"));
    }
    Ok(Duration::from_secs(total))
}
