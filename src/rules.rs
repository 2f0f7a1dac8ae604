//! Upstream-to-Debian version translation rules
//!
//! Rules follow the `uscan` mangling syntax:
//! - `s/pattern/replacement/[flags]`: regex substitution, flags `g` (all
//!   matches) and `i` (case-insensitive); `u` and `x` are accepted and ignored
//! - `tr/from/to/` or `y/from/to/`: character-for-character transliteration
//!
//! Any non-alphanumeric character may serve as separator. Escaped separators
//! are not supported.

use crate::error::RuleError;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Pre-release markers rewritten in PEP 386 mode
static PRE_RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-.]?(alpha|beta|rc|dev|a|b|c)").unwrap());

/// One translation rule
#[derive(Debug, Clone)]
pub enum Rule {
    Substitute {
        source: String,
        pattern: Regex,
        replacement: String,
        global: bool,
    },
    Transliterate {
        source: String,
        map: HashMap<char, char>,
    },
    /// Rule kind this engine does not know; skipped with a warning
    Unknown(String),
}

impl Rule {
    /// Returns the rule text as written
    pub fn source(&self) -> &str {
        match self {
            Rule::Substitute { source, .. } | Rule::Transliterate { source, .. } => source,
            Rule::Unknown(source) => source,
        }
    }

    /// Applies this rule to `version`
    pub fn apply(&self, version: &str) -> String {
        match self {
            Rule::Substitute {
                pattern,
                replacement,
                global,
                ..
            } => {
                let limit = if *global { 0 } else { 1 };
                pattern
                    .replacen(version, limit, replacement.as_str())
                    .into_owned()
            }
            Rule::Transliterate { map, .. } => version
                .chars()
                .map(|c| map.get(&c).copied().unwrap_or(c))
                .collect(),
            Rule::Unknown(source) => {
                tracing::warn!("unknown rule ignored: {}", source);
                version.to_string()
            }
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for Rule {}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source())
    }
}

/// Splits `body` on `separator` after checking the separator is usable
fn split_body(rule: &str, body: &str) -> Result<Vec<String>, RuleError> {
    let mut chars = body.chars();
    let separator = chars
        .next()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .ok_or_else(|| RuleError::Malformed {
            rule: rule.to_string(),
            message: "missing separator".to_string(),
        })?;
    let parts: Vec<String> = chars
        .as_str()
        .split(separator)
        .map(str::to_string)
        .collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(RuleError::Malformed {
            rule: rule.to_string(),
            message: format!("expected two or three '{}' separated parts", separator),
        });
    }
    Ok(parts)
}

/// Rewrites a Perl-style replacement for the regex crate
///
/// `$N`, `${N}` and `\N` become `${N}`; any other `$` is literal.
fn perl_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' | '\\' if chars.peek().is_some_and(char::is_ascii_digit) => {
                let mut group = String::new();
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    group.push(d);
                }
                out.push_str(&format!("${{{}}}", group));
            }
            '$' if chars.peek() == Some(&'{') => out.push('$'),
            '$' => out.push_str("$$"),
            other => out.push(other),
        }
    }
    out
}

fn parse_substitute(rule: &str, body: &str) -> Result<Rule, RuleError> {
    let parts = split_body(rule, body)?;
    let flags = parts.get(2).map(String::as_str).unwrap_or("");
    let pattern = RegexBuilder::new(&parts[0])
        .case_insensitive(flags.contains('i'))
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            rule: rule.to_string(),
            message: e.to_string(),
        })?;
    Ok(Rule::Substitute {
        source: rule.to_string(),
        pattern,
        replacement: perl_replacement(&parts[1]),
        global: flags.contains('g'),
    })
}

fn parse_transliterate(rule: &str, body: &str) -> Result<Rule, RuleError> {
    let parts = split_body(rule, body)?;
    let from: Vec<char> = parts[0].chars().collect();
    let to: Vec<char> = parts[1].chars().collect();
    if from.len() != to.len() {
        return Err(RuleError::UnequalSets {
            rule: rule.to_string(),
            from: from.len(),
            to: to.len(),
        });
    }
    Ok(Rule::Transliterate {
        source: rule.to_string(),
        map: from.into_iter().zip(to).collect(),
    })
}

fn starts_with_separator(body: &str) -> bool {
    body.chars()
        .next()
        .is_some_and(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = s.trim();
        if let Some(body) = rule.strip_prefix("tr").filter(|b| starts_with_separator(b)) {
            return parse_transliterate(rule, body);
        }
        if let Some(body) = rule.strip_prefix('y').filter(|b| starts_with_separator(b)) {
            return parse_transliterate(rule, body);
        }
        if let Some(body) = rule.strip_prefix('s').filter(|b| starts_with_separator(b)) {
            return parse_substitute(rule, body);
        }
        Ok(Rule::Unknown(rule.to_string()))
    }
}

/// Parses a `;`-separated rule list, skipping empty entries
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, RuleError> {
    text.split(';')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .map(str::parse)
        .collect()
}

/// Rewrites an upstream version with `rules`, in order
///
/// With `pep386` set, pre-release markers are turned into `~` suffixes after
/// all rules ran. No rules and no PEP 386 mode leave the version unchanged.
pub fn translate(version: &str, rules: &[Rule], pep386: bool) -> String {
    let mut result = rules
        .iter()
        .fold(version.to_string(), |current, rule| rule.apply(&current));
    if pep386 {
        result = PRE_RELEASE_RE.replace_all(&result, "~${1}").into_owned();
    }
    result
}
