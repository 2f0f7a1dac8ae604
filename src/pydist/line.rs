//! Override line grammar
//!
//! ```text
//! <name> [<range>] [<dependency>][; [PEP386] [rule[;rule]...]]
//! ```
//!
//! An empty dependency means the requirement is to be ignored.

use super::OverrideRecord;
use crate::domain::{safe_name, VersionRange};
use crate::rules::parse_rules;

const PEP386_MARKER: &str = "PEP386";

/// Outcome of tokenizing one line of an override file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment,
    Record(OverrideRecord),
}

fn is_name(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn looks_like_range(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || c == '-')
}

/// Parses one line; the error message names the violated part
pub fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Line::Blank);
    }
    if line.starts_with('#') {
        return Ok(Line::Comment);
    }

    let (head, tail) = match line.split_once(';') {
        Some((head, tail)) => (head, Some(tail)),
        None => (line, None),
    };

    let head = head.trim();
    let (name, mut rest) = head
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim_start()))
        .unwrap_or((head, ""));
    if !is_name(name) {
        return Err(format!("invalid distribution name '{}'", name));
    }

    let mut range = VersionRange::unbounded();
    if looks_like_range(rest) {
        let (token, after) = rest
            .split_once(char::is_whitespace)
            .map(|(token, after)| (token, after.trim_start()))
            .unwrap_or((rest, ""));
        range = token.parse().map_err(|e| format!("{}", e))?;
        rest = after;
    }

    let dependency = rest.trim();
    if !dependency.is_empty() && !dependency.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(format!("invalid dependency '{}'", dependency));
    }

    let mut pep386 = false;
    let mut rules = Vec::new();
    if let Some(tail) = tail {
        let mut tail = tail.trim_start();
        if let Some(after) = tail.strip_prefix(PEP386_MARKER) {
            pep386 = true;
            tail = after.trim_start_matches([';', ' ', '\t']);
        }
        rules = parse_rules(tail).map_err(|e| e.to_string())?;
    }

    Ok(Line::Record(OverrideRecord {
        name: safe_name(name),
        range,
        dependency: dependency.to_string(),
        rules,
        pep386,
    }))
}
