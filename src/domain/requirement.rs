//! Upstream requirement entries (`name [extras] op version`)

use crate::error::RequirementError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static UNSAFE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.]+").unwrap());

/// Normalizes a distribution name
///
/// Every run of characters outside `[A-Za-z0-9.]` becomes a single `_` and the
/// result is lower-cased.
pub fn safe_name(name: &str) -> String {
    UNSAFE_RUN_RE.replace_all(name, "_").to_lowercase()
}

/// Comparison operator of a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    /// `~=`, compatible release
    Compatible,
}

impl Operator {
    /// Returns the upstream spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
        }
    }

    /// Returns the Debian relation, if this operator has one usable for translation
    pub fn debian_relation(&self) -> Option<&'static str> {
        match self {
            Operator::Less => Some("<<"),
            Operator::LessOrEqual => Some("<="),
            Operator::Greater => Some(">>"),
            Operator::GreaterOrEqual | Operator::Compatible => Some(">="),
            Operator::Equal | Operator::NotEqual => None,
        }
    }

    /// Longest-match operator prefix of `text`
    fn strip_from(text: &str) -> Option<(Self, &str)> {
        const OPERATORS: [(&str, Operator); 7] = [
            ("<=", Operator::LessOrEqual),
            (">=", Operator::GreaterOrEqual),
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            ("~=", Operator::Compatible),
            ("<", Operator::Less),
            (">", Operator::Greater),
        ];
        OPERATORS
            .iter()
            .find_map(|(token, op)| text.strip_prefix(token).map(|rest| (*op, rest)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of an upstream dependency list
///
/// Extras are accepted and dropped; anything after the first version
/// constraint (further constraints, environment markers) is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Name normalized with [`safe_name`]
    pub name: String,
    /// Name as written upstream
    pub raw_name: String,
    pub operator: Option<Operator>,
    pub version: Option<String>,
}

impl Requirement {
    /// Returns the (operator, version) constraint when both are present
    pub fn constraint(&self) -> Option<(Operator, &str)> {
        Some((self.operator?, self.version.as_deref()?))
    }
}

fn is_name_end(c: char) -> bool {
    c.is_whitespace() || matches!(c, '<' | '>' | '=' | '!' | '~' | '[' | ';' | ',')
}

fn is_version_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '*' | '+')
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = |message: &str| RequirementError::invalid(s, message);

        let name_end = text.find(is_name_end).unwrap_or(text.len());
        let raw_name = &text[..name_end];
        let name = safe_name(raw_name);
        if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(invalid("missing or invalid distribution name"));
        }

        let mut rest = text[name_end..].trim_start();
        if let Some(extras) = rest.strip_prefix('[') {
            let close = extras
                .find(']')
                .ok_or_else(|| invalid("unterminated extras"))?;
            rest = extras[close + 1..].trim_start();
        }

        let (operator, version) = match Operator::strip_from(rest) {
            Some((op, after)) => {
                let after = after.trim_start();
                let end = after
                    .find(|c: char| !is_version_char(c))
                    .unwrap_or(after.len());
                if end == 0 {
                    return Err(invalid("operator without version"));
                }
                (Some(op), Some(after[..end].to_string()))
            }
            None => (None, None),
        };

        Ok(Requirement {
            name,
            raw_name: raw_name.to_string(),
            operator,
            version,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint() {
            Some((op, version)) => write!(f, "{}{}{}", self.name, op, version),
            None => write!(f, "{}", self.name),
        }
    }
}
