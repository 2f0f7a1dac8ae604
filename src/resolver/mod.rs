//! Requirement to Debian dependency resolution
//!
//! Each requirement goes through an ordered chain, first answer wins:
//! 1. a matching override record (ignore, hardcoded, translated or plain)
//! 2. the installed-file index, when it names exactly one owner
//! 3. a name synthesized from the distribution name

mod file_index;

pub use file_index::{parse_owner_lines, DpkgFileIndex, FileIndex, StaticFileIndex};

use crate::config::Ecosystem;
use crate::domain::{safe_name, Requirement, Version};
use crate::error::{AppError, IoError, RequirementError};
use crate::pydist::{OverrideDatabase, OverrideRecord};
use crate::rules::translate;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Interpreter-specific public library directory inside a package tree
static PUBLIC_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?/usr/lib/python(\d(?:\.\d+)?)/(site|dist)-packages").unwrap()
});

/// Guesses a Debian package name from a distribution name
///
/// `My_Foo` becomes `python3-my-foo`; a leading `python-` is dropped.
pub fn sensible_pname(prefix: &str, name: &str) -> String {
    let name = safe_name(name).replace('_', "-");
    let name = name.strip_prefix("python-").unwrap_or(&name);
    format!("{}-{}", prefix, name)
}

/// Interpreter version encoded in a requirement file location, if any
///
/// Only a full `X.Y` directory counts; `python3` alone gives no hint.
pub fn version_hint(path: &Path) -> Option<Version> {
    let text = path.to_string_lossy();
    let captures = PUBLIC_DIR_RE.captures(&text)?;
    let dir_version = captures.get(1)?.as_str();
    if dir_version.len() == 1 {
        return None;
    }
    dir_version.parse().ok()
}

/// Case-insensitive glob for a normalized name: `foo` becomes `[fF][oO][oO]`
fn case_insensitive_glob(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                format!("[{}{}]", c.to_ascii_lowercase(), c.to_ascii_uppercase())
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Resolves upstream requirements against overrides and the file index
pub struct Resolver<'a> {
    overrides: &'a OverrideDatabase,
    index: &'a dyn FileIndex,
    ecosystem: &'a Ecosystem,
    override_hint: String,
}

impl<'a> Resolver<'a> {
    pub fn new(
        overrides: &'a OverrideDatabase,
        index: &'a dyn FileIndex,
        ecosystem: &'a Ecosystem,
    ) -> Self {
        Self {
            overrides,
            index,
            ecosystem,
            override_hint: "debian/py3dist-overrides".to_string(),
        }
    }

    /// Names the user override file in best-guess warnings
    pub fn with_override_hint(mut self, path: impl Into<String>) -> Self {
        self.override_hint = path.into();
        self
    }

    /// Resolves one requirement
    ///
    /// Returns `Ok(None)` when an override says the requirement is to be
    /// ignored. Only malformed requirement text is an error.
    pub fn resolve(
        &self,
        text: &str,
        target: Option<Version>,
    ) -> Result<Option<String>, RequirementError> {
        tracing::debug!(
            "trying to guess dependency for {} (python={})",
            text,
            target.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
        );
        let requirement = text.parse::<Requirement>().inspect_err(|e| {
            tracing::error!("{}", e);
        })?;

        let record = self
            .overrides
            .lookup(&requirement.name)
            .iter()
            .find(|record| target.map_or(true, |v| record.range.contains(v)));
        if let Some(record) = record {
            return Ok(Self::from_record(record, &requirement));
        }

        if let Some(owner) = self.query_index(&requirement.name) {
            return Ok(Some(owner));
        }

        let pname = sensible_pname(&self.ecosystem.package_prefix, &requirement.raw_name);
        tracing::warn!(
            "Cannot find package that provides {}. Using {} as package name. \
             Please add \"{} correct_package_name\" line to {} to override it.",
            requirement.raw_name,
            pname,
            requirement.raw_name,
            self.override_hint
        );
        Ok(Some(pname))
    }

    fn from_record(record: &OverrideRecord, requirement: &Requirement) -> Option<String> {
        if record.is_ignore() {
            return None;
        }
        if record.is_hardcoded() || !record.wants_translation() {
            return Some(record.dependency.clone());
        }
        let translated = requirement.constraint().and_then(|(operator, version)| {
            let relation = operator.debian_relation()?;
            let version = translate(version, &record.rules, record.pep386);
            Some(format!("{} ({} {})", record.dependency, relation, version))
        });
        Some(translated.unwrap_or_else(|| record.dependency.clone()))
    }

    fn query_index(&self, name: &str) -> Option<String> {
        let pattern = format!(
            "{}/{}-?*.*-info",
            self.ecosystem.lib_dir.trim_end_matches('/'),
            case_insensitive_glob(name)
        );
        match self.index.owners(&pattern) {
            Ok(owners) if owners.len() == 1 => owners.into_iter().next(),
            Ok(owners) if owners.len() > 1 => {
                tracing::error!(
                    "more than one package name found for {} dist: {}",
                    name,
                    owners.join(", ")
                );
                None
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("file index query failed: {}", e);
                None
            }
        }
    }

    /// Resolves every requirement listed in a requirement file
    ///
    /// Parsing stops at the first `[section]` line. The interpreter version
    /// encoded in the file location, if any, filters override records.
    pub fn parse_requirement_file(&self, path: &Path) -> Result<Vec<String>, AppError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| IoError::generic(path, e))?;
        let hint = version_hint(path);
        let mut result = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                break;
            }
            if line.is_empty() {
                continue;
            }
            if let Some(dependency) = self.resolve(line, hint)? {
                result.push(dependency);
            }
        }
        Ok(result)
    }
}
