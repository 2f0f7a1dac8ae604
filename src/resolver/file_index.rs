//! Installed-file index queries
//!
//! This module provides:
//! - The [`FileIndex`] seam used by the resolver's last lookup before guessing
//! - [`DpkgFileIndex`], which asks `dpkg -S` for file owners
//! - [`StaticFileIndex`], an in-memory owner table with the same answers

use crate::error::FileIndexError;
use globset::{GlobBuilder, GlobMatcher};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Finds the packages owning installed files that match a glob pattern
pub trait FileIndex {
    /// Returns the distinct owners of files matching `pattern`, sorted
    fn owners(&self, pattern: &str) -> Result<Vec<String>, FileIndexError>;
}

/// Parses `pkg[, pkg...]: /path` lines as printed by `dpkg -S`
///
/// Architecture qualifiers (`pkg:amd64`) are dropped and diversion notes are
/// skipped.
pub fn parse_owner_lines(output: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("diversion by") {
            continue;
        }
        let Some((packages, path)) = line.split_once(": ") else {
            continue;
        };
        for package in packages.split(", ") {
            let package = package.split(':').next().unwrap_or(package).trim();
            if !package.is_empty() {
                entries.push((package.to_string(), path.trim().to_string()));
            }
        }
    }
    entries
}

/// File index backed by the dpkg database
#[derive(Debug, Clone)]
pub struct DpkgFileIndex {
    program: PathBuf,
}

impl DpkgFileIndex {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("/usr/bin/dpkg"),
        }
    }

    /// Use another `dpkg`-compatible program
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run_query(&self, pattern: &str) -> std::io::Result<Output> {
        Command::new(&self.program).arg("-S").arg(pattern).output()
    }
}

impl Default for DpkgFileIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIndex for DpkgFileIndex {
    fn owners(&self, pattern: &str) -> Result<Vec<String>, FileIndexError> {
        let program = self.program.display().to_string();
        tracing::debug!("invoking {} -S {}", program, pattern);

        let output = self.run_query(pattern).map_err(|source| FileIndexError::Spawn {
            program: program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(FileIndexError::Failed {
                program,
                status: output.status.to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let owners: BTreeSet<String> = parse_owner_lines(&stdout)
            .into_iter()
            .map(|(package, _)| package)
            .collect();
        Ok(owners.into_iter().collect())
    }
}

/// Compiles an fnmatch-style glob; backslashes are ordinary characters
fn compile_glob(pattern: &str) -> Result<GlobMatcher, FileIndexError> {
    let glob = GlobBuilder::new(pattern)
        .backslash_escape(false)
        .build()
        .map_err(|e| FileIndexError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })?;
    Ok(glob.compile_matcher())
}

/// In-memory owner table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFileIndex {
    entries: Vec<(String, String)>,
}

impl StaticFileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `dpkg -S` style lines
    pub fn parse(content: &str) -> Self {
        Self {
            entries: parse_owner_lines(content),
        }
    }

    /// Records `package` as owner of `path`
    pub fn with_file(mut self, package: impl Into<String>, path: impl Into<String>) -> Self {
        self.entries.push((package.into(), path.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FileIndex for StaticFileIndex {
    fn owners(&self, pattern: &str) -> Result<Vec<String>, FileIndexError> {
        let matcher = compile_glob(pattern)?;
        let owners: BTreeSet<String> = self
            .entries
            .iter()
            .filter(|(_, path)| matcher.is_match(path.as_str()))
            .map(|(package, _)| package.clone())
            .collect();
        Ok(owners.into_iter().collect())
    }
}
