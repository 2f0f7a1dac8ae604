//! Facts detected in a built package, and the options driving aggregation
//!
//! Both are produced outside this crate (a file scanner and the command-line
//! layer) and are only read here.

use super::version::{Version, VersionRange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Interpreter found in a `#!` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shebang {
    /// Interpreter as written, e.g. `python3` or `python3.2`
    pub interpreter: String,
    /// Pinned version, `None` for the generic interpreter
    #[serde(default)]
    pub version: Option<Version>,
}

impl Shebang {
    pub fn new(interpreter: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            interpreter: interpreter.into(),
            version,
        }
    }
}

/// Findings for one private (non-public) install location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateDirStats {
    pub compile: bool,
    pub ext: BTreeSet<Version>,
    pub shebangs: Vec<Shebang>,
}

/// Findings for one binary package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Package ships byte-compilable files
    pub compile: bool,
    /// ABI versions of shipped extension modules
    pub ext: BTreeSet<Version>,
    /// Top-level shebangs
    pub shebangs: Vec<Shebang>,
    /// Private install locations and their own findings
    pub private_dirs: BTreeMap<String, PrivateDirStats>,
    /// Requirement-list files found in the package
    pub requires: Vec<PathBuf>,
}

/// Options driving dependency aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOptions {
    /// Requested interpreter range
    pub vrange: Option<VersionRange>,
    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
    /// Inserted verbatim, no resolution
    pub enhances: Vec<String>,
    /// Inserted verbatim, no resolution
    pub breaks: Vec<String>,
    /// Resolve requirement-list files into Depends
    pub guess_deps: bool,
    /// Exclusion regexes passed to runtime-update descriptors
    pub regexpr: Vec<String>,
}

impl Default for DependencyOptions {
    fn default() -> Self {
        Self {
            vrange: None,
            depends: Vec::new(),
            recommends: Vec::new(),
            suggests: Vec::new(),
            enhances: Vec::new(),
            breaks: Vec::new(),
            guess_deps: true,
            regexpr: Vec::new(),
        }
    }
}
