//! Configuration for the target distribution
//!
//! Defaults describe Debian's Python 3 stack. A TOML file may override any
//! subset of the keys:
//!
//! ```toml
//! [versions]
//! supported = ["3.1", "3.2"]
//! default = "3.1"
//!
//! [ecosystem]
//! package_prefix = "python3"
//! lib_dir = "/usr/lib/python3/dist-packages"
//!
//! [overrides]
//! user_file = "debian/py3dist-overrides"
//! ```

use crate::domain::{SupportedVersions, Version};
use crate::error::ConfigError;
use crate::pydist::OverrideSources;
use serde::Deserialize;
use std::path::Path;

/// Interpreter versions section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    pub supported: Vec<Version>,
    pub default: Version,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        let defaults = SupportedVersions::default();
        Self {
            supported: defaults.iter().collect(),
            default: defaults.default_version(),
        }
    }
}

/// Naming and layout of the packaged ecosystem
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ecosystem {
    /// Prefix of binary package names, also the generic runtime package
    pub package_prefix: String,
    /// Stem of versioned interpreter packages (`python` + `3.2`)
    pub interpreter: String,
    /// Public library tree searched in the installed-file index
    pub lib_dir: String,
    /// Minimum runtime needed by the byte-compilation helpers
    pub compile_dependency: String,
}

impl Default for Ecosystem {
    fn default() -> Self {
        Self {
            package_prefix: "python3".to_string(),
            interpreter: "python".to_string(),
            lib_dir: "/usr/lib/python3/dist-packages".to_string(),
            compile_dependency: "python3 (>= 3.2.3-3~)".to_string(),
        }
    }
}

impl Ecosystem {
    /// Generic runtime package, `python3` or `python3-dbg`
    pub fn runtime(&self, debug: bool) -> String {
        if debug {
            format!("{}-dbg", self.package_prefix)
        } else {
            self.package_prefix.clone()
        }
    }

    /// Runtime package for one version, `python3.2` or `python3.2-dbg`
    pub fn versioned_runtime(&self, version: Version, debug: bool) -> String {
        let name = format!("{}{}", self.interpreter, version);
        if debug {
            format!("{}-dbg", name)
        } else {
            name
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub versions: VersionsConfig,
    pub ecosystem: Ecosystem,
    pub overrides: OverrideSources,
}

impl Config {
    /// Reads a TOML config file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::TomlParseError { message, .. } => ConfigError::TomlParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses TOML text and validates it
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
                path: Default::default(),
                message: e.to_string(),
            })?;
        config.supported_versions()?;
        Ok(config)
    }

    /// The supported version set described by the `versions` section
    pub fn supported_versions(&self) -> Result<SupportedVersions, ConfigError> {
        SupportedVersions::new(
            self.versions.supported.iter().copied(),
            self.versions.default,
        )
        .map_err(|e| ConfigError::InvalidValue {
            key: "versions.default".to_string(),
            message: e.to_string(),
        })
    }
}
