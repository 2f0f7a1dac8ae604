//! Application error types using thiserror
//!
//! Error hierarchy:
//! - RangeError: malformed version or version range text
//! - RequirementError: malformed upstream requirement
//! - OverrideError: broken override files (fatal for the whole load)
//! - RuleError: malformed version translation rules
//! - ShebangError: conflicting pinned interpreter versions
//! - ConfigError: configuration file and CLI value problems
//! - FileIndexError: installed-file index queries (never fatal)
//! - IoError: file system operation failures
//!
//! Every fatal error maps to its own process exit status so the invoking
//! tool can tell configuration defects from ordinary misses.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for generic I/O failures
pub const EXIT_IO: u8 = 1;
/// Exit status for configuration and CLI value problems
pub const EXIT_CONFIG: u8 = 2;
/// Exit status for a failed `validate` lint
pub const EXIT_INVALID_OVERRIDE_FILE: u8 = 3;
/// Exit status for a malformed requirement
pub const EXIT_INVALID_REQUIREMENT: u8 = 8;
/// Exit status for a broken override line
pub const EXIT_BROKEN_OVERRIDE_LINE: u8 = 9;
/// Exit status for conflicting pinned shebang versions
pub const EXIT_SHEBANG_CONFLICT: u8 = 13;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Requirement(#[from] RequirementError),

    #[error(transparent)]
    Override(#[from] OverrideError),

    #[error(transparent)]
    Shebang(#[from] ShebangError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] IoError),
}

impl AppError {
    /// Returns the documented process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Range(_) | AppError::Config(_) => EXIT_CONFIG,
            AppError::Requirement(_) => EXIT_INVALID_REQUIREMENT,
            AppError::Override(OverrideError::Unreadable { .. }) => EXIT_IO,
            AppError::Override(_) => EXIT_BROKEN_OVERRIDE_LINE,
            AppError::Shebang(_) => EXIT_SHEBANG_CONFLICT,
            AppError::Io(_) => EXIT_IO,
        }
    }
}

/// Malformed version or version range text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Not a `major.minor` pair
    #[error("version is invalid: '{value}'")]
    InvalidVersion { value: String },

    /// Range text does not follow the range grammar
    #[error("version range is invalid: '{value}'")]
    InvalidRange { value: String },

    /// Minimum bound lies above the maximum bound
    #[error("version range is invalid: '{value}' (minimum above maximum)")]
    Inverted { value: String },

    /// Minor component is already at its maximum
    #[error("version {value} has no next minor version")]
    NoNextVersion { value: String },

    /// Default interpreter version is not one of the supported versions
    #[error("default version {default} is not a supported version")]
    DefaultNotSupported { default: String },
}

/// Malformed upstream requirement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    #[error("requirement is not valid: '{requirement}': {message}")]
    Invalid {
        requirement: String,
        message: String,
    },
}

impl RequirementError {
    /// Creates a new Invalid error
    pub fn invalid(requirement: impl Into<String>, message: impl Into<String>) -> Self {
        RequirementError::Invalid {
            requirement: requirement.into(),
            message: message.into(),
        }
    }
}

/// Malformed version translation rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Separator layout does not yield pattern and replacement parts
    #[error("rule '{rule}' is malformed: {message}")]
    Malformed { rule: String, message: String },

    /// Pattern is not a valid regular expression
    #[error("rule '{rule}' has an invalid pattern: {message}")]
    InvalidPattern { rule: String, message: String },

    /// Transliteration sets differ in length
    #[error("rule '{rule}' maps {from} characters onto {to}")]
    UnequalSets { rule: String, from: usize, to: usize },
}

/// Errors related to override files
#[derive(Error, Debug)]
pub enum OverrideError {
    /// A line does not follow the override grammar
    #[error("{path}:{line}: broken override line: '{content}': {message}")]
    BrokenLine {
        path: PathBuf,
        line: usize,
        content: String,
        message: String,
    },

    /// Override file or directory could not be read
    #[error("failed to read override source {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OverrideError {
    /// Creates a new BrokenLine error
    pub fn broken_line(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        OverrideError::BrokenLine {
            path: path.into(),
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Creates a new Unreadable error
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OverrideError::Unreadable {
            path: path.into(),
            source,
        }
    }
}

/// More than one pinned interpreter version in one private directory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShebangError {
    #[error("more than one Python dependency from shebangs ({dir} shebang versions: {versions})")]
    ConflictingVersions { dir: String, versions: String },
}

/// Installed-file index query failures; never fatal
#[derive(Error, Debug)]
pub enum FileIndexError {
    /// The query program could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The query program exited unsuccessfully
    #[error("{program} exited with status {status}")]
    Failed { program: String, status: String },

    /// The glob pattern could not be turned into a matcher
    #[error("invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected schema
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// Stats input is not valid JSON for the expected schema
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// Invalid value in config or on the command line
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    /// Creates a new Generic IO error
    pub fn generic(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Generic {
            path: path.into(),
            source,
        }
    }
}
