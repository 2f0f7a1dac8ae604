//! CLI argument parsing module for pydist

use crate::domain::{DependencyOptions, Version, VersionRange};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse an interpreter range such as `3.2-`, `-3.4` or `3.1-3.3`
fn parse_range(s: &str) -> Result<VersionRange, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Parse an interpreter version such as `3.2`
fn parse_version(s: &str) -> Result<Version, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Translate Python requirements into Debian dependencies
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pydist",
    version,
    about = "Translate Python requirements into Debian dependencies"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Read configuration from this TOML file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Package override file (default: debian/py3dist-overrides)
    #[arg(long, global = true)]
    pub overrides: Option<PathBuf>,

    /// Answer file owner queries from a `dpkg -S` style table instead of dpkg
    #[arg(long, global = true)]
    pub file_index: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve requirements to Debian dependencies, one per line
    Resolve {
        /// Interpreter version the requirements are for
        #[arg(long, value_parser = parse_version)]
        target_version: Option<Version>,

        /// Requirements such as `foo>=1.0`
        #[arg(required = true)]
        requirements: Vec<String>,
    },

    /// Check override files for broken lines
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Build the dependency fields of one binary package
    Depends(DependsArgs),
}

/// Arguments of the `depends` subcommand
#[derive(Args, Debug, Clone)]
pub struct DependsArgs {
    /// Binary package name
    pub package: String,

    /// JSON file with the scanner's findings for the package
    #[arg(long)]
    pub stats: PathBuf,

    /// Interpreter versions the package supports (e.g., 3.2-, -3.4, 3.1-3.3)
    #[arg(short = 'V', long = "vrange", value_parser = parse_range)]
    pub vrange: Option<VersionRange>,

    /// Add a Depends requirement (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub depends: Vec<String>,

    /// Add a Recommends requirement (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub recommends: Vec<String>,

    /// Add a Suggests requirement (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub suggests: Vec<String>,

    /// Add an Enhances relation verbatim (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub enhances: Vec<String>,

    /// Add a Breaks relation verbatim (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub breaks: Vec<String>,

    /// Do not translate requirement files into Depends
    #[arg(long)]
    pub no_guessing_deps: bool,

    /// Exclude files matching this regex from runtime byte-compilation
    #[arg(short = 'X', long = "exclude", action = ArgAction::Append)]
    pub regexpr: Vec<String>,
}

impl DependsArgs {
    /// Options for the aggregator
    pub fn options(&self) -> DependencyOptions {
        DependencyOptions {
            vrange: self.vrange,
            depends: self.depends.clone(),
            recommends: self.recommends.clone(),
            suggests: self.suggests.clone(),
            enhances: self.enhances.clone(),
            breaks: self.breaks.clone(),
            guess_deps: !self.no_guessing_deps,
            regexpr: self.regexpr.clone(),
        }
    }
}

impl CliArgs {
    /// Default log filter directive for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
