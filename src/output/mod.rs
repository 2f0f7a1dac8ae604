//! Output formatting for resolution and aggregation results
//!
//! This module provides:
//! - Substvars-style text output, one `field=value, value` line per field
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::MemorySink;
use serde::Serialize;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Substvars-style text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

impl OutputFormat {
    /// Create the format from CLI arguments
    pub fn from_cli(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Outcome of resolving one requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// Requirement as given
    pub requirement: String,
    /// Debian dependency, `None` when the requirement is ignored
    pub dependency: Option<String>,
}

impl Resolved {
    pub fn new(requirement: impl Into<String>, dependency: Option<String>) -> Self {
        Self {
            requirement: requirement.into(),
            dependency,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write everything one package emitted into `sink`
    fn format_substvars(
        &self,
        package: &str,
        sink: &MemorySink,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format and write requirement resolutions
    fn format_resolved(&self, resolved: &[Resolved], writer: &mut dyn Write)
        -> std::io::Result<()>;
}

/// Create an output formatter; `prefix` names the substvar namespace
pub fn create_formatter(format: OutputFormat, prefix: &str) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(prefix)),
        OutputFormat::Json => Box::new(JsonFormatter::new(prefix)),
    }
}
