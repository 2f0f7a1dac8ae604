//! Substvars-style text output
//!
//! ```text
//! python3:Depends=python3 (>= 3.1), python3-bar
//! rtupdate: /usr/share/foo -V 3.1-3.2
//! ```

use crate::domain::{Category, MemorySink};
use crate::output::{OutputFormatter, Resolved};
use std::io::Write;

/// Text formatter writing debhelper substvars lines
pub struct TextFormatter {
    /// Substvar namespace, `python3` gives `python3:Depends`
    prefix: String,
}

impl TextFormatter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn substvar_name(&self, category: Category) -> String {
        format!("{}:{}", self.prefix, category.field_name())
    }
}

impl OutputFormatter for TextFormatter {
    fn format_substvars(
        &self,
        package: &str,
        sink: &MemorySink,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for category in Category::all() {
            let values = sink.values(package, *category);
            if values.is_empty() {
                continue;
            }
            writeln!(writer, "{}={}", self.substvar_name(*category), values.join(", "))?;
        }
        for (owner, update) in &sink.rtupdates {
            if owner != package {
                continue;
            }
            if update.args.is_empty() {
                writeln!(writer, "rtupdate: {}", update.location)?;
            } else {
                writeln!(writer, "rtupdate: {} {}", update.location, update.args)?;
            }
        }
        Ok(())
    }

    fn format_resolved(
        &self,
        resolved: &[Resolved],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        // ignored requirements keep their line so output lines up with input
        for item in resolved {
            writeln!(writer, "{}", item.dependency.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }
}
