//! JSON output formatter for machine processing

use crate::domain::{Category, MemorySink};
use crate::output::{OutputFormatter, Resolved};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    prefix: String,
}

impl JsonFormatter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// JSON representation of one package's emitted relations
#[derive(Serialize)]
struct JsonPackage<'a> {
    package: &'a str,
    /// Non-empty fields only, in emission order
    substvars: Vec<JsonSubstvar<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rtupdates: Vec<JsonRtupdate<'a>>,
}

#[derive(Serialize)]
struct JsonSubstvar<'a> {
    name: String,
    values: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonRtupdate<'a> {
    location: &'a str,
    args: &'a str,
}

fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format_substvars(
        &self,
        package: &str,
        sink: &MemorySink,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let substvars = Category::all()
            .iter()
            .map(|category| JsonSubstvar {
                name: format!("{}:{}", self.prefix, category.field_name()),
                values: sink.values(package, *category),
            })
            .filter(|substvar| !substvar.values.is_empty())
            .collect();
        let rtupdates = sink
            .rtupdates
            .iter()
            .filter(|(owner, _)| owner == package)
            .map(|(_, update)| JsonRtupdate {
                location: &update.location,
                args: &update.args,
            })
            .collect();

        write_json(
            &JsonPackage {
                package,
                substvars,
                rtupdates,
            },
            writer,
        )
    }

    fn format_resolved(
        &self,
        resolved: &[Resolved],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_json(&resolved, writer)
    }
}
