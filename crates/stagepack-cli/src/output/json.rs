//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use stagepack_core::BuildReport;
use stagepack_core::inspect::EntryRecord;
use std::io;
use std::io::Write;
use std::path::Path;

pub struct JsonFormatter;

#[derive(Serialize)]
struct BuildOutput {
    output_path: String,
    files_added: usize,
    directories_added: usize,
    symlinks_added: usize,
    entries_skipped: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl BuildOutput {
    fn new(output_path: &Path, report: &BuildReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_added: report.symlinks_added,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    name: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<String>,
}

impl<'a> EntryOutput<'a> {
    fn new(entry: &'a EntryRecord, long: bool) -> Self {
        Self {
            name: &entry.name,
            kind: entry.kind.label(),
            mode: long.then(|| format!("{:04o}", entry.mode)),
            uid: long.then_some(entry.uid),
            gid: long.then_some(entry.gid),
            uname: entry.uname.as_deref().filter(|_| long),
            gname: entry.gname.as_deref().filter(|_| long),
            size: long.then_some(entry.size),
            link_target: entry
                .link_target
                .as_ref()
                .map(|t| t.display().to_string()),
        }
    }
}

#[derive(Serialize)]
struct ListOutput<'a> {
    total_entries: usize,
    entries: Vec<EntryOutput<'a>>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn format_entries(entries: &[EntryRecord], long: bool) -> Result<()> {
        let data = ListOutput {
            total_entries: entries.len(),
            entries: entries.iter().map(|e| EntryOutput::new(e, long)).collect(),
        };
        Self::output(&JsonOutput::success("list", data))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_build_result(&self, output_path: &Path, report: &BuildReport) -> Result<()> {
        let output = JsonOutput::success("build", BuildOutput::new(output_path, report));
        Self::output(&output)
    }

    fn format_entries_short(&self, entries: &[EntryRecord]) -> Result<()> {
        Self::format_entries(entries, false)
    }

    fn format_entries_long(&self, entries: &[EntryRecord]) -> Result<()> {
        Self::format_entries(entries, true)
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
