//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use stagepack_core::BuildReport;
use stagepack_core::inspect::EntryRecord;
use stagepack_core::inspect::RecordKind;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut result = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result
    }

    fn long_line(entry: &EntryRecord) -> String {
        let type_char = match entry.kind {
            RecordKind::File => '-',
            RecordKind::Directory => 'd',
            RecordKind::Symlink => 'l',
            RecordKind::Other => '?',
        };
        let owner = format!(
            "{}/{}",
            entry.uname.as_deref().unwrap_or("-"),
            entry.gname.as_deref().unwrap_or("-")
        );
        let mut line = format!(
            "{type_char}{:04o} {owner:<10} {:>10}  {}",
            entry.mode, entry.size, entry.name
        );
        if let Some(target) = &entry.link_target {
            line.push_str(&format!(" -> {}", target.display()));
        }
        line
    }

    fn write_line(&self, line: &str) {
        let _ = self.term.write_line(line);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_build_result(&self, output_path: &Path, report: &BuildReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.write_line(&format!(
                "{} Archive built: {}",
                style("✓").green().bold(),
                output_path.display()
            ));
        } else {
            self.write_line(&format!("Archive built: {}", output_path.display()));
        }

        self.write_line("");
        self.write_line(&format!(
            "  Files:            {}",
            Self::format_number(report.files_added)
        ));
        self.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        self.write_line(&format!(
            "  Symlinks:         {}",
            Self::format_number(report.symlinks_added)
        ));
        self.write_line(&format!(
            "  Content size:     {}",
            Self::format_size(report.bytes_written)
        ));
        self.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.bytes_compressed)
        ));

        if report.entries_skipped > 0 {
            self.write_line(&format!("  Skipped:          {}", report.entries_skipped));
        }

        if self.verbose {
            self.write_line(&format!(
                "  Ratio:            {:.2}",
                report.compression_ratio()
            ));
            self.write_line(&format!("  Duration:         {:?}", report.duration));
        }

        if report.has_warnings() {
            self.write_line("");
            if self.use_colors {
                self.write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                self.write_line("Warnings:");
            }
            for warning in &report.warnings {
                self.write_line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_entries_short(&self, entries: &[EntryRecord]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in entries {
            self.write_line(&entry.name);
        }
        Ok(())
    }

    fn format_entries_long(&self, entries: &[EntryRecord]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in entries {
            self.write_line(&Self::long_line(entry));
        }

        let total: u64 = entries.iter().map(|e| e.size).sum();
        self.write_line("");
        self.write_line(&format!(
            "Total: {} entries, {}",
            Self::format_number(entries.len()),
            Self::format_size(total)
        ));
        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Errors are shown even in quiet mode.
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
