//! Build operation reporting.

use std::time::Duration;

/// Report of a successful archive build.
///
/// # Examples
///
/// ```
/// use stagepack_core::BuildReport;
///
/// let mut report = BuildReport::default();
/// report.files_added = 3;
/// report.directories_added = 1;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 256;
///
/// assert_eq!(report.total_entries(), 4);
/// assert_eq!(report.compression_ratio(), 4.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Number of regular files archived.
    pub files_added: usize,

    /// Number of directories archived.
    pub directories_added: usize,

    /// Number of symlinks archived.
    pub symlinks_added: usize,

    /// Number of objects left out (FIFOs, sockets, devices).
    pub entries_skipped: usize,

    /// Content bytes written into entry bodies (uncompressed).
    pub bytes_written: u64,

    /// Size of the compressed archive.
    pub bytes_compressed: u64,

    /// Duration of the build.
    pub duration: Duration,

    /// Warnings generated during the build.
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of entries in the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }
}
