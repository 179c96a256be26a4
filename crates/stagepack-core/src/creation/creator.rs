//! Fluent front end for [`build_with_config`](crate::build_with_config).

use std::path::Path;
use std::path::PathBuf;

use crate::BuildError;
use crate::Result;
use crate::codec::Codec;
use crate::creation::config::BuildConfig;
use crate::creation::report::BuildReport;

/// Builder for one archive build.
///
/// # Examples
///
/// ```no_run
/// use stagepack_core::ArchiveBuilder;
///
/// let report = ArchiveBuilder::new()
///     .output("dist/pkg.tar.zst")
///     .staging_root("target/stage")
///     .compression_level(9)
///     .mtime(1_700_000_000)
///     .build()?;
///
/// println!("archived {} files", report.files_added);
/// # Ok::<(), stagepack_core::BuildError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    output_path: Option<PathBuf>,
    staging_root: Option<PathBuf>,
    config: BuildConfig,
}

impl ArchiveBuilder {
    /// Creates a new `ArchiveBuilder` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive path.
    ///
    /// The codec is picked from the extension unless detection is turned
    /// off in the configuration.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory whose contents are archived.
    #[must_use]
    pub fn staging_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Forces `codec` regardless of the output extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagepack_core::ArchiveBuilder;
    /// use stagepack_core::Codec;
    ///
    /// let builder = ArchiveBuilder::new().output("pkg.bin").codec(Codec::Xz);
    /// ```
    #[must_use]
    pub fn codec(mut self, codec: Codec) -> Self {
        self.config.codec = codec;
        self.config.detect_codec_from_extension = false;
        self
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config.compression_level = Some(level);
        self
    }

    /// Pins every entry's modification time to `mtime` seconds.
    #[must_use]
    pub fn mtime(mut self, mtime: u64) -> Self {
        self.config.mtime = Some(mtime);
        self
    }

    /// Sets whether the archive is written through a temporary file.
    ///
    /// Default: `true`.
    #[must_use]
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.config.atomic = atomic;
        self
    }

    /// Runs the build.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output path not set
    /// - Staging root not set
    /// - Anything [`build_with_config`](crate::build_with_config) rejects
    pub fn build(self) -> Result<BuildReport> {
        let output_path = self
            .output_path
            .ok_or_else(|| BuildError::InvalidConfiguration {
                reason: "output path not set".to_string(),
            })?;
        let staging_root = self
            .staging_root
            .ok_or_else(|| BuildError::InvalidConfiguration {
                reason: "staging root not set".to_string(),
            })?;

        crate::creation::archive::build_with_config(&output_path, &staging_root, &self.config)
    }
}
