//! Configuration for archive builds.

use crate::BuildError;
use crate::Result;
use crate::codec::Codec;

/// Configuration for archive builds.
///
/// The defaults reproduce the classic behaviour: a gzip archive written
/// through a temporary file, with source mtimes preserved.
///
/// # Examples
///
/// ```
/// use stagepack_core::BuildConfig;
/// use stagepack_core::Codec;
///
/// let config = BuildConfig::default()
///     .with_codec(Codec::Zstd)
///     .with_compression_level(9)
///     .with_mtime(Some(1_700_000_000));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Codec used when the target extension does not name one.
    ///
    /// Default: `Codec::Gzip`.
    pub codec: Codec,

    /// Pick the codec from the target file extension when it names one.
    ///
    /// Default: `true`.
    pub detect_codec_from_extension: bool,

    /// Compression level (1-9). `None` uses the codec default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Fixed modification time (seconds since the epoch) for every entry.
    ///
    /// `None` keeps each object's own mtime. Pinning it makes two builds of
    /// the same tree byte-identical.
    ///
    /// Default: `None`.
    pub mtime: Option<u64>,

    /// Write through a temporary file in the target directory and rename it
    /// into place on success.
    ///
    /// With `false` the target is written in place and a failed build
    /// truncates it to zero length.
    ///
    /// Default: `true`.
    pub atomic: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Gzip,
            detect_codec_from_extension: true,
            compression_level: Some(6),
            mtime: None,
            atomic: true,
        }
    }
}

impl BuildConfig {
    /// Creates a new `BuildConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback codec.
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Sets whether the target extension selects the codec.
    #[must_use]
    pub fn with_detect_codec_from_extension(mut self, detect: bool) -> Self {
        self.detect_codec_from_extension = detect;
        self
    }

    /// Sets the compression level.
    ///
    /// Out-of-range levels are reported by [`BuildConfig::validate`].
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Pins (or unpins) the entry modification time.
    #[must_use]
    pub fn with_mtime(mut self, mtime: Option<u64>) -> Self {
        self.mtime = mtime;
        self
    }

    /// Sets whether the target is written atomically.
    #[must_use]
    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Returns the codec to use for `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagepack_core::BuildConfig;
    /// use stagepack_core::Codec;
    /// use std::path::Path;
    ///
    /// let config = BuildConfig::default();
    /// assert_eq!(config.codec_for(Path::new("pkg.tar.xz")), Codec::Xz);
    /// assert_eq!(config.codec_for(Path::new("pkg.bin")), Codec::Gzip);
    /// ```
    #[must_use]
    pub fn codec_for(&self, target: &std::path::Path) -> Codec {
        if self.detect_codec_from_extension {
            Codec::from_path(target).unwrap_or(self.codec)
        } else {
            self.codec
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is set but not in 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(BuildError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}
