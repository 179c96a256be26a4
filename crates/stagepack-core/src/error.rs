//! Error types for archive build operations.

use crate::codec::Codec;
use std::fmt;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `BuildError`.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Finalization step that failed after all entries were written.
///
/// Steps run in declaration order; the first failing step aborts the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStage {
    /// Writing the tar end-of-archive marker.
    Archive,
    /// Writing the compression trailer.
    Compression,
    /// Flushing and syncing the output file.
    File,
    /// Renaming the temporary file over the target path.
    Persist,
}

impl fmt::Display for FinalizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Archive => "archive trailer",
            Self::Compression => "compression trailer",
            Self::File => "output file",
            Self::Persist => "rename into place",
        };
        f.write_str(stage)
    }
}

/// Errors that can occur while building an archive.
///
/// Every variant is fatal to the current build; the builder never retries.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Staging root does not exist or cannot be read.
    #[error("cannot access staging root {}: {source}", path.display())]
    InvalidStagingRoot {
        /// The staging root.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Staging root exists but is not a directory.
    #[error("staging root is not a directory: {}", path.display())]
    NotADirectory {
        /// The staging root.
        path: PathBuf,
    },

    /// Output archive cannot be created.
    #[error("cannot create archive {}: {source}", path.display())]
    OutputNotWritable {
        /// The target archive path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Builder was used without a required setting.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is missing or inconsistent.
        reason: String,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level} (expected 1-9)")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// Compression encoder could not be initialized.
    #[error("cannot initialize {codec:?} encoder: {source}")]
    Encoder {
        /// The requested codec.
        codec: Codec,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Directory traversal failed.
    #[error("cannot walk {}: {source}", path.display())]
    Walk {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Symlink target could not be read.
    #[error("cannot read symlink {}: {source}", path.display())]
    ReadLink {
        /// The symlink path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Regular file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        /// The file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing an entry header or its content failed.
    #[error("error writing entry {name:?}: {source}")]
    Write {
        /// Archive name of the entry.
        name: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Finalizing the archive failed.
    #[error("error finalizing {stage}: {source}")]
    Finalize {
        /// Step that failed.
        stage: FinalizeStage,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A walked path does not start with the staging root.
    ///
    /// This indicates a traversal bug, not a runtime condition.
    #[error("walked path {} does not begin with staging root {}", path.display(), root.display())]
    OutsideRoot {
        /// The offending path.
        path: PathBuf,
        /// The staging root.
        root: PathBuf,
    },

    /// Archive could not be read back.
    #[error("invalid archive {}: {source}", path.display())]
    InvalidArchive {
        /// The archive path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl BuildError {
    /// Returns `true` if the error was raised before anything was written.
    ///
    /// # Examples
    ///
    /// ```
    /// use stagepack_core::BuildError;
    /// use std::path::PathBuf;
    ///
    /// let err = BuildError::NotADirectory {
    ///     path: PathBuf::from("stage.txt"),
    /// };
    /// assert!(err.is_input_error());
    ///
    /// let err = BuildError::OutsideRoot {
    ///     path: PathBuf::from("/elsewhere"),
    ///     root: PathBuf::from("/stage"),
    /// };
    /// assert!(!err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidStagingRoot { .. }
                | Self::NotADirectory { .. }
                | Self::OutputNotWritable { .. }
                | Self::InvalidConfiguration { .. }
                | Self::InvalidCompressionLevel { .. }
        )
    }

    /// Returns the filesystem path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InvalidStagingRoot { path, .. }
            | Self::NotADirectory { path }
            | Self::OutputNotWritable { path, .. }
            | Self::Walk { path, .. }
            | Self::ReadLink { path, .. }
            | Self::ReadFile { path, .. }
            | Self::OutsideRoot { path, .. }
            | Self::InvalidArchive { path, .. } => Some(path),
            Self::InvalidConfiguration { .. }
            | Self::InvalidCompressionLevel { .. }
            | Self::Encoder { .. }
            | Self::Write { .. }
            | Self::Finalize { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_staging_root_display() {
        let err = BuildError::InvalidStagingRoot {
            path: PathBuf::from("/no/such/stage"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let display = err.to_string();
        assert!(display.contains("staging root"));
        assert!(display.contains("/no/such/stage"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_write_error_carries_entry_name() {
        let err = BuildError::Write {
            name: "bin/run.sh".into(),
            source: io::Error::new(io::ErrorKind::StorageFull, "disk full"),
        };
        let display = err.to_string();
        assert!(display.contains("bin/run.sh"));
        assert!(display.contains("disk full"));
        assert!(!err.is_input_error());
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_finalize_stage_display() {
        let err = BuildError::Finalize {
            stage: FinalizeStage::Compression,
            source: io::Error::other("broken pipe"),
        };
        assert_eq!(
            err.to_string(),
            "error finalizing compression trailer: broken pipe"
        );
    }

    #[test]
    fn test_outside_root_error() {
        let err = BuildError::OutsideRoot {
            path: PathBuf::from("/tmp/other/file"),
            root: PathBuf::from("/tmp/stage"),
        };
        let display = err.to_string();
        assert!(display.contains("does not begin with staging root"));
        assert_eq!(err.path(), Some(Path::new("/tmp/other/file")));
    }

    #[test]
    fn test_invalid_compression_level_error() {
        let err = BuildError::InvalidCompressionLevel { level: 12 };
        assert!(err.to_string().contains("12"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = BuildError::ReadFile {
            path: PathBuf::from("data.bin"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let source = err.source().and_then(|s| s.downcast_ref::<io::Error>());
        assert_eq!(
            source.map(io::Error::kind),
            Some(io::ErrorKind::PermissionDenied)
        );
    }
}
