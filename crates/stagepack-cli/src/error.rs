//! Error conversion utilities for CLI.
//!
//! Converts stagepack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use stagepack_core::BuildError;
use std::path::Path;

/// Converts `BuildError` to user-friendly anyhow error with context
pub fn convert_build_error(err: BuildError, output: &Path) -> anyhow::Error {
    match err {
        BuildError::InvalidStagingRoot { path, source } => {
            anyhow!(
                "Cannot read staging root '{}': {source}\n\
                 HINT: Check that the directory exists and is readable.",
                path.display()
            )
        }
        BuildError::NotADirectory { path } => {
            anyhow!(
                "Staging root '{}' is not a directory\n\
                 HINT: Pass the directory whose contents should be archived.",
                path.display()
            )
        }
        BuildError::OutputNotWritable { path, source } => {
            anyhow!(
                "Cannot create archive '{}': {source}\n\
                 HINT: Check that the parent directory exists and is writable.",
                path.display()
            )
        }
        BuildError::ReadFile { path, source } => {
            anyhow!(
                "Cannot read staged file '{}' while building '{}': {source}\n\
                 HINT: Check file permissions, and that nothing modifies the staging tree during the build.",
                path.display(),
                output.display()
            )
        }
        BuildError::Write { name, source } => {
            anyhow!(
                "Failed writing entry '{name}' to '{}': {source}\n\
                 HINT: Check free space on the output filesystem.",
                output.display()
            )
        }
        BuildError::Finalize { stage, source } => {
            anyhow!(
                "Failed to finish archive '{}' ({stage}): {source}\n\
                 HINT: The output is unusable. Rerun without --in-place to keep the previous file intact.",
                output.display()
            )
        }
        BuildError::InvalidArchive { path, source } => {
            anyhow!(
                "Invalid archive '{}': {source}\n\
                 HINT: Supported formats: tar.gz, tar.bz2, tar.xz, tar.zst",
                path.display()
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error building archive '{}'", output.display())),
    }
}

/// Adds context to a build result
pub fn add_build_context<T>(result: Result<T, BuildError>, output: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_build_error(e, output))
}
