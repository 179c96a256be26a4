//! The build pipeline: walk the staging root, normalize each header and
//! stream the entries through the compression encoder.
//!
//! Writer layering, from the tar builder down to the file:
//!
//! ```text
//! tar::Builder -> Encoder (codec) -> CountingWriter -> BufWriter -> File
//! ```
//!
//! Finalization runs innermost first: tar trailer, compression trailer,
//! file flush and sync, and in atomic mode the rename into place.

use crate::BuildError;
use crate::Result;
use crate::codec::Codec;
use crate::creation::config::BuildConfig;
use crate::creation::header::normalize_mode;
use crate::creation::header::normalized_header;
use crate::creation::report::BuildReport;
use crate::creation::walker::EntryKind;
use crate::creation::walker::StagedEntry;
use crate::creation::walker::StagingWalker;
use crate::error::FinalizeStage;
use crate::io::CountingReader;
use crate::io::CountingWriter;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tar::Builder;
use tar::EntryType as TarEntryType;
use tar::Header;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Builds a compressed archive of `staging_root` at `target` with the
/// default configuration.
///
/// # Examples
///
/// ```no_run
/// let report = stagepack_core::build("dist/pkg.tar.gz", "stage")?;
/// println!("archived {} entries", report.total_entries());
/// # Ok::<(), stagepack_core::BuildError>(())
/// ```
///
/// # Errors
///
/// See [`build_with_config`].
pub fn build<P: AsRef<Path>, Q: AsRef<Path>>(target: P, staging_root: Q) -> Result<BuildReport> {
    build_with_config(target, staging_root, &BuildConfig::default())
}

/// Builds a compressed archive of `staging_root` at `target`.
///
/// An existing file at `target` is replaced. On success `target` holds a
/// complete archive.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The staging root is missing, unreadable or not a directory
/// - The target cannot be created, or lies inside the staging root
/// - Any entry cannot be read or written
/// - Any finalization step fails
pub fn build_with_config<P: AsRef<Path>, Q: AsRef<Path>>(
    target: P,
    staging_root: Q,
    config: &BuildConfig,
) -> Result<BuildReport> {
    let target = target.as_ref();
    let staging_root = staging_root.as_ref();

    config.validate()?;
    check_staging_root(staging_root)?;
    let target_dir = target_directory(target);
    check_target_outside_root(target, target_dir, staging_root)?;

    let codec = config.codec_for(target);
    info!(
        archive = %target.display(),
        staging_root = %staging_root.display(),
        ?codec,
        atomic = config.atomic,
        "building archive"
    );

    let report = if config.atomic {
        build_atomic(target, target_dir, staging_root, codec, config)?
    } else {
        build_in_place(target, staging_root, codec, config)?
    };

    info!(
        archive = %target.display(),
        files = report.files_added,
        directories = report.directories_added,
        symlinks = report.symlinks_added,
        skipped = report.entries_skipped,
        bytes_written = report.bytes_written,
        bytes_compressed = report.bytes_compressed,
        duration = ?report.duration,
        "archive built"
    );
    Ok(report)
}

/// Streams a compressed archive of `staging_root` into `writer`.
///
/// Returns the writer after the compression trailer has been written.
/// The caller is responsible for flushing and closing it. On error the
/// bytes already written may still form a readable archive that lacks
/// the failed entry and everything after it, so discard them.
///
/// # Examples
///
/// ```no_run
/// use stagepack_core::BuildConfig;
/// use stagepack_core::Codec;
/// use stagepack_core::creation::write_archive;
/// use std::path::Path;
///
/// let (bytes, report) = write_archive(
///     Vec::new(),
///     Path::new("stage"),
///     Codec::Zstd,
///     &BuildConfig::default(),
/// )?;
/// assert_eq!(bytes.len() as u64, report.bytes_compressed);
/// # Ok::<(), stagepack_core::BuildError>(())
/// ```
///
/// # Errors
///
/// Same as [`build_with_config`], minus the target checks.
pub fn write_archive<W: Write>(
    writer: W,
    staging_root: &Path,
    codec: Codec,
    config: &BuildConfig,
) -> Result<(W, BuildReport)> {
    config.validate()?;
    check_staging_root(staging_root)?;
    write_entries(writer, staging_root, codec, config)
}

fn build_atomic(
    target: &Path,
    target_dir: &Path,
    staging_root: &Path,
    codec: Codec,
    config: &BuildConfig,
) -> Result<BuildReport> {
    let mut temp = temp_file_in(target_dir).map_err(|source| BuildError::OutputNotWritable {
        path: target.to_path_buf(),
        source,
    })?;

    // Dropping `temp` on any error path removes the partial archive.
    let report = stream_to_file(temp.as_file_mut(), staging_root, codec, config)?;

    temp.persist(target).map_err(|err| BuildError::Finalize {
        stage: FinalizeStage::Persist,
        source: err.error,
    })?;
    Ok(report)
}

fn build_in_place(
    target: &Path,
    staging_root: &Path,
    codec: Codec,
    config: &BuildConfig,
) -> Result<BuildReport> {
    let mut file = File::create(target).map_err(|source| BuildError::OutputNotWritable {
        path: target.to_path_buf(),
        source,
    })?;

    let result = stream_to_file(&mut file, staging_root, codec, config);
    if result.is_err() {
        discard_partial(&file, target);
    }
    result
}

/// Empties a target whose build failed.
///
/// Dropping the tar builder and the encoder writes their trailers, which
/// would leave a well-formed archive missing the remaining entries.
fn discard_partial(file: &File, target: &Path) {
    if let Err(err) = file.set_len(0) {
        warn!(archive = %target.display(), error = %err, "failed to truncate partial archive");
    }
}

fn stream_to_file(
    file: &mut File,
    staging_root: &Path,
    codec: Codec,
    config: &BuildConfig,
) -> Result<BuildReport> {
    let (writer, report) = write_entries(BufWriter::new(file), staging_root, codec, config)?;

    let file = writer.into_inner().map_err(|err| BuildError::Finalize {
        stage: FinalizeStage::File,
        source: err.into_error(),
    })?;
    file.sync_all().map_err(|source| BuildError::Finalize {
        stage: FinalizeStage::File,
        source,
    })?;
    Ok(report)
}

fn write_entries<W: Write>(
    writer: W,
    staging_root: &Path,
    codec: Codec,
    config: &BuildConfig,
) -> Result<(W, BuildReport)> {
    let start = Instant::now();
    let counting = CountingWriter::new(writer);
    let encoder = codec
        .encoder(counting, config.compression_level)
        .map_err(|source| BuildError::Encoder { codec, source })?;

    let mut builder = Builder::new(encoder);
    let mut report = BuildReport::new();

    for entry in StagingWalker::new(staging_root).walk() {
        append_entry(&mut builder, &entry?, config, &mut report)?;
    }

    let encoder = builder.into_inner().map_err(|source| BuildError::Finalize {
        stage: FinalizeStage::Archive,
        source,
    })?;
    let counting = encoder.finish().map_err(|source| BuildError::Finalize {
        stage: FinalizeStage::Compression,
        source,
    })?;

    report.bytes_compressed = counting.total_bytes();
    report.duration = start.elapsed();
    Ok((counting.into_inner(), report))
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &StagedEntry,
    config: &BuildConfig,
    report: &mut BuildReport,
) -> Result<()> {
    let name = entry.display_name();
    let mtime = config.mtime.unwrap_or(entry.mtime);
    let write_error = |source| BuildError::Write {
        name: name.clone(),
        source,
    };

    match &entry.kind {
        EntryKind::Directory => {
            let mut header = normalized_header(TarEntryType::Directory, entry.mode, 0, mtime)
                .map_err(write_error)?;
            builder
                .append_data(&mut header, &entry.name, io::empty())
                .map_err(write_error)?;
            report.directories_added += 1;
        }
        EntryKind::Symlink { target } => {
            let mut header = normalized_header(TarEntryType::Symlink, entry.mode, 0, mtime)
                .map_err(write_error)?;
            builder
                .append_link(&mut header, &entry.name, target)
                .map_err(write_error)?;
            report.symlinks_added += 1;
        }
        EntryKind::File => {
            let mut header =
                normalized_header(TarEntryType::Regular, entry.mode, entry.size, mtime)
                    .map_err(write_error)?;
            if entry.size == 0 {
                builder
                    .append_data(&mut header, &entry.name, io::empty())
                    .map_err(write_error)?;
            } else {
                append_file_content(builder, &mut header, entry, &name)?;
            }
            report.files_added += 1;
            report.bytes_written += entry.size;
        }
        EntryKind::Other => {
            warn!(entry = %name, "skipping entry that is not a file, directory or symlink");
            report.entries_skipped += 1;
            report.add_warning(format!(
                "skipped {name}: not a regular file, directory or symlink"
            ));
            return Ok(());
        }
    }

    debug!(
        entry = %name,
        kind = entry.kind.label(),
        mode = format_args!("{:o}", normalize_mode(entry.mode)),
        size = entry.size,
        "appended entry"
    );
    Ok(())
}

fn append_file_content<W: Write>(
    builder: &mut Builder<W>,
    header: &mut Header,
    entry: &StagedEntry,
    name: &str,
) -> Result<()> {
    let file = File::open(&entry.path).map_err(|source| BuildError::ReadFile {
        path: entry.path.clone(),
        source,
    })?;

    // The header already announces `size` bytes; never stream more.
    let mut reader = CountingReader::new(file).take(entry.size);
    let appended = builder.append_data(header, &entry.name, &mut reader);
    let source = reader.get_ref();

    if let Err(err) = appended {
        return Err(if source.failed() {
            BuildError::ReadFile {
                path: entry.path.clone(),
                source: err,
            }
        } else {
            BuildError::Write {
                name: name.to_string(),
                source: err,
            }
        });
    }

    if source.total_bytes() != entry.size {
        return Err(BuildError::ReadFile {
            path: entry.path.clone(),
            source: io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "file shrank during build: expected {} bytes, read {}",
                    entry.size,
                    source.total_bytes()
                ),
            ),
        });
    }
    Ok(())
}

fn check_staging_root(staging_root: &Path) -> Result<()> {
    let invalid = |source| BuildError::InvalidStagingRoot {
        path: staging_root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(staging_root).map_err(invalid)?;
    if !metadata.is_dir() {
        return Err(BuildError::NotADirectory {
            path: staging_root.to_path_buf(),
        });
    }
    fs::read_dir(staging_root).map_err(invalid)?;
    Ok(())
}

fn target_directory(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn check_target_outside_root(target: &Path, target_dir: &Path, staging_root: &Path) -> Result<()> {
    let target_dir = target_dir
        .canonicalize()
        .map_err(|source| BuildError::OutputNotWritable {
            path: target.to_path_buf(),
            source,
        })?;
    let staging_root = staging_root
        .canonicalize()
        .map_err(|source| BuildError::InvalidStagingRoot {
            path: staging_root.to_path_buf(),
            source,
        })?;

    if target_dir.starts_with(&staging_root) {
        return Err(BuildError::InvalidConfiguration {
            reason: format!(
                "archive {} would be written inside staging root {}",
                target.display(),
                staging_root.display()
            ),
        });
    }
    Ok(())
}

fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".stagepack-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    builder.tempfile_in(dir)
}
