//! Reading built archives back.
//!
//! Used by `stagepack list` and by tests that check what the builder wrote.
//! The codec is detected from the stream's magic bytes, not the file name.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use crate::BuildError;
use crate::Result;
use crate::codec::Codec;

/// Kind of an archived entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Any other tar entry type.
    Other,
}

impl RecordKind {
    /// Returns a short lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }

    fn from_tar(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Regular | tar::EntryType::Continuous => Self::File,
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Symlink => Self::Symlink,
            _ => Self::Other,
        }
    }
}

/// Header fields of one archived entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Entry name, without a trailing `/`.
    pub name: String,
    /// Entry kind.
    pub kind: RecordKind,
    /// Permission bits.
    pub mode: u32,
    /// Numeric owner.
    pub uid: u64,
    /// Numeric group.
    pub gid: u64,
    /// Owner name, if recorded.
    pub uname: Option<String>,
    /// Group name, if recorded.
    pub gname: Option<String>,
    /// Content length.
    pub size: u64,
    /// Modification time in seconds since the epoch.
    pub mtime: u64,
    /// Symlink target.
    pub link_target: Option<PathBuf>,
}

/// Lists the entries of the compressed tar archive at `path`.
///
/// # Errors
///
/// Returns [`BuildError::InvalidArchive`] if the file cannot be opened, is
/// not compressed with a known codec or is not a valid tar stream.
///
/// # Examples
///
/// ```no_run
/// use stagepack_core::inspect::list_entries;
///
/// for entry in list_entries("dist/pkg.tar.gz")? {
///     println!("{:o} {}", entry.mode, entry.name);
/// }
/// # Ok::<(), stagepack_core::BuildError>(())
/// ```
pub fn list_entries<P: AsRef<Path>>(path: P) -> Result<Vec<EntryRecord>> {
    let path = path.as_ref();
    let invalid = |source| BuildError::InvalidArchive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(invalid)?;
    list_entries_from(BufReader::new(file)).map_err(invalid)
}

/// Lists the entries of a compressed tar stream.
///
/// # Errors
///
/// Returns an error of kind [`io::ErrorKind::InvalidData`] if the stream
/// does not start with a known compression magic, or any error reading the
/// tar headers.
pub fn list_entries_from<R: BufRead>(mut reader: R) -> io::Result<Vec<EntryRecord>> {
    let codec = Codec::from_magic(reader.fill_buf()?).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "unrecognized compression format",
        )
    })?;

    let mut archive = tar::Archive::new(codec.decoder(reader)?);
    let mut records = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let header = entry.header();

        let name = entry.path()?.to_string_lossy().trim_end_matches('/').to_string();
        let link_target = entry.link_name()?.map(std::borrow::Cow::into_owned);

        records.push(EntryRecord {
            name,
            kind: RecordKind::from_tar(header.entry_type()),
            mode: header.mode()?,
            uid: header.uid()?,
            gid: header.gid()?,
            uname: header.username().ok().flatten().map(str::to_owned),
            gname: header.groupname().ok().flatten().map(str::to_owned),
            size: header.size()?,
            mtime: header.mtime()?,
            link_target,
        });
    }
    Ok(records)
}
