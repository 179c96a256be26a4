//! Deterministic traversal of the staging root.
//!
//! Entries come out in lexical file-name order at every directory level,
//! symlinks are reported as symlinks and never descended into, and each
//! entry carries its archive name relative to the root.

use crate::BuildError;
use crate::Result;
use crate::creation::header::source_mode;
use crate::creation::header::source_mtime;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Walks a staging root in a reproducible order.
///
/// The root itself is not yielded: it has no name inside the archive.
///
/// # Examples
///
/// ```no_run
/// use stagepack_core::creation::walker::StagingWalker;
/// use std::path::Path;
///
/// for entry in StagingWalker::new(Path::new("./stage")).walk() {
///     let entry = entry?;
///     println!("{}", entry.name.display());
/// }
/// # Ok::<(), stagepack_core::BuildError>(())
/// ```
pub struct StagingWalker<'a> {
    root: &'a Path,
}

impl<'a> StagingWalker<'a> {
    /// Creates a walker for `root`.
    #[must_use]
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Returns an iterator over the entries below the root.
    ///
    /// # Errors
    ///
    /// Items are errors if a directory cannot be listed, metadata cannot be
    /// read, a symlink target cannot be read, or a walked path lies outside
    /// the root.
    pub fn walk(&self) -> impl Iterator<Item = Result<StagedEntry>> + '_ {
        WalkDir::new(self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .map(move |entry| match entry {
                Ok(entry) => self.staged_entry(&entry),
                Err(err) => Err(self.walk_error(err)),
            })
    }

    fn staged_entry(&self, entry: &walkdir::DirEntry) -> Result<StagedEntry> {
        let path = entry.path();
        let name = archive_name(path, self.root)?;

        let metadata = entry.metadata().map_err(|err| self.walk_error(err))?;

        let file_type = entry.file_type();
        let (kind, size) = if file_type.is_symlink() {
            let target = std::fs::read_link(path).map_err(|source| BuildError::ReadLink {
                path: path.to_path_buf(),
                source,
            })?;
            (EntryKind::Symlink { target }, 0)
        } else if file_type.is_dir() {
            (EntryKind::Directory, 0)
        } else if file_type.is_file() {
            (EntryKind::File, metadata.len())
        } else {
            (EntryKind::Other, 0)
        };

        Ok(StagedEntry {
            path: path.to_path_buf(),
            name,
            kind,
            mode: source_mode(&metadata),
            mtime: source_mtime(&metadata),
            size,
        })
    }

    fn walk_error(&self, err: walkdir::Error) -> BuildError {
        let path = err
            .path()
            .map_or_else(|| self.root.to_path_buf(), Path::to_path_buf);
        let message = err.to_string();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::other(message));
        BuildError::Walk { path, source }
    }
}

/// Computes the archive name of `path`: the path with the `root` prefix and
/// its separator removed.
///
/// # Errors
///
/// Returns [`BuildError::OutsideRoot`] if `path` does not start with `root`
/// or names the root itself.
///
/// # Examples
///
/// ```
/// use stagepack_core::creation::walker::archive_name;
/// use std::path::Path;
///
/// let name = archive_name(Path::new("/stage/bin/run.sh"), Path::new("/stage"))?;
/// assert_eq!(name, Path::new("bin/run.sh"));
///
/// assert!(archive_name(Path::new("/other/file"), Path::new("/stage")).is_err());
/// # Ok::<(), stagepack_core::BuildError>(())
/// ```
pub fn archive_name(path: &Path, root: &Path) -> Result<PathBuf> {
    match path.strip_prefix(root) {
        Ok(name) if !name.as_os_str().is_empty() => Ok(name.to_path_buf()),
        _ => Err(BuildError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        }),
    }
}

/// A filesystem object found below the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// Full filesystem path.
    pub path: PathBuf,

    /// Archive name, relative to the staging root.
    pub name: PathBuf,

    /// Kind of object.
    pub kind: EntryKind,

    /// Raw `lstat` mode bits.
    pub mode: u32,

    /// Modification time in seconds since the epoch.
    pub mtime: u64,

    /// Content length (0 for anything but regular files).
    pub size: u64,
}

impl StagedEntry {
    /// Returns the archive name as a `/`-separated string for messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.to_string_lossy().replace('\\', "/")
    }
}

/// Kind of a staged object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,

    /// Directory.
    Directory,

    /// Symbolic link with its raw target.
    Symlink {
        /// Target exactly as returned by `readlink`.
        target: PathBuf,
    },

    /// FIFO, socket or device node. These are not archived.
    Other,
}

impl EntryKind {
    /// Returns a short lowercase label for logs and listings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink { .. } => "symlink",
            Self::Other => "other",
        }
    }
}
