//! Normalized tar headers.
//!
//! Every entry gets the same owner and one of exactly two permission sets,
//! so the archive does not depend on the umask or the account that built it.

use std::fs::Metadata;
use std::io;
use tar::EntryType as TarEntryType;
use tar::Header;

/// Numeric user id recorded for every entry.
pub const ROOT_UID: u64 = 0;

/// Numeric group id recorded for every entry.
pub const ROOT_GID: u64 = 0;

/// User and group name recorded for every entry.
pub const ROOT_NAME: &str = "root";

/// Permission bits for objects with any executable bit set.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Permission bits for everything else.
pub const DEFAULT_MODE: u32 = 0o644;

const ANY_EXECUTE: u32 = 0o111;

/// Collapses source permission bits to [`EXECUTABLE_MODE`] or
/// [`DEFAULT_MODE`].
///
/// Setuid, setgid, sticky and file type bits in `mode` are ignored.
///
/// # Examples
///
/// ```
/// use stagepack_core::creation::header::normalize_mode;
///
/// assert_eq!(normalize_mode(0o640), 0o644);
/// assert_eq!(normalize_mode(0o600), 0o644);
/// assert_eq!(normalize_mode(0o751), 0o755);
/// assert_eq!(normalize_mode(0o700), 0o755);
/// assert_eq!(normalize_mode(0o4010), 0o755);
/// ```
#[must_use]
pub const fn normalize_mode(mode: u32) -> u32 {
    if mode & ANY_EXECUTE != 0 {
        EXECUTABLE_MODE
    } else {
        DEFAULT_MODE
    }
}

/// Builds a GNU header with normalized mode and ownership.
///
/// The path and checksum are filled in when the entry is appended.
///
/// # Errors
///
/// Returns an error if the owner names do not fit the header.
pub fn normalized_header(
    entry_type: TarEntryType,
    source_mode: u32,
    size: u64,
    mtime: u64,
) -> io::Result<Header> {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(normalize_mode(source_mode));
    header.set_uid(ROOT_UID);
    header.set_gid(ROOT_GID);
    header.set_username(ROOT_NAME)?;
    header.set_groupname(ROOT_NAME)?;
    header.set_size(size);
    header.set_mtime(mtime);
    Ok(header)
}

/// Returns the permission bits of `metadata` as seen by `lstat`.
#[cfg(unix)]
#[must_use]
pub fn source_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

/// Returns an approximation of the permission bits on platforms without
/// Unix modes: directories count as executable.
#[cfg(not(unix))]
#[must_use]
pub fn source_mode(metadata: &Metadata) -> u32 {
    if metadata.is_dir() {
        EXECUTABLE_MODE
    } else {
        DEFAULT_MODE
    }
}

/// Returns the modification time of `metadata` in whole seconds.
#[cfg(unix)]
#[must_use]
pub fn source_mtime(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    // Dates before the epoch clamp to 0.
    u64::try_from(metadata.mtime()).unwrap_or(0)
}

/// Returns the modification time of `metadata` in whole seconds.
#[cfg(not(unix))]
#[must_use]
pub fn source_mtime(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|modified| modified.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |duration| duration.as_secs())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mode_executable_bits() {
        for mode in [0o100, 0o010, 0o001, 0o111, 0o755, 0o751, 0o700, 0o777] {
            assert_eq!(normalize_mode(mode), 0o755, "{mode:o}");
        }
    }

    #[test]
    fn test_normalize_mode_non_executable() {
        for mode in [0o000, 0o600, 0o640, 0o644, 0o666, 0o444, 0o200] {
            assert_eq!(normalize_mode(mode), 0o644, "{mode:o}");
        }
    }

    #[test]
    fn test_normalize_mode_discards_special_bits() {
        assert_eq!(normalize_mode(0o4755), 0o755);
        assert_eq!(normalize_mode(0o2644), 0o644);
        assert_eq!(normalize_mode(0o1777), 0o755);
        // File type bits from st_mode.
        assert_eq!(normalize_mode(0o100_640), 0o644);
        assert_eq!(normalize_mode(0o040_750), 0o755);
        assert_eq!(normalize_mode(0o120_777), 0o755);
    }

    #[test]
    fn test_normalized_header_fields() {
        let header = normalized_header(TarEntryType::Regular, 0o100_600, 11, 1234).unwrap();

        assert_eq!(header.mode().unwrap(), 0o644);
        assert_eq!(header.uid().unwrap(), ROOT_UID);
        assert_eq!(header.gid().unwrap(), ROOT_GID);
        assert_eq!(header.username().unwrap(), Some(ROOT_NAME));
        assert_eq!(header.groupname().unwrap(), Some(ROOT_NAME));
        assert_eq!(header.size().unwrap(), 11);
        assert_eq!(header.mtime().unwrap(), 1234);
        assert_eq!(header.entry_type(), TarEntryType::Regular);
    }

    #[test]
    fn test_normalized_header_directory() {
        let header = normalized_header(TarEntryType::Directory, 0o040_700, 0, 0).unwrap();
        assert_eq!(header.entry_type(), TarEntryType::Directory);
        assert_eq!(header.mode().unwrap(), 0o755);
        assert_eq!(header.size().unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_source_mode_reads_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("tool");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o710)).unwrap();

        let metadata = std::fs::symlink_metadata(&path).unwrap();
        assert_eq!(source_mode(&metadata) & 0o777, 0o710);
        assert_eq!(normalize_mode(source_mode(&metadata)), 0o755);
    }
}
