//! Reproducible compressed tarballs from a staging directory.
//!
//! `stagepack-core` archives the contents of one directory tree into a
//! compressed tar file. Entry order is lexical, ownership is always
//! `root:root` (0:0) and permissions collapse to `0755` or `0644`, so the
//! result depends only on the tree and not on who built it.
//!
//! # Examples
//!
//! ```no_run
//! use stagepack_core::BuildConfig;
//! use stagepack_core::build_with_config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::default().with_mtime(Some(1_700_000_000));
//! let report = build_with_config("dist/pkg.tar.gz", "target/stage", &config)?;
//! println!("Archived {} files", report.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod creation;
pub mod error;
pub mod inspect;
pub mod io;

// Re-export main API types
pub use codec::Codec;
pub use creation::ArchiveBuilder;
pub use creation::BuildConfig;
pub use creation::BuildReport;
pub use creation::build;
pub use creation::build_with_config;
pub use error::BuildError;
pub use error::Result;
pub use inspect::list_entries;
