//! Archive creation from a staging directory.
//!
//! [`StagingWalker`] yields the tree in a fixed order, [`header`]
//! normalizes ownership and permissions, and [`archive`] streams the
//! entries through the selected [`Codec`](crate::Codec).

pub mod archive;
pub mod config;
pub mod creator;
pub mod header;
pub mod report;
pub mod walker;

// Re-exports for public API
pub use archive::build;
pub use archive::build_with_config;
pub use archive::write_archive;
pub use config::BuildConfig;
pub use creator::ArchiveBuilder;
pub use report::BuildReport;
pub use walker::EntryKind;
pub use walker::StagedEntry;
pub use walker::StagingWalker;
