//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use stagepack_core::Codec;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stagepack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a compressed tarball from a staging directory
    Build(BuildArgs),
    /// List the entries of a built archive
    List(ListArgs),
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Output archive file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Directory whose contents become the archive
    #[arg(value_name = "STAGING_ROOT")]
    pub staging_root: PathBuf,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Compression codec (gzip, bzip2, xz, zstd); default: from OUTPUT extension
    #[arg(short, long, value_parser = parse_codec)]
    pub codec: Option<Codec>,

    /// Fixed modification time for every entry, in seconds since the epoch
    #[arg(long, value_name = "SECS", env = "SOURCE_DATE_EPOCH")]
    pub mtime: Option<u64>,

    /// Write OUTPUT directly instead of through a temporary file
    #[arg(long)]
    pub in_place: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show mode, owner and size for each entry
    #[arg(short, long)]
    pub long: bool,
}

fn parse_codec(s: &str) -> Result<Codec, String> {
    Codec::from_name(s)
        .ok_or_else(|| format!("unknown codec '{s}' (expected gzip, bzip2, xz or zstd)"))
}
