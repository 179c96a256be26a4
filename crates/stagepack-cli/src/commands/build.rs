//! Build command implementation

use crate::cli::BuildArgs;
use crate::error::add_build_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use stagepack_core::BuildConfig;
use stagepack_core::build_with_config;

pub fn execute(args: &BuildArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = build_config(args);
    let report = add_build_context(
        build_with_config(&args.output, &args.staging_root, &config),
        &args.output,
    )?;
    formatter.format_build_result(&args.output, &report)
}

fn build_config(args: &BuildArgs) -> BuildConfig {
    let mut config = BuildConfig::default()
        .with_mtime(args.mtime)
        .with_atomic(!args.in_place);

    if let Some(level) = args.compression_level {
        config = config.with_compression_level(level);
    }
    if let Some(codec) = args.codec {
        config = config
            .with_codec(codec)
            .with_detect_codec_from_extension(false);
    }
    config
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::cli::Commands;
    use clap::Parser;
    use stagepack_core::Codec;

    fn args(argv: &[&str]) -> BuildArgs {
        let mut full = vec!["stagepack", "build", "out.tar.gz", "stage"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Build(args) => args,
            Commands::List(_) => panic!("expected build command"),
        }
    }

    #[test]
    fn test_default_config() {
        let mut parsed = args(&[]);
        parsed.mtime = None;
        let config = build_config(&parsed);
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn test_flags_map_onto_config() {
        let config = build_config(&args(&[
            "-l",
            "2",
            "--codec",
            "zstd",
            "--mtime",
            "7",
            "--in-place",
        ]));
        assert_eq!(config.compression_level, Some(2));
        assert_eq!(config.codec, Codec::Zstd);
        assert!(!config.detect_codec_from_extension);
        assert_eq!(config.mtime, Some(7));
        assert!(!config.atomic);
    }
}
