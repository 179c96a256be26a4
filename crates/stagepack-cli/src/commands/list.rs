//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_build_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use stagepack_core::list_entries;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let entries = add_build_context(list_entries(&args.archive), &args.archive)?;

    if args.long {
        formatter.format_entries_long(&entries)
    } else {
        formatter.format_entries_short(&entries)
    }
}
