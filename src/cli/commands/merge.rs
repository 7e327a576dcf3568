use anyhow::{Ok, Result};

use super::super::args::MergeFinalCommand;
use super::helper::{finish, workspace};
use super::{CommandResult, CommandSummary};
use crate::ops::merge::merge_final;

pub fn merge(cmd: MergeFinalCommand) -> Result<CommandResult> {
    let ws = workspace(&cmd.args.common)?;
    let summary = merge_final(&ws)?;
    let skipped = summary.skipped.len();

    Ok(finish(CommandSummary::Merge(summary), 0, skipped, false))
}
