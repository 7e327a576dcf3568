use anyhow::{Ok, Result};

use super::super::args::NormalizeCommand;
use super::helper::{finish, workspace};
use super::{CommandResult, CommandSummary};
use crate::ops::normalize::normalize_locales;

pub fn normalize(cmd: NormalizeCommand) -> Result<CommandResult> {
    let ws = workspace(&cmd.args.common)?;
    let summary = normalize_locales(&ws)?;
    let skipped = summary.skipped.len();

    Ok(finish(CommandSummary::Normalize(summary), 0, skipped, false))
}
