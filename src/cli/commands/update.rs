use anyhow::{Ok, Result};

use super::super::args::UpdateCustomCommand;
use super::helper::{finish, workspace};
use super::{CommandResult, CommandSummary};
use crate::ops::update::update_custom;

pub fn update(cmd: UpdateCustomCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ws = workspace(&args.common)?;
    let summary = update_custom(&ws, &args.extracted_dir)?;
    let skipped = summary.skipped.len();

    Ok(finish(CommandSummary::Update(summary), 0, skipped, false))
}
