use anyhow::{Ok, Result};

use super::super::args::ValidateCommand;
use super::helper::{finish, workspace};
use super::{CommandResult, CommandSummary};
use crate::ops::validate::{default_dirs, validate_dirs};

pub fn validate(cmd: ValidateCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ws = workspace(&args.common)?;
    let dirs = if args.dirs.is_empty() {
        default_dirs(&ws)
    } else {
        args.dirs.clone()
    };

    let summary = validate_dirs(&ws, &dirs)?;
    let invalid = summary.invalid().count();
    let missing = summary.missing_dirs.len();

    Ok(finish(CommandSummary::Validate(summary), invalid, missing, true))
}
