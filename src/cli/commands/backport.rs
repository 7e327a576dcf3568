use std::fs;

use anyhow::{Context, Ok, Result};

use super::super::{args::BackportCommand, report::backport_report_text};
use super::helper::{finish, workspace};
use super::{CommandResult, CommandSummary};
use crate::ops::backport::backport as run_backport;

pub fn backport(cmd: BackportCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ws = workspace(&args.common)?;
    let prefix = args.prefix.as_deref().unwrap_or(&ws.backport_prefix);

    let summary = run_backport(&ws, &args.old_locale_dir, prefix)?;

    if let Some(path) = &args.report {
        fs::write(path, backport_report_text(&summary))
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }

    let skipped = summary.skipped.len();
    Ok(finish(CommandSummary::Backport(summary), 0, skipped, false))
}
