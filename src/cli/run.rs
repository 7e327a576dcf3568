/// Dispatch the parsed arguments to the command handler.
///
/// # Returns
/// - `Ok(CommandResult)` with the operation summary and exit behavior
/// - `Err` if the run stops (missing layer root, bad config, unrunnable checker)
use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::CommandResult,
    commands::{
        backport::backport, init::init, merge::merge, normalize::normalize, update::update,
        validate::validate,
    },
};

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::UpdateCustom(cmd)) => update(cmd),
        Some(Command::MergeFinal(cmd)) => merge(cmd),
        Some(Command::Validate(cmd)) => validate(cmd),
        Some(Command::Normalize(cmd)) => normalize(cmd),
        Some(Command::Backport(cmd)) => backport(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
