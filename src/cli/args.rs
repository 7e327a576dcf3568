//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `update_custom`: Add new custom strings and locale placeholders to the custom layer
//! - `merge_final`: Rebuild the final layer from upstream plus the custom overlay
//! - `validate`: Check gettext catalogs for syntax and placeholder problems
//! - `normalize`: Fold non-canonical locale codes into their canonical names
//! - `backport`: Carry translations over from legacy catalogs
//! - `init`: Initialize strata configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::UpdateCustom(cmd)) => cmd.args.common.verbose,
            Some(Command::MergeFinal(cmd)) => cmd.args.common.verbose,
            Some(Command::Validate(cmd)) => cmd.args.common.verbose,
            Some(Command::Normalize(cmd)) => cmd.args.common.verbose,
            Some(Command::Backport(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all layer commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Directory the layer paths are resolved from (default: current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Upstream layer directory (overrides config file)
    #[arg(long)]
    pub upstream_dir: Option<String>,

    /// Custom layer directory (overrides config file)
    #[arg(long)]
    pub custom_dir: Option<String>,

    /// Final layer directory (overrides config file)
    #[arg(long)]
    pub final_dir: Option<String>,

    /// Source locale (overrides config file)
    #[arg(long)]
    pub source_locale: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct UpdateCustomArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory holding the freshly extracted source catalogs
    #[arg(long)]
    pub extracted_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateCustomCommand {
    #[command(flatten)]
    pub args: UpdateCustomArgs,
}

#[derive(Debug, Parser)]
pub struct MergeFinalArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct MergeFinalCommand {
    #[command(flatten)]
    pub args: MergeFinalArgs,
}

#[derive(Debug, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-separated directories to check (default: final, custom and upstream layers)
    #[arg(long, value_delimiter = ',')]
    pub dirs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub args: ValidateArgs,
}

#[derive(Debug, Parser)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct NormalizeCommand {
    #[command(flatten)]
    pub args: NormalizeArgs,
}

#[derive(Debug, Parser)]
pub struct BackportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Legacy locale directory holding `<lang>/LC_MESSAGES/*.po`
    pub old_locale_dir: PathBuf,

    /// File name prefix of the legacy catalogs (overrides config file)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Also write the backport report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BackportCommand {
    #[command(flatten)]
    pub args: BackportArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add custom strings and per-locale placeholders from freshly extracted catalogs
    #[command(name = "update_custom", alias = "update-custom")]
    UpdateCustom(UpdateCustomCommand),
    /// Rebuild the final layer as upstream overlaid with the custom layer
    #[command(name = "merge_final", alias = "merge-final")]
    MergeFinal(MergeFinalCommand),
    /// Check gettext catalogs with the external checker and placeholder checks
    Validate(ValidateCommand),
    /// Merge catalogs stored under locale aliases into their canonical locale
    Normalize(NormalizeCommand),
    /// Copy translations from legacy catalogs into the custom layer
    Backport(BackportCommand),
    /// Initialize a new .stratarc.json configuration file
    Init,
}
