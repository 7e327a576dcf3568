use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::super::args::CommonArgs;
use super::{CommandResult, CommandSummary};
use crate::{config::load_config, core::Workspace};

/// Load the config found from the root, apply command-line overrides and
/// resolve the layer directories.
///
/// Relative layer directories resolve against the directory holding the
/// config file, or the root when no file was found.
pub fn workspace(common: &CommonArgs) -> Result<Workspace> {
    let root = match &common.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to read the current directory")?,
    };

    let loaded = load_config(&root)?;
    let base: PathBuf = match &loaded.path {
        Some(path) => {
            debug!("using config {}", path.display());
            path.parent().map(PathBuf::from).unwrap_or_else(|| root.clone())
        }
        None => {
            debug!("no config file found, using defaults");
            root.clone()
        }
    };

    let mut config = loaded.config;
    if let Some(dir) = &common.upstream_dir {
        config.upstream_dir = dir.clone();
    }
    if let Some(dir) = &common.custom_dir {
        config.custom_dir = dir.clone();
    }
    if let Some(dir) = &common.final_dir {
        config.final_dir = dir.clone();
    }
    if let Some(locale) = &common.source_locale {
        config.source_locale = locale.clone();
    }
    config.validate()?;

    Ok(Workspace::from_config(&base, &config)?)
}

pub fn finish(
    summary: CommandSummary,
    error_count: usize,
    warning_count: usize,
    exit_on_errors: bool,
) -> CommandResult {
    CommandResult {
        summary,
        error_count,
        warning_count,
        exit_on_errors,
    }
}
