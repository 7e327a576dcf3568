use std::{fs, path::Path};

use anyhow::{Ok, Result, bail};

use super::helper::finish;
use super::{CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init() -> Result<CommandResult> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, default_config_json()?)?;

    Ok(finish(
        CommandSummary::Init(InitSummary {
            path: config_path.to_path_buf(),
        }),
        0,
        0,
        true,
    ))
}
