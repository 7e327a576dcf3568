//! Language discovery over the upstream layer.

use std::{collections::BTreeSet, fs, path::Path};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{
    locale_path::{LOCALE_DIR, MESSAGES_DIR},
    workspace::Workspace,
};
use crate::error::{LayerError, Result};

const I18N_DIR: &str = "i18n";

/// Sorted locale codes present anywhere under the upstream layer, minus the
/// source locale and the excluded pseudo-locales.
///
/// Locale roots may sit at any depth inside a repository, so the whole tree is
/// searched for `locale/<code>/` directories and `i18n/messages/<code>.json`
/// files.
pub fn discover_languages(ws: &Workspace) -> Result<Vec<String>> {
    Workspace::require_dir("upstream", &ws.upstream)?;

    let mut found = BTreeSet::new();
    let walker = WalkDir::new(&ws.upstream)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            entry
                .path()
                .strip_prefix(&ws.upstream)
                .map(|rel| !ws.is_ignored(rel))
                .unwrap_or(true)
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("cannot access path: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        match path.file_name().and_then(|n| n.to_str()) {
            Some(LOCALE_DIR) => collect_locale_dirs(path, &mut found)?,
            Some(MESSAGES_DIR) if parent_is(path, I18N_DIR) => {
                collect_message_files(path, &mut found)?
            }
            _ => {}
        }
    }

    found.retain(|locale| *locale != ws.source_locale && !ws.is_excluded_locale(locale));
    debug!("discovered {} languages", found.len());
    Ok(found.into_iter().collect())
}

fn parent_is(path: &Path, name: &str) -> bool {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        == Some(name)
}

fn collect_locale_dirs(dir: &Path, found: &mut BTreeSet<String>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(LayerError::io(dir))? {
        let entry = entry.map_err(LayerError::io(dir))?;
        if entry.path().is_dir()
            && let Some(name) = entry.file_name().to_str()
        {
            found.insert(name.to_string());
        }
    }
    Ok(())
}

fn collect_message_files(dir: &Path, found: &mut BTreeSet<String>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(LayerError::io(dir))? {
        let entry = entry.map_err(LayerError::io(dir))?;
        let path = entry.path();
        if path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some("json")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            found.insert(stem.to_string());
        }
    }
    Ok(())
}
