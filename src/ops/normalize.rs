//! Locale-code normalization in the custom layer.
//!
//! Content stored under a non-canonical code (`locale/pt-br/...`,
//! `messages/zh-hans.json`) is merged into the canonical location and the
//! non-canonical copy is removed. Existing translations at the canonical
//! location always win; the old content only fills gaps.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};
use walkdir::WalkDir;

use super::{Skipped, skip_or_fail};
use crate::{
    core::{
        Catalog, KeyAction, Precedence, Workspace,
        catalog::is_catalog_file,
        locale_path::{LOCALE_DIR, MESSAGES_DIR},
        tree,
    },
    error::{LayerError, Result},
};

#[derive(Debug, Default)]
pub struct NormalizeSummary {
    /// Non-canonical directories and files found.
    pub occurrences: usize,
    pub files_moved: usize,
    pub files_merged: usize,
    pub entries_merged: usize,
    pub removed: usize,
    pub skipped: Vec<Skipped>,
}

/// One non-canonical locale directory or JSON file and its canonical target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Occurrence {
    from: PathBuf,
    to: PathBuf,
    alias: String,
    canonical: String,
}

enum Step {
    Move { from: PathBuf, to: PathBuf },
    Merge { from: Catalog, into: Catalog },
}

pub fn normalize_locales(ws: &Workspace) -> Result<NormalizeSummary> {
    Workspace::require_dir("custom", &ws.custom)?;

    let mut summary = NormalizeSummary::default();
    for occurrence in find_occurrences(ws) {
        summary.occurrences += 1;
        info!(
            "{}: {} -> {}",
            ws.display_path(&occurrence.from).display(),
            occurrence.alias,
            occurrence.canonical
        );
        normalize_occurrence(&occurrence, &mut summary)?;
    }
    Ok(summary)
}

fn find_occurrences(ws: &Workspace) -> Vec<Occurrence> {
    let mut found = Vec::new();
    let walker = WalkDir::new(&ws.custom).min_depth(1).sort_by_file_name();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if ws.is_ignored(path.strip_prefix(&ws.custom).unwrap_or(path)) {
            continue;
        }
        let Some(parent) = path.parent() else {
            continue;
        };
        let parent_name = parent.file_name().and_then(|n| n.to_str());

        let alias = if entry.file_type().is_dir() && parent_name == Some(LOCALE_DIR) {
            path.file_name().and_then(|n| n.to_str())
        } else if entry.file_type().is_file()
            && parent_name == Some(MESSAGES_DIR)
            && path.extension().and_then(|e| e.to_str()) == Some("json")
        {
            path.file_stem().and_then(|s| s.to_str())
        } else {
            None
        };

        let Some((alias, canonical)) =
            alias.and_then(|a| ws.locale_aliases.get_key_value(a))
        else {
            continue;
        };
        let to = if entry.file_type().is_dir() {
            parent.join(canonical)
        } else {
            parent.join(format!("{canonical}.json"))
        };
        found.push(Occurrence {
            from: path.to_path_buf(),
            to,
            alias: alias.clone(),
            canonical: canonical.clone(),
        });
    }
    found
}

/// Plan every file first so a malformed catalog leaves the whole occurrence
/// untouched.
fn normalize_occurrence(occurrence: &Occurrence, summary: &mut NormalizeSummary) -> Result<()> {
    let files: Vec<(PathBuf, PathBuf)> = if occurrence.from.is_dir() {
        WalkDir::new(&occurrence.from)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let rel = e.path().strip_prefix(&occurrence.from).ok()?;
                Some((e.path().to_path_buf(), occurrence.to.join(rel)))
            })
            .collect()
    } else {
        vec![(occurrence.from.clone(), occurrence.to.clone())]
    };

    let mut steps = Vec::with_capacity(files.len());
    for (from, to) in files {
        if !to.exists() {
            steps.push(Step::Move { from, to });
        } else if is_catalog_file(&from) {
            let loaded = Catalog::load(&from).and_then(|old| Ok((old, Catalog::load(&to)?)));
            match loaded {
                Ok((from, into)) => steps.push(Step::Merge { from, into }),
                Err(err) => return skip_or_fail(&mut summary.skipped, &occurrence.from, err),
            }
        } else {
            debug!("{}: already present, keeping it", to.display());
        }
    }

    for step in steps {
        match step {
            Step::Move { from, to } => {
                tree::copy_file(&from, &to)?;
                summary.files_moved += 1;
            }
            Step::Merge { from, mut into } => {
                let merged = from
                    .live_entries()
                    .filter(|entry| into.overlay(entry, Precedence::Existing) != KeyAction::Unchanged)
                    .count();
                if merged > 0 {
                    into.save()?;
                    summary.files_merged += 1;
                    summary.entries_merged += merged;
                    info!("  merged {merged} entries into {}", into.path().display());
                }
            }
        }
    }

    remove(&occurrence.from)?;
    summary.removed += 1;
    Ok(())
}

fn remove(path: &Path) -> Result<()> {
    if path.is_dir() {
        tree::remove_tree(path)
    } else {
        fs::remove_file(path).map_err(LayerError::io(path))
    }
}
