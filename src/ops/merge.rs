//! Final-layer merge: rebuild the shipped tree as upstream overlaid with custom.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{Skipped, skip_or_fail};
use crate::{
    core::{Catalog, KeyAction, Precedence, Workspace, locale_path::mentions_locale, tree},
    error::{LayerError, Result},
};

#[derive(Debug, Default)]
pub struct MergeSummary {
    /// Files copied from upstream into the fresh final tree.
    pub upstream_files: usize,
    /// Custom catalogs copied in because final had no file at that path.
    pub copied: usize,
    /// Final catalogs that took at least one custom key or value.
    pub merged: usize,
    /// Final catalogs the custom overlay left as they were.
    pub unchanged: usize,
    /// Custom catalogs under an excluded pseudo-locale.
    pub excluded: usize,
    /// Final catalogs that failed to parse and were replaced by the custom file.
    pub fallbacks: usize,
    pub skipped: Vec<Skipped>,
}

/// Delete the final layer and rebuild it from upstream plus the custom overlay.
pub fn merge_final(ws: &Workspace) -> Result<MergeSummary> {
    Workspace::require_dir("upstream", &ws.upstream)?;
    Workspace::require_dir("custom", &ws.custom)?;
    check_layout(ws)?;

    let mut summary = MergeSummary::default();

    tree::remove_tree(&ws.final_dir)?;
    summary.upstream_files = tree::copy_tree(&ws.upstream, &ws.final_dir)?;
    info!(
        "copied {} upstream files to {}",
        summary.upstream_files,
        ws.display_path(&ws.final_dir).display()
    );

    let scan = tree::catalog_files(ws, &ws.custom);
    for rel_path in &scan.files {
        if let Some(locale) = ws
            .excluded_locales
            .iter()
            .find(|locale| mentions_locale(rel_path, locale))
        {
            debug!("{}: excluded locale {locale}, keeping upstream", rel_path.display());
            summary.excluded += 1;
            continue;
        }
        overlay_file(ws, rel_path, &mut summary)?;
    }
    Ok(summary)
}

fn overlay_file(ws: &Workspace, rel_path: &Path, summary: &mut MergeSummary) -> Result<()> {
    let custom_path = ws.custom.join(rel_path);
    let final_path = ws.final_dir.join(rel_path);

    if !final_path.exists() {
        tree::copy_file(&custom_path, &final_path)?;
        info!("{}: copied from custom", rel_path.display());
        summary.copied += 1;
        return Ok(());
    }

    let custom = match Catalog::load(&custom_path) {
        Ok(catalog) => catalog,
        Err(err) => return skip_or_fail(&mut summary.skipped, &custom_path, err),
    };
    let mut merged = match Catalog::load(&final_path) {
        Ok(catalog) => catalog,
        Err(err) if err.is_recoverable() => {
            warn!("{}: {err}; using the custom file as-is", rel_path.display());
            tree::copy_file(&custom_path, &final_path)?;
            summary.fallbacks += 1;
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let mut added = 0;
    let mut updated = 0;
    for entry in custom.live_entries() {
        match merged.overlay(entry, Precedence::Incoming) {
            KeyAction::Added => added += 1,
            KeyAction::Updated => updated += 1,
            KeyAction::Unchanged => {}
        }
    }

    if added + updated == 0 {
        debug!("{}: nothing to overlay", rel_path.display());
        summary.unchanged += 1;
        return Ok(());
    }
    merged.save()?;
    info!("{}: merged (+{added} keys, {updated} values)", rel_path.display());
    summary.merged += 1;
    Ok(())
}

/// The final layer is deleted on every run, so it must not overlap an input.
fn check_layout(ws: &Workspace) -> Result<()> {
    for (role, input) in [("upstream", &ws.upstream), ("custom", &ws.custom)] {
        if tree::is_within(&ws.final_dir, input) || tree::is_within(input, &ws.final_dir) {
            return Err(LayerError::InvalidLayout {
                reason: format!(
                    "final directory '{}' overlaps the {role} directory '{}'",
                    ws.final_dir.display(),
                    input.display()
                ),
            });
        }
    }
    Ok(())
}
