//! File-tree helpers: catalog walking, recursive copy and removal.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::warn;
use walkdir::WalkDir;

use super::{catalog::is_catalog_file, workspace::Workspace};
use crate::error::{LayerError, Result};

/// Result of walking a layer for catalog files.
#[derive(Debug, Default)]
pub struct TreeScan {
    /// Paths relative to the walked root, in sorted order.
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

/// Every `.po` / `.json` file under `root`, minus `ignores` matches.
pub fn catalog_files(ws: &Workspace, root: &Path) -> TreeScan {
    let mut scan = TreeScan::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .map(|rel| rel.as_os_str().is_empty() || !ws.is_ignored(rel))
                .unwrap_or(true)
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                scan.skipped_count += 1;
                warn!("cannot access path: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_catalog_file(entry.path()) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            scan.files.push(rel.to_path_buf());
        }
    }
    scan
}

/// Copy `from` to `to` byte for byte, creating parent directories.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(LayerError::io(parent))?;
    }
    fs::copy(from, to).map_err(LayerError::io(from))?;
    Ok(())
}

/// True if both files exist and hold the same bytes.
pub fn same_content(a: &Path, b: &Path) -> bool {
    match (fs::read(a), fs::read(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Recursively copy the directory `from` into `to`. Returns the number of
/// files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    fs::create_dir_all(to).map_err(LayerError::io(to))?;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            LayerError::Io {
                path,
                source: e.into(),
            }
        })?;
        let Ok(rel) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(LayerError::io(&target))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(LayerError::io(entry.path()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Remove a directory tree if it exists.
pub fn remove_tree(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(LayerError::io(path))?;
    }
    Ok(())
}

/// True if `inner` equals `outer` or lies beneath it.
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    let canonical = |p: &Path| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    canonical(inner).starts_with(canonical(outer))
}
