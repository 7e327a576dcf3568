//! Engine operations over the three layers.
//!
//! Every operation takes an explicit [`Workspace`](crate::core::Workspace),
//! returns a summary for the CLI to report, and logs its per-file decisions
//! through `tracing`.

pub mod backport;
pub mod merge;
pub mod normalize;
pub mod update;
pub mod validate;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{LayerError, Result};

/// A file or language left untouched because of a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Record a recoverable error as a skip; propagate anything else.
pub(crate) fn skip_or_fail(skipped: &mut Vec<Skipped>, path: &Path, err: LayerError) -> Result<()> {
    if !err.is_recoverable() {
        return Err(err);
    }
    warn!("skipping {}: {err}", path.display());
    skipped.push(Skipped {
        path: path.to_path_buf(),
        reason: err.to_string(),
    });
    Ok(())
}
