//! Error taxonomy for the layer engine.
//!
//! Operations distinguish between errors that only invalidate a single file or
//! language (see [`LayerError::is_recoverable`]) and errors that must stop the
//! whole run.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayerError {
    /// A gettext catalog or JSON map could not be parsed.
    #[error("malformed catalog {}: {reason}", path.display())]
    MalformedCatalog { path: PathBuf, reason: String },

    /// The file extension is neither `.po` nor `.json`.
    #[error("unsupported catalog format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A locale could not be substituted into a layer path.
    #[error("cannot resolve locale path for {}: {reason}", path.display())]
    PathResolution { path: PathBuf, reason: String },

    /// The external syntax checker could not be run or exited non-zero.
    #[error("external tool '{program}' failed: {reason}")]
    ExternalTool { program: String, reason: String },

    /// A required layer root does not exist.
    #[error("{role} directory '{}' does not exist", path.display())]
    MissingRoot { role: &'static str, path: PathBuf },

    /// The configured layer layout cannot be used (e.g. overlapping roots).
    #[error("invalid layer layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LayerError>;

impl LayerError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedCatalog {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn path_resolution(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PathResolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Errors that only skip one file or one language; the tree walk goes on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedCatalog { .. } | Self::UnsupportedFormat { .. } | Self::PathResolution { .. }
        )
    }
}
