//! Resolved, immutable settings shared by every operation.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use glob::Pattern;

use crate::{
    config::Config,
    error::{LayerError, Result},
};

#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub upstream: PathBuf,
    pub custom: PathBuf,
    pub final_dir: PathBuf,
    pub source_locale: String,
    pub excluded_locales: Vec<String>,
    pub locale_aliases: BTreeMap<String, String>,
    /// External syntax checker argv; empty disables it.
    pub checker: Vec<String>,
    pub backport_prefix: String,
    ignores: Vec<Pattern>,
}

impl Workspace {
    pub fn from_config(root: &Path, config: &Config) -> Result<Self> {
        let ignores = config
            .ignores
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| LayerError::InvalidLayout {
                    reason: format!("invalid ignore pattern '{p}': {e}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            upstream: Config::resolve_dir(root, &config.upstream_dir),
            custom: Config::resolve_dir(root, &config.custom_dir),
            final_dir: Config::resolve_dir(root, &config.final_dir),
            source_locale: config.source_locale.clone(),
            excluded_locales: config.excluded_locales.clone(),
            locale_aliases: config.locale_aliases.clone(),
            checker: config.checker.clone(),
            backport_prefix: config.backport_prefix.clone(),
            ignores,
        })
    }

    /// Fail with [`LayerError::MissingRoot`] unless `path` is a directory.
    pub fn require_dir(role: &'static str, path: &Path) -> Result<()> {
        if path.is_dir() {
            Ok(())
        } else {
            Err(LayerError::MissingRoot {
                role,
                path: path.to_path_buf(),
            })
        }
    }

    pub fn is_excluded_locale(&self, locale: &str) -> bool {
        self.excluded_locales.iter().any(|l| l == locale)
    }

    /// True if a path relative to a layer root matches an `ignores` pattern.
    pub fn is_ignored(&self, rel_path: &Path) -> bool {
        self.ignores.iter().any(|p| p.matches_path(rel_path))
    }

    /// Names the path relative to the workspace root when possible.
    pub fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
