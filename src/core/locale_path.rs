//! Locale placeholders in layer paths.
//!
//! Source catalogs follow one of three layouts:
//!
//! - `<repo>/.../locale/<src>/LC_MESSAGES/django.po` (locale is a directory)
//! - `<repo>/.../i18n/messages/<src>.json` (locale is the file stem)
//! - `<repo>/.../i18n/transifex_input.json` (per-locale files live in the
//!   sibling `messages/` directory)
//!
//! A [`LocaleTemplate`] captures where the locale goes so per-locale paths can
//! be rendered without searching for literal directory names.

use std::path::{Component, Path, PathBuf};

use crate::error::{LayerError, Result};

/// Directory that holds one subdirectory per locale.
pub const LOCALE_DIR: &str = "locale";
/// Directory that holds one `<locale>.json` file per locale.
pub const MESSAGES_DIR: &str = "messages";
/// Source-strings file of JSON (MFE) repositories.
pub const JSON_SOURCE_FILE: &str = "transifex_input.json";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// `prefix/<locale>/suffix`
    Directory { suffix: PathBuf },
    /// `prefix/<locale>.<ext>`
    FileStem { extension: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTemplate {
    source: PathBuf,
    prefix: PathBuf,
    slot: Slot,
}

impl LocaleTemplate {
    /// Build the template for a source-locale catalog path.
    ///
    /// Fails with [`LayerError::PathResolution`] if the path follows none of
    /// the known layouts.
    pub fn for_source(rel_path: &Path, source_locale: &str) -> Result<Self> {
        let parts = components(rel_path)?;
        let source = rel_path.to_path_buf();
        let file_name = parts.last().map(String::as_str).unwrap_or_default();
        let parent = rel_path.parent().unwrap_or(Path::new("")).to_path_buf();

        if file_name == JSON_SOURCE_FILE {
            return Ok(Self {
                source,
                prefix: parent.join(MESSAGES_DIR),
                slot: Slot::FileStem {
                    extension: "json".to_string(),
                },
            });
        }

        if file_name == format!("{source_locale}.json")
            && parent.file_name().and_then(|n| n.to_str()) == Some(MESSAGES_DIR)
        {
            return Ok(Self {
                source,
                prefix: parent,
                slot: Slot::FileStem {
                    extension: "json".to_string(),
                },
            });
        }

        let slot = (1..parts.len().saturating_sub(1))
            .find(|&i| parts[i] == source_locale && parts[i - 1] == LOCALE_DIR);
        if let Some(i) = slot {
            return Ok(Self {
                source,
                prefix: parts[..i].iter().collect(),
                slot: Slot::Directory {
                    suffix: parts[i + 1..].iter().collect(),
                },
            });
        }

        Err(LayerError::path_resolution(
            rel_path,
            format!(
                "no '{LOCALE_DIR}/{source_locale}' segment, '{MESSAGES_DIR}/{source_locale}.json' file or '{JSON_SOURCE_FILE}' found"
            ),
        ))
    }

    /// The source path this template was built from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Substitute `locale` into the template.
    pub fn render(&self, locale: &str) -> Result<PathBuf> {
        if locale.is_empty()
            || locale == "."
            || locale == ".."
            || locale.contains(['/', '\\'])
        {
            return Err(LayerError::path_resolution(
                &self.source,
                format!("'{locale}' is not a usable locale code"),
            ));
        }
        Ok(match &self.slot {
            Slot::Directory { suffix } => self.prefix.join(locale).join(suffix),
            Slot::FileStem { extension } => self.prefix.join(format!("{locale}.{extension}")),
        })
    }
}

/// The locale a layer path encodes, if any.
///
/// Recognises `.../locale/<code>/...` directories and `.../messages/<code>.json`
/// files.
pub fn locale_of(rel_path: &Path) -> Option<String> {
    let parts = components(rel_path).ok()?;
    let dir_count = parts.len().saturating_sub(1);
    if let Some(i) = (1..dir_count).find(|&i| parts[i - 1] == LOCALE_DIR) {
        return Some(parts[i].clone());
    }

    let parent = rel_path.parent()?.file_name()?.to_str()?;
    if parent == MESSAGES_DIR && rel_path.extension().and_then(|e| e.to_str()) == Some("json") {
        return rel_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(String::from);
    }
    None
}

/// True if any directory segment of the path, or the stem of a JSON file,
/// equals `locale`.
pub fn mentions_locale(rel_path: &Path, locale: &str) -> bool {
    let Ok(parts) = components(rel_path) else {
        return false;
    };
    let dirs = &parts[..parts.len().saturating_sub(1)];
    if dirs.iter().any(|d| d == locale) {
        return true;
    }
    rel_path.extension().and_then(|e| e.to_str()) == Some("json")
        && rel_path.file_stem().and_then(|s| s.to_str()) == Some(locale)
}

/// True if the path is a source-locale catalog under one of the known layouts.
pub fn is_source_catalog(rel_path: &Path, source_locale: &str) -> bool {
    match rel_path.extension().and_then(|e| e.to_str()) {
        Some("po") => locale_of(rel_path).as_deref() == Some(source_locale),
        Some("json") => LocaleTemplate::for_source(rel_path, source_locale).is_ok(),
        _ => false,
    }
}

fn components(path: &Path) -> Result<Vec<String>> {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .map(|c| {
            c.as_os_str().to_str().map(String::from).ok_or_else(|| {
                LayerError::path_resolution(path, "path is not valid UTF-8")
            })
        })
        .collect()
}
