//! Backport of translations from legacy `<prefix>*.po` catalogs into the
//! custom layer.
//!
//! Old translations are matched by source text: gettext catalogs by msgid,
//! JSON message files through the source string recorded for each key in the
//! sibling `transifex_input.json`.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use super::{Skipped, skip_or_fail};
use crate::{
    core::{
        Catalog, CatalogFormat, LocaleTemplate, StringEntry, Workspace,
        locale_path::{JSON_SOURCE_FILE, is_source_catalog, locale_of},
        tree,
    },
    error::{LayerError, Result},
};

/// Unmatched strings listed per language.
pub const NOT_FOUND_LIMIT: usize = 50;

#[derive(Debug, Default)]
pub struct LanguageBackport {
    pub lang: String,
    pub found: usize,
    pub migrated: usize,
    /// `(msgid, translation)` pairs no custom catalog knows.
    pub not_found: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct BackportSummary {
    pub old_locale_dir: PathBuf,
    pub languages: Vec<LanguageBackport>,
    pub files_updated: usize,
    pub placeholders_created: usize,
    pub skipped: Vec<Skipped>,
}

impl BackportSummary {
    pub fn strings_found(&self) -> usize {
        self.languages.iter().map(|l| l.found).sum()
    }

    pub fn strings_migrated(&self) -> usize {
        self.languages.iter().map(|l| l.migrated).sum()
    }

    pub fn strings_not_found(&self) -> usize {
        self.languages.iter().map(|l| l.not_found.len()).sum()
    }
}

/// Translations of one language, keyed by msgid.
type Translations = BTreeMap<String, String>;

pub fn backport(ws: &Workspace, old_locale_dir: &Path, prefix: &str) -> Result<BackportSummary> {
    Workspace::require_dir("old locale", old_locale_dir)?;
    Workspace::require_dir("custom", &ws.custom)?;

    let mut summary = BackportSummary {
        old_locale_dir: old_locale_dir.to_path_buf(),
        ..Default::default()
    };

    let old = read_old_translations(old_locale_dir, prefix, &mut summary.skipped)?;
    let custom_files = tree::catalog_files(ws, &ws.custom).files;
    let sources: Vec<&PathBuf> = custom_files
        .iter()
        .filter(|rel| is_source_catalog(rel, &ws.source_locale))
        .collect();

    for (lang, translations) in &old {
        if translations.is_empty() {
            continue;
        }
        info!("{lang}: {} old translations", translations.len());

        summary.placeholders_created += ensure_placeholders(ws, &sources, lang, &mut summary.skipped)?;

        // Placeholders may have just been created, so list files again.
        let lang_files: Vec<PathBuf> = tree::catalog_files(ws, &ws.custom)
            .files
            .into_iter()
            .filter(|rel| locale_of(rel).as_deref() == Some(lang.as_str()))
            .collect();

        let mut matched = BTreeSet::new();
        for rel in &lang_files {
            if apply_to_file(ws, rel, translations, &mut matched, &mut summary.skipped)? {
                summary.files_updated += 1;
            }
        }

        let not_found: Vec<(String, String)> = translations
            .iter()
            .filter(|(msgid, _)| !matched.contains(*msgid))
            .map(|(msgid, msgstr)| (msgid.clone(), msgstr.clone()))
            .collect();
        info!(
            "{lang}: migrated {}, not found {}",
            matched.len(),
            not_found.len()
        );
        summary.languages.push(LanguageBackport {
            lang: lang.clone(),
            found: translations.len(),
            migrated: matched.len(),
            not_found,
        });
    }
    Ok(summary)
}

/// Non-empty translations from `<lang>/LC_MESSAGES/<prefix>*.po`; later files
/// win on duplicate msgids.
fn read_old_translations(
    old_locale_dir: &Path,
    prefix: &str,
    skipped: &mut Vec<Skipped>,
) -> Result<BTreeMap<String, Translations>> {
    let mut result = BTreeMap::new();
    for lang_dir in sorted_children(old_locale_dir)? {
        let messages = lang_dir.join("LC_MESSAGES");
        let Some(lang) = lang_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !messages.is_dir() {
            continue;
        }

        let mut translations = Translations::new();
        for file in sorted_children(&messages)? {
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if !name.starts_with(prefix) || !name.ends_with(".po") {
                continue;
            }
            let catalog = match Catalog::load(&file) {
                Ok(catalog) => catalog,
                Err(err) => {
                    skip_or_fail(skipped, &file, err)?;
                    continue;
                }
            };
            let before = translations.len();
            for entry in catalog.live_entries().filter(|e| e.plural.is_none() && !e.value.is_empty()) {
                translations.insert(entry.key.clone(), entry.value.clone());
            }
            debug!("{}: {} translations", file.display(), translations.len() - before);
        }
        result.insert(lang.to_string(), translations);
    }
    Ok(result)
}

fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)
        .map_err(LayerError::io(dir))?
        .map(|entry| entry.map(|e| e.path()).map_err(LayerError::io(dir)))
        .collect::<Result<Vec<_>>>()?;
    children.sort();
    Ok(children)
}

/// Create the `lang` catalog next to every custom source catalog that lacks
/// one. Returns the number of files created.
fn ensure_placeholders(
    ws: &Workspace,
    sources: &[&PathBuf],
    lang: &str,
    skipped: &mut Vec<Skipped>,
) -> Result<usize> {
    let mut created = 0;
    for rel in sources {
        let target = match LocaleTemplate::for_source(rel, &ws.source_locale).and_then(|t| t.render(lang)) {
            Ok(path) => ws.custom.join(path),
            Err(err) => {
                skip_or_fail(skipped, rel, err)?;
                continue;
            }
        };
        if target.exists() {
            continue;
        }
        let source = match Catalog::load(&ws.custom.join(rel)) {
            Ok(catalog) => catalog,
            Err(err) => {
                skip_or_fail(skipped, rel, err)?;
                continue;
            }
        };
        let mut placeholder = source.blank_for_locale(&target, lang);
        for entry in source.live_entries() {
            placeholder.push(entry.placeholder());
        }
        placeholder.save()?;
        created += 1;
    }
    if created > 0 {
        info!("{lang}: created {created} placeholder files");
    }
    Ok(created)
}

/// Apply old translations to one custom catalog; loaded and saved at most
/// once. Returns `true` if the file changed.
fn apply_to_file(
    ws: &Workspace,
    rel: &Path,
    translations: &Translations,
    matched: &mut BTreeSet<String>,
    skipped: &mut Vec<Skipped>,
) -> Result<bool> {
    let path = ws.custom.join(rel);
    let mut catalog = match Catalog::load(&path) {
        Ok(catalog) => catalog,
        Err(err) => {
            skip_or_fail(skipped, &path, err)?;
            return Ok(false);
        }
    };

    // (entry id, msgid it matched)
    let targets: Vec<(String, &String)> = match catalog.format() {
        CatalogFormat::Po(_) => catalog
            .live_entries()
            .filter(|e| e.plural.is_none())
            .filter_map(|e| translations.get_key_value(&e.key).map(|(msgid, _)| (e.id(), msgid)))
            .collect(),
        CatalogFormat::Json(_) => {
            let Some(source_strings) = json_source_strings(&path, skipped)? else {
                return Ok(false);
            };
            catalog
                .live_entries()
                .filter_map(|e| {
                    let msgid = source_strings.get(&e.key)?;
                    translations
                        .get_key_value(msgid)
                        .map(|(msgid, _)| (e.id(), msgid))
                })
                .collect()
        }
    };

    let mut changed = 0;
    for (id, msgid) in targets {
        matched.insert(msgid.clone());
        if catalog.set_translation(&id, &translations[msgid]) {
            changed += 1;
        }
    }
    if changed == 0 {
        return Ok(false);
    }
    catalog.save()?;
    info!("  {}: {changed} translations", rel.display());
    Ok(true)
}

/// Key to source string, from the `transifex_input.json` beside the
/// `messages/` directory holding `lang_file`.
fn json_source_strings(
    lang_file: &Path,
    skipped: &mut Vec<Skipped>,
) -> Result<Option<HashMap<String, String>>> {
    let Some(i18n) = lang_file.parent().and_then(Path::parent) else {
        return Ok(None);
    };
    let source_path = i18n.join(JSON_SOURCE_FILE);
    if !source_path.is_file() {
        debug!("{}: no {JSON_SOURCE_FILE} beside it", lang_file.display());
        return Ok(None);
    }
    match Catalog::load(&source_path) {
        Ok(source) => Ok(Some(
            source
                .entries()
                .map(|e: &StringEntry| (e.key.clone(), e.value.clone()))
                .collect(),
        )),
        Err(err) => {
            skip_or_fail(skipped, &source_path, err)?;
            Ok(None)
        }
    }
}
