//! Custom-layer update: classify freshly extracted source strings against
//! upstream and propagate the organization's additions into the custom layer.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Skipped, skip_or_fail};
use crate::{
    core::{
        Catalog, KeyAction, LocaleTemplate, Precedence, StringEntry, Workspace,
        discover_languages,
        locale_path::{JSON_SOURCE_FILE, MESSAGES_DIR, is_source_catalog},
        tree,
    },
    error::Result,
};

/// What upstream holds for one extracted source file.
#[derive(Debug)]
pub enum UpstreamState {
    Present(Catalog),
    /// The repository exists upstream but this source file does not.
    MissingFile,
    /// Upstream has no directory at all for the repository.
    MissingRepository,
}

#[derive(Debug, Default)]
pub struct UpdateSummary {
    pub languages: Vec<String>,
    pub files_processed: usize,
    pub new_repositories: Vec<String>,
    pub custom_strings: usize,
    pub sources_written: usize,
    pub placeholders_created: usize,
    pub placeholders_updated: usize,
    pub skipped: Vec<Skipped>,
}

impl UpdateSummary {
    pub fn files_written(&self) -> usize {
        self.sources_written + self.placeholders_created + self.placeholders_updated
    }
}

/// Run the custom-layer update for every source catalog under `extracted_root`.
pub fn update_custom(ws: &Workspace, extracted_root: &Path) -> Result<UpdateSummary> {
    Workspace::require_dir("extracted", extracted_root)?;
    let languages = discover_languages(ws)?;
    info!(
        "found {} supported languages in upstream: {}",
        languages.len(),
        languages.join(", ")
    );

    let mut updater = Updater {
        ws,
        extracted_root,
        summary: UpdateSummary::default(),
    };

    let scan = tree::catalog_files(ws, extracted_root);
    for rel_path in &scan.files {
        if !is_source_catalog(rel_path, &ws.source_locale) {
            debug!("{}: not a source catalog", rel_path.display());
            continue;
        }
        updater.summary.files_processed += 1;
        updater.process(rel_path, &languages)?;
    }

    updater.summary.languages = languages;
    Ok(updater.summary)
}

struct Updater<'a> {
    ws: &'a Workspace,
    extracted_root: &'a Path,
    summary: UpdateSummary,
}

impl Updater<'_> {
    fn process(&mut self, rel_path: &Path, languages: &[String]) -> Result<()> {
        let extracted_path = self.extracted_root.join(rel_path);
        let extracted = match Catalog::load(&extracted_path) {
            Ok(catalog) => catalog,
            Err(err) => return skip_or_fail(&mut self.summary.skipped, rel_path, err),
        };
        let template = match LocaleTemplate::for_source(rel_path, &self.ws.source_locale) {
            Ok(template) => template,
            Err(err) => return skip_or_fail(&mut self.summary.skipped, rel_path, err),
        };
        let upstream = match upstream_state(self.ws, rel_path) {
            Ok(state) => state,
            Err(err) => return skip_or_fail(&mut self.summary.skipped, rel_path, err),
        };

        let custom_entries: Vec<&StringEntry> = match &upstream {
            UpstreamState::Present(upstream) => extracted.entries_missing_from(upstream),
            UpstreamState::MissingFile | UpstreamState::MissingRepository => {
                extracted.live_entries().collect()
            }
        };

        if let UpstreamState::MissingRepository = upstream {
            let repo = repository_of(rel_path);
            info!("{}: new repository {repo}, all strings are custom", rel_path.display());
            if !self.summary.new_repositories.contains(&repo) {
                self.summary.new_repositories.push(repo);
            }
            self.copy_source(&extracted_path, rel_path)?;
        } else if custom_entries.is_empty() {
            debug!("{}: no custom strings", rel_path.display());
            return Ok(());
        } else {
            info!("{}: {} custom strings", rel_path.display(), custom_entries.len());
            self.extend_source(&extracted, &custom_entries, rel_path)?;
        }
        self.summary.custom_strings += custom_entries.len();

        for lang in languages {
            self.update_placeholder(&extracted, &custom_entries, &template, lang)?;
        }
        Ok(())
    }

    /// New repositories take the extracted source file verbatim.
    fn copy_source(&mut self, extracted_path: &Path, rel_path: &Path) -> Result<()> {
        let target = self.ws.custom.join(rel_path);
        if tree::same_content(extracted_path, &target) {
            return Ok(());
        }
        tree::copy_file(extracted_path, &target)?;
        info!("  copied source to {}", self.ws.display_path(&target).display());
        self.summary.sources_written += 1;
        Ok(())
    }

    /// Append custom entries missing from the custom source catalog.
    fn extend_source(
        &mut self,
        extracted: &Catalog,
        custom_entries: &[&StringEntry],
        rel_path: &Path,
    ) -> Result<()> {
        let target = self.ws.custom.join(rel_path);
        let mut source = if target.exists() {
            match Catalog::load(&target) {
                Ok(catalog) => catalog,
                Err(err) => return skip_or_fail(&mut self.summary.skipped, &target, err),
            }
        } else {
            extracted.blank_like(&target)
        };

        let added = custom_entries
            .iter()
            .filter(|entry| source.overlay(entry, Precedence::Existing) != KeyAction::Unchanged)
            .count();
        if added > 0 {
            source.save()?;
            info!(
                "  added {added} strings to {}",
                self.ws.display_path(&target).display()
            );
            self.summary.sources_written += 1;
        }
        Ok(())
    }

    /// Create or extend the placeholder catalog for one language. Existing
    /// translations are never touched.
    fn update_placeholder(
        &mut self,
        extracted: &Catalog,
        custom_entries: &[&StringEntry],
        template: &LocaleTemplate,
        lang: &str,
    ) -> Result<()> {
        let target = match template.render(lang) {
            Ok(rel) => self.ws.custom.join(rel),
            Err(err) => return skip_or_fail(&mut self.summary.skipped, template.source(), err),
        };

        let exists = target.exists();
        let mut catalog = if exists {
            match Catalog::load(&target) {
                Ok(catalog) => catalog,
                Err(err) => return skip_or_fail(&mut self.summary.skipped, &target, err),
            }
        } else {
            extracted.blank_for_locale(&target, lang)
        };

        let added = custom_entries
            .iter()
            .filter(|entry| catalog.overlay(&entry.placeholder(), Precedence::Existing) == KeyAction::Added)
            .count();

        if !exists {
            catalog.save()?;
            info!("  created {lang}: {added} strings");
            self.summary.placeholders_created += 1;
        } else if added > 0 {
            catalog.save()?;
            info!("  updated {lang}: +{added} strings");
            self.summary.placeholders_updated += 1;
        } else {
            debug!("  {lang} already has every custom string");
        }
        Ok(())
    }
}

/// First path component: the repository directory name.
fn repository_of(rel_path: &Path) -> String {
    rel_path
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Locate and load the upstream counterpart of an extracted source file.
///
/// Fails only if the counterpart exists but cannot be parsed.
pub fn upstream_state(ws: &Workspace, rel_path: &Path) -> Result<UpstreamState> {
    let repo = repository_of(rel_path);
    if repo.is_empty() || !ws.upstream.join(&repo).is_dir() {
        return Ok(UpstreamState::MissingRepository);
    }

    let found = upstream_candidates(rel_path, &repo, &ws.source_locale)
        .into_iter()
        .map(|candidate| ws.upstream.join(candidate))
        .find(|path| path.is_file());
    match found {
        Some(path) => {
            debug!("{}: upstream counterpart {}", rel_path.display(), path.display());
            Ok(UpstreamState::Present(Catalog::load(&path)?))
        }
        None => Ok(UpstreamState::MissingFile),
    }
}

/// Upstream paths to try, in order, for an extracted source file.
///
/// Gettext catalogs map to the same relative path. JSON source files may be
/// published upstream under a different name in a sibling `messages/`
/// directory, so the known alternate conventions are tried as well.
fn upstream_candidates(rel_path: &Path, repo: &str, source_locale: &str) -> Vec<PathBuf> {
    let mut candidates = vec![rel_path.to_path_buf()];
    if rel_path.extension().and_then(|e| e.to_str()) != Some("json") {
        return candidates;
    }

    let source_file = format!("{source_locale}.json");
    let i18n = Path::new(repo).join("src").join("i18n");
    let alternates = [
        rel_path
            .parent()
            .unwrap_or(Path::new(""))
            .join(MESSAGES_DIR)
            .join(&source_file),
        i18n.join(JSON_SOURCE_FILE),
        i18n.join(MESSAGES_DIR).join(&source_file),
    ];
    for alternate in alternates {
        if !candidates.contains(&alternate) {
            candidates.push(alternate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        ops::test_support::{po, read, write},
    };
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const SOURCE: &str = "repoA/conf/locale/en/LC_MESSAGES/django.po";

    struct Fixture {
        dir: TempDir,
        ws: Workspace,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let ws = Workspace::from_config(dir.path(), &Config::default()).unwrap();
            fs::create_dir_all(&ws.upstream).unwrap();
            Self { dir, ws }
        }

        fn extracted(&self) -> PathBuf {
            self.dir.path().join("extracted")
        }

        fn upstream_langs(&self, repo: &str, langs: &[&str]) {
            for lang in langs {
                write(
                    &self.ws.upstream.join(format!("{repo}/conf/locale/{lang}/LC_MESSAGES/django.po")),
                    &po(&[]),
                );
            }
        }

        fn run(&self) -> UpdateSummary {
            update_custom(&self.ws, &self.extracted()).unwrap()
        }

        fn custom_keys(&self, rel: &str) -> Vec<(String, String)> {
            Catalog::load(&self.ws.custom.join(rel))
                .unwrap()
                .entries()
                .map(|e| (e.key.clone(), e.value.clone()))
                .collect()
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_existing_repository_gets_only_custom_keys() {
        let fx = Fixture::new();
        fx.upstream_langs("repoA", &["fr", "de"]);
        write(&fx.ws.upstream.join(SOURCE), &po(&[("A", ""), ("B", "")]));
        write(&fx.extracted().join(SOURCE), &po(&[("A", ""), ("B", ""), ("C", "")]));

        let summary = fx.run();
        assert_eq!(summary.languages, vec!["de", "fr"]);
        assert_eq!(summary.custom_strings, 1);
        assert_eq!(summary.placeholders_created, 2);

        assert_eq!(fx.custom_keys(SOURCE), pairs(&[("C", "")]));
        for lang in ["fr", "de"] {
            let rel = format!("repoA/conf/locale/{lang}/LC_MESSAGES/django.po");
            assert_eq!(fx.custom_keys(&rel), pairs(&[("C", "")]));
        }
    }

    #[test]
    fn test_existing_translation_is_preserved() {
        let fx = Fixture::new();
        fx.upstream_langs("repoA", &["fr"]);
        write(&fx.ws.upstream.join(SOURCE), &po(&[("A", "")]));
        write(&fx.extracted().join(SOURCE), &po(&[("A", ""), ("B", ""), ("C", "")]));
        let fr = "repoA/conf/locale/fr/LC_MESSAGES/django.po";
        write(&fx.ws.custom.join(fr), &po(&[("B", "Bé")]));

        let summary = fx.run();
        assert_eq!(summary.placeholders_updated, 1);
        assert_eq!(fx.custom_keys(fr), pairs(&[("B", "Bé"), ("C", "")]));
    }

    #[test]
    fn test_update_is_idempotent() {
        let fx = Fixture::new();
        fx.upstream_langs("repoA", &["fr", "de"]);
        write(&fx.ws.upstream.join(SOURCE), &po(&[("A", "")]));
        write(&fx.extracted().join(SOURCE), &po(&[("A", ""), ("C", "")]));

        fx.run();
        let fr = fx.ws.custom.join("repoA/conf/locale/fr/LC_MESSAGES/django.po");
        let first_fr = read(&fr);
        let first_src = read(&fx.ws.custom.join(SOURCE));

        let second = fx.run();
        assert_eq!(second.files_written(), 0);
        assert_eq!(read(&fr), first_fr);
        assert_eq!(read(&fx.ws.custom.join(SOURCE)), first_src);
    }

    #[test]
    fn test_new_repository_is_entirely_custom() {
        let fx = Fixture::new();
        fx.upstream_langs("repoA", &["fr", "de"]);
        let src = "repoNew/conf/locale/en/LC_MESSAGES/djangojs.po";
        let content = po(&[("X", ""), ("Y", "")]);
        write(&fx.extracted().join(src), &content);

        let summary = fx.run();
        assert_eq!(summary.new_repositories, vec!["repoNew"]);
        assert_eq!(read(&fx.ws.custom.join(src)), content);
        for lang in ["fr", "de"] {
            let rel = format!("repoNew/conf/locale/{lang}/LC_MESSAGES/djangojs.po");
            assert_eq!(fx.custom_keys(&rel), pairs(&[("X", ""), ("Y", "")]));
            let catalog = Catalog::load(&fx.ws.custom.join(&rel)).unwrap();
            assert_eq!(catalog.metadata_value("Language"), Some(lang));
            assert_eq!(catalog.metadata_value("Domain"), Some("djangojs"));
        }
    }

    #[test]
    fn test_missing_upstream_file_treats_all_as_custom() {
        let fx = Fixture::new();
        fx.upstream_langs("repoA", &["fr"]);
        write(&fx.extracted().join(SOURCE), &po(&[("A", ""), ("B", "")]));

        let summary = fx.run();
        assert_eq!(summary.custom_strings, 2);
        assert!(summary.new_repositories.is_empty());
        assert_eq!(fx.custom_keys(SOURCE), pairs(&[("A", ""), ("B", "")]));
    }

    #[test]
    fn test_json_source_maps_to_messages_files() {
        let fx = Fixture::new();
        write(&fx.ws.upstream.join("mfe/src/i18n/messages/fr.json"), "{}");
        write(
            &fx.ws.upstream.join("mfe/src/i18n/messages/en.json"),
            r#"{"app.title": "Title"}"#,
        );
        write(
            &fx.extracted().join("mfe/src/i18n/transifex_input.json"),
            r#"{"app.title": "Title", "app.custom": "Custom"}"#,
        );

        let summary = fx.run();
        assert_eq!(summary.custom_strings, 1);
        assert_eq!(
            read(&fx.ws.custom.join("mfe/src/i18n/transifex_input.json")),
            "{\n  \"app.custom\": \"Custom\"\n}\n"
        );
        assert_eq!(
            read(&fx.ws.custom.join("mfe/src/i18n/messages/fr.json")),
            "{\n  \"app.custom\": \"\"\n}\n"
        );
    }

    #[test]
    fn test_malformed_custom_placeholder_is_skipped() {
        let fx = Fixture::new();
        fx.upstream_langs("repoA", &["fr", "de"]);
        write(&fx.ws.upstream.join(SOURCE), &po(&[("A", "")]));
        write(&fx.extracted().join(SOURCE), &po(&[("A", ""), ("C", "")]));
        let fr = fx.ws.custom.join("repoA/conf/locale/fr/LC_MESSAGES/django.po");
        write(&fr, "msgid \"broken");

        let summary = fx.run();
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, fr);
        assert_eq!(read(&fr), "msgid \"broken");
        assert_eq!(summary.placeholders_created, 1);
    }

    #[test]
    fn test_missing_extracted_dir_is_fatal() {
        let fx = Fixture::new();
        assert!(update_custom(&fx.ws, &fx.extracted()).is_err());
    }

    #[test]
    fn test_upstream_candidates_for_json() {
        let candidates = upstream_candidates(Path::new("mfe/src/i18n/transifex_input.json"), "mfe", "en");
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("mfe/src/i18n/transifex_input.json"),
                PathBuf::from("mfe/src/i18n/messages/en.json"),
            ]
        );
        let po_candidates = upstream_candidates(Path::new(SOURCE), "repoA", "en");
        assert_eq!(po_candidates, vec![PathBuf::from(SOURCE)]);
    }
}
