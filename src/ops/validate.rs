//! Catalog validation: an external syntax checker plus an internal structural
//! check of every translated entry.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Command,
    sync::LazyLock,
};

use regex::Regex;
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use crate::{
    core::{Catalog, StringEntry, Workspace, locale_path::mentions_locale, tree},
    error::{LayerError, Result},
};

/// Width of wrapped msgid/translation lines in diagnostics.
const WRAP_WIDTH: usize = 79;
const ID_INDENT: &str = "  msgid: ";
const TX_INDENT: &str = "  -----> ";

/// `%(name)s`, `%s`/`%d`/..., and `{name}` interpolations.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\([A-Za-z_][A-Za-z0-9_]*\)[sdifrxX]|%[sdifrxX]|\{[A-Za-z_][A-Za-z0-9_]*\}").unwrap()
});

/// Opening and closing HTML tags, captured by name.
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?[A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*)?/?>").unwrap());

/// One structural problem in a translated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub description: String,
    pub msgid: String,
    pub translations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub valid: bool,
    /// Checker output and structural problems, ready to print.
    pub output: String,
}

#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub reports: Vec<FileReport>,
    /// Requested directories that did not exist.
    pub missing_dirs: Vec<PathBuf>,
}

impl ValidationSummary {
    pub fn all_valid(&self) -> bool {
        self.reports.iter().all(|r| r.valid)
    }

    pub fn invalid(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.valid)
    }
}

/// Final, custom and upstream, in that order.
pub fn default_dirs(ws: &Workspace) -> Vec<PathBuf> {
    vec![ws.final_dir.clone(), ws.custom.clone(), ws.upstream.clone()]
}

/// Validate every non-source, non-excluded `.po` file under `dirs`.
///
/// Fails only if the external checker cannot be started.
pub fn validate_dirs(ws: &Workspace, dirs: &[PathBuf]) -> Result<ValidationSummary> {
    let mut summary = ValidationSummary::default();

    for dir in dirs {
        if !dir.is_dir() {
            warn!("directory not found, skipping: {}", dir.display());
            summary.missing_dirs.push(dir.clone());
            continue;
        }
        info!("validating {}", ws.display_path(dir).display());

        let files = tree::catalog_files(ws, dir)
            .files
            .into_iter()
            .filter(|rel| rel.extension().and_then(|e| e.to_str()) == Some("po"))
            .filter(|rel| {
                !mentions_locale(rel, &ws.source_locale)
                    && !ws.excluded_locales.iter().any(|l| mentions_locale(rel, l))
            });

        for rel in files {
            let path = dir.join(&rel);
            let report = validate_file(&ws.checker, &path)?;
            if report.valid {
                info!("VALID: {}", ws.display_path(&path).display());
            }
            summary.reports.push(report);
        }
    }
    Ok(summary)
}

/// Run both checks on one catalog file.
pub fn validate_file(checker: &[String], path: &Path) -> Result<FileReport> {
    let mut valid = true;
    let mut output = String::new();

    if let Some(result) = run_checker(checker, path)? {
        valid &= result.success;
        output.push_str(&result.output);
    }

    match Catalog::load(path) {
        Ok(catalog) => {
            let problems = check_catalog(&catalog);
            if !problems.is_empty() {
                valid = false;
            }
            for problem in &problems {
                output.push_str(&format_problem(problem));
            }
        }
        Err(err) => {
            valid = false;
            output.push_str(&format!("{err}\n"));
        }
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        valid,
        output,
    })
}

struct CheckerOutput {
    success: bool,
    output: String,
}

/// Run the configured checker with `path` appended. `None` if disabled.
fn run_checker(checker: &[String], path: &Path) -> Result<Option<CheckerOutput>> {
    let Some((program, args)) = checker.split_first() else {
        return Ok(None);
    };
    let result = Command::new(program)
        .args(args)
        .arg(path)
        .output()
        .map_err(|e| LayerError::ExternalTool {
            program: program.clone(),
            reason: format!("cannot run: {e}"),
        })?;

    let mut output = format!(
        "{}\n{}\n",
        String::from_utf8_lossy(&result.stdout).trim_end(),
        String::from_utf8_lossy(&result.stderr).trim_end()
    );
    if !result.status.success() {
        let err = LayerError::ExternalTool {
            program: program.clone(),
            reason: result.status.to_string(),
        };
        output.push_str(&format!("{err}\n"));
    }
    Ok(Some(CheckerOutput {
        success: result.status.success(),
        output,
    }))
}

/// Structural problems of every translated entry in a catalog.
pub fn check_catalog(catalog: &Catalog) -> Vec<Problem> {
    catalog
        .live_entries()
        .filter(|entry| entry.is_translated())
        .flat_map(check_entry)
        .collect()
}

fn check_entry(entry: &StringEntry) -> Vec<Problem> {
    let mut problems = Vec::new();
    let translations: Vec<&str> = match &entry.plural {
        Some(plural) => plural
            .values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect(),
        None => vec![entry.value.as_str()],
    };

    for (description, extract) in [
        ("Different placeholders in source and translation", placeholders as fn(&str) -> Tokens),
        ("Different tags in source and translation", tags),
    ] {
        let mismatched: Vec<String> = match &entry.plural {
            // Plural forms may legitimately drop the count, so only tokens
            // absent from both source forms are flagged.
            Some(plural) => {
                let mut allowed = extract(&entry.key);
                for (token, count) in extract(&plural.key) {
                    let slot = allowed.entry(token).or_insert(0);
                    *slot = (*slot).max(count);
                }
                translations
                    .iter()
                    .filter(|t| {
                        extract(t)
                            .iter()
                            .any(|(token, count)| allowed.get(token).is_none_or(|a| count > a))
                    })
                    .map(|t| t.to_string())
                    .collect()
            }
            None => {
                let expected = extract(&entry.key);
                translations
                    .iter()
                    .filter(|t| extract(t) != expected)
                    .map(|t| t.to_string())
                    .collect()
            }
        };
        if !mismatched.is_empty() {
            problems.push(Problem {
                description: description.to_string(),
                msgid: entry.key.clone(),
                translations: mismatched,
            });
        }
    }
    problems
}

/// Multiset of tokens.
type Tokens = BTreeMap<String, usize>;

fn count<'a>(tokens: impl Iterator<Item = &'a str>) -> Tokens {
    let mut counts = Tokens::new();
    for token in tokens {
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    counts
}

fn placeholders(text: &str) -> Tokens {
    let text = text.replace("%%", "");
    count(PLACEHOLDER_REGEX.find_iter(&text).map(|m| m.as_str()))
}

fn tags(text: &str) -> Tokens {
    let names: Vec<String> = TAG_REGEX
        .captures_iter(text)
        .map(|c| c[1].to_ascii_lowercase())
        .collect();
    count(names.iter().map(String::as_str))
}

fn format_problem(problem: &Problem) -> String {
    let mut out = format!("{}\n", problem.description);
    out.push_str(&fill(&problem.msgid, ID_INDENT));
    for translation in &problem.translations {
        out.push_str(&fill(translation, TX_INDENT));
    }
    out.push('\n');
    out
}

/// Greedy word wrap at [`WRAP_WIDTH`] columns; continuation lines are indented
/// to the width of `initial`.
fn fill(text: &str, initial: &str) -> String {
    let subsequent = " ".repeat(initial.width());
    let mut lines: Vec<String> = Vec::new();
    let mut current = initial.to_string();
    let mut has_word = false;

    for word in text.split_whitespace() {
        if has_word && current.width() + 1 + word.width() > WRAP_WIDTH {
            lines.push(std::mem::replace(&mut current, subsequent.clone()));
            has_word = false;
        }
        if has_word {
            current.push(' ');
        }
        current.push_str(word);
        has_word = true;
    }
    lines.push(current);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
