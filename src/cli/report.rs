//! Report formatting and printing utilities.
//!
//! Per-file progress goes through `tracing`; this module prints the closing
//! summaries. Separate from the operations so strata can be used as a library.

use std::{
    fmt::Write as _,
    io::{self, Write},
};

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, InitSummary};
use crate::ops::{
    backport::{BackportSummary, NOT_FOUND_LIMIT},
    merge::MergeSummary,
    normalize::NormalizeSummary,
    update::UpdateSummary,
    validate::ValidationSummary,
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Longest msgid/msgstr shown in the backport report.
const MAX_STRING_DISPLAY: usize = 70;

const RULE_WIDTH: usize = 60;

pub fn print(result: &CommandResult) {
    let stdout = &mut io::stdout().lock();
    match &result.summary {
        CommandSummary::Update(summary) => print_update_to(summary, stdout),
        CommandSummary::Merge(summary) => print_merge_to(summary, stdout),
        CommandSummary::Normalize(summary) => print_normalize_to(summary, stdout),
        CommandSummary::Backport(summary) => {
            let _ = write!(stdout, "{}", backport_report_text(summary));
            print_backport_to(summary, stdout);
        }
        CommandSummary::Validate(summary) => {
            print_diagnostics_to(summary, &mut io::stderr().lock());
            print_validation_to(summary, stdout);
            return;
        }
        CommandSummary::Init(summary) => print_init_to(summary, stdout),
    }
    print_skip_warning_to(result.warning_count, &mut io::stderr().lock());
}

/// Print a warning about files left untouched because they could not be read.
pub fn print_skip_warning_to<W: Write>(count: usize, writer: &mut W) {
    if count > 0 {
        let _ = writeln!(
            writer,
            "{} {} {} skipped as unreadable (details above)",
            "warning:".bold().yellow(),
            count,
            if count == 1 { "file was" } else { "files were" }
        );
    }
}

pub fn print_update_to<W: Write>(summary: &UpdateSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Updated custom layer for {} {}: {} source {} processed, {} custom {}",
            summary.languages.len(),
            plural(summary.languages.len(), "language", "languages"),
            summary.files_processed,
            plural(summary.files_processed, "file", "files"),
            summary.custom_strings,
            plural(summary.custom_strings, "string", "strings"),
        )
        .green()
    );
    let _ = writeln!(
        writer,
        "  - written: {} source, {} placeholder(s) created, {} placeholder(s) updated",
        summary.sources_written, summary.placeholders_created, summary.placeholders_updated
    );
    if !summary.new_repositories.is_empty() {
        let _ = writeln!(
            writer,
            "  - new repositories: {}",
            summary.new_repositories.join(", ")
        );
    }
}

pub fn print_merge_to<W: Write>(summary: &MergeSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Rebuilt final layer from {} upstream {}",
            summary.upstream_files,
            plural(summary.upstream_files, "file", "files")
        )
        .green()
    );
    let _ = writeln!(
        writer,
        "  - custom: {} merged, {} copied, {} unchanged",
        summary.merged, summary.copied, summary.unchanged
    );
    if summary.excluded > 0 {
        let _ = writeln!(writer, "  - excluded locales: {} file(s) kept from upstream", summary.excluded);
    }
    if summary.fallbacks > 0 {
        let _ = writeln!(
            writer,
            "  - {} unreadable final file(s) replaced by the custom file",
            summary.fallbacks
        );
    }
}

pub fn print_normalize_to<W: Write>(summary: &NormalizeSummary, writer: &mut W) {
    if summary.occurrences == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            "No locale aliases found".green()
        );
        return;
    }
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Normalized {} of {} locale {}",
            summary.removed,
            summary.occurrences,
            plural(summary.occurrences, "alias", "aliases")
        )
        .green()
    );
    let _ = writeln!(
        writer,
        "  - {} file(s) moved, {} file(s) merged ({} entries)",
        summary.files_moved, summary.files_merged, summary.entries_merged
    );
}

pub fn print_backport_to<W: Write>(summary: &BackportSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Backported {} of {} {} into {} {}",
            summary.strings_migrated(),
            summary.strings_found(),
            plural(summary.strings_found(), "string", "strings"),
            summary.files_updated,
            plural(summary.files_updated, "file", "files")
        )
        .green()
    );
}

/// Plain-text backport report, printed and optionally written to a file.
pub fn backport_report_text(summary: &BackportSummary) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "BACKPORT SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Old locale directory: {}", summary.old_locale_dir.display());
    let _ = writeln!(out, "Languages processed: {}", summary.languages.len());
    let _ = writeln!(out, "Old translation strings: {}", summary.strings_found());
    let _ = writeln!(out, "Strings successfully migrated: {}", summary.strings_migrated());
    let _ = writeln!(out, "Strings not found: {}", summary.strings_not_found());
    let _ = writeln!(out, "Files updated: {}", summary.files_updated);
    let _ = writeln!(out, "Placeholder files created: {}", summary.placeholders_created);
    if summary.strings_found() > 0 {
        let rate = summary.strings_migrated() as f64 * 100.0 / summary.strings_found() as f64;
        let _ = writeln!(out, "Success rate: {rate:.1}%");
    }

    if summary.strings_not_found() > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "STRINGS NOT FOUND");
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        for lang in summary.languages.iter().filter(|l| !l.not_found.is_empty()) {
            let _ = writeln!(out, "[{}] {} string(s):", lang.lang, lang.not_found.len());
            for (msgid, msgstr) in lang.not_found.iter().take(NOT_FOUND_LIMIT) {
                let _ = writeln!(out, "  msgid:  {}", truncate(msgid, MAX_STRING_DISPLAY));
                let _ = writeln!(out, "  msgstr: {}", truncate(msgstr, MAX_STRING_DISPLAY));
            }
            if lang.not_found.len() > NOT_FOUND_LIMIT {
                let _ = writeln!(out, "  ... and {} more", lang.not_found.len() - NOT_FOUND_LIMIT);
            }
        }
    }
    out
}

/// Every invalid catalog's diagnostics, printed after all progress output.
pub fn print_diagnostics_to<W: Write>(summary: &ValidationSummary, writer: &mut W) {
    for dir in &summary.missing_dirs {
        let _ = writeln!(
            writer,
            "{} directory not found: {}",
            "warning:".bold().yellow(),
            dir.display()
        );
    }
    for report in summary.invalid() {
        let _ = writeln!(writer, "{} {}", "INVALID:".bold().red(), report.path.display());
        let _ = writeln!(writer, "{}", report.output.trim_end());
        let _ = writeln!(writer);
    }
}

pub fn print_validation_to<W: Write>(summary: &ValidationSummary, writer: &mut W) {
    let checked = summary.reports.len();
    let invalid = summary.invalid().count();
    if invalid == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "SUCCESS: {} {} checked, all valid",
                checked,
                plural(checked, "catalog", "catalogs")
            )
            .green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!(
                "FAILURE: {} of {} {} invalid",
                invalid,
                checked,
                plural(checked, "catalog", "catalogs")
            )
            .red()
        );
    }
}

fn print_init_to<W: Write>(summary: &InitSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", summary.path.display()).green()
    );
}

// ============================================================
// Internal Functions
// ============================================================

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

// ============================================================
// Tests
// ============================================================
