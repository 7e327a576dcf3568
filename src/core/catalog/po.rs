//! Gettext `.po` catalogs.
//!
//! Parses header metadata, translator/extracted comments, `#:` references,
//! flags, `msgctxt`, plural forms and obsolete (`#~`) entries, and renders
//! them back in a stable layout.

use std::path::Path;

use super::{Catalog, Codec, Location, Plural, StringEntry};
use crate::error::{LayerError, Result};

/// Maximum width of a `#:` reference line.
const REFERENCE_WIDTH: usize = 79;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoCodec;

impl Codec for PoCodec {
    fn parse(&self, content: &str, path: &Path) -> Result<Catalog> {
        Parser::new(Catalog::new((*self).into(), path)).run(content)
    }

    fn render(&self, catalog: &Catalog) -> Result<String> {
        Ok(render(catalog))
    }

    fn extension(&self) -> &'static str {
        "po"
    }
}

// ============================================================
// Parsing
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    StrPlural(usize),
}

#[derive(Default)]
struct Pending {
    entry: StringEntry,
    has_id: bool,
    has_str: bool,
    field: Option<Field>,
}

struct Parser {
    catalog: Catalog,
    pending: Pending,
    seen_header: bool,
    line_no: usize,
}

impl Parser {
    fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            pending: Pending::default(),
            seen_header: false,
            line_no: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> LayerError {
        LayerError::malformed(
            self.catalog.path(),
            format!("line {}: {}", self.line_no, reason.into()),
        )
    }

    fn run(mut self, content: &str) -> Result<Catalog> {
        for (i, raw) in content.lines().enumerate() {
            self.line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("#~") {
                let rest = rest.trim_start();
                if let Some(previous) = rest.strip_prefix('|') {
                    self.comment_line(CommentKind::Previous, previous)?;
                } else if !rest.is_empty() {
                    self.keyword_line(rest, true)?;
                }
            } else if let Some(rest) = line.strip_prefix('#') {
                let kind = match rest.chars().next() {
                    Some(':') => CommentKind::Reference,
                    Some(',') => CommentKind::Flags,
                    Some('.') => CommentKind::Extracted,
                    Some('|') => CommentKind::Previous,
                    _ => CommentKind::Translator,
                };
                let body = match kind {
                    CommentKind::Translator => rest,
                    _ => &rest[1..],
                };
                self.comment_line(kind, body)?;
            } else {
                self.keyword_line(line, false)?;
            }
        }

        self.line_no += 1;
        self.finish_pending()?;
        Ok(self.catalog)
    }

    fn comment_line(&mut self, kind: CommentKind, body: &str) -> Result<()> {
        if self.pending.has_str {
            self.finish_pending()?;
        }
        let entry = &mut self.pending.entry;
        match kind {
            CommentKind::Reference => entry
                .locations
                .extend(body.split_whitespace().map(Location::parse)),
            CommentKind::Flags => entry.flags.extend(
                body.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from),
            ),
            CommentKind::Extracted => entry.extracted_comments.push(strip_one_space(body)),
            CommentKind::Previous => entry.previous.push(body.trim().to_string()),
            CommentKind::Translator => entry.comments.push(strip_one_space(body)),
        }
        Ok(())
    }

    fn keyword_line(&mut self, line: &str, obsolete: bool) -> Result<()> {
        if line.starts_with('"') {
            let value = parse_quoted(line).map_err(|e| self.error(e))?;
            return self.continue_field(&value);
        }

        let (keyword, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .ok_or_else(|| self.error(format!("unexpected line '{line}'")))?;
        let value = parse_quoted(rest.trim_start()).map_err(|e| self.error(e))?;

        match keyword {
            "msgctxt" => {
                if self.pending.has_str {
                    self.finish_pending()?;
                } else if self.pending.has_id {
                    return Err(self.error("msgctxt after msgid"));
                }
                self.pending.entry.context = Some(value);
                self.pending.field = Some(Field::Context);
            }
            "msgid" => {
                if self.pending.has_str {
                    self.finish_pending()?;
                } else if self.pending.has_id {
                    return Err(self.error("msgid without msgstr"));
                }
                self.pending.entry.key = value;
                self.pending.has_id = true;
                self.pending.field = Some(Field::Id);
            }
            "msgid_plural" => {
                if !self.pending.has_id || self.pending.has_str {
                    return Err(self.error("msgid_plural must follow msgid"));
                }
                self.pending.entry.plural = Some(Plural {
                    key: value,
                    values: Vec::new(),
                });
                self.pending.field = Some(Field::IdPlural);
            }
            "msgstr" => {
                if !self.pending.has_id {
                    return Err(self.error("msgstr without msgid"));
                }
                self.pending.entry.value = value;
                self.pending.has_str = true;
                self.pending.field = Some(Field::Str);
            }
            other => {
                let index = other
                    .strip_prefix("msgstr[")
                    .and_then(|s| s.strip_suffix(']'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| self.error(format!("unknown keyword '{other}'")))?;
                if self.pending.entry.plural.is_none() {
                    return Err(self.error(format!("{other} without msgid_plural")));
                }
                if let Some(plural) = self.pending.entry.plural.as_mut() {
                    if plural.values.len() <= index {
                        plural.values.resize(index + 1, String::new());
                    }
                    plural.values[index] = value;
                }
                self.pending.has_str = true;
                self.pending.field = Some(Field::StrPlural(index));
            }
        }
        if obsolete {
            self.pending.entry.obsolete = true;
        }
        Ok(())
    }

    fn continue_field(&mut self, value: &str) -> Result<()> {
        let Some(field) = self.pending.field else {
            return Err(self.error("string continuation without a keyword"));
        };
        let entry = &mut self.pending.entry;
        let target = match (field, entry.plural.as_mut()) {
            (Field::Context, _) => entry.context.get_or_insert_with(String::new),
            (Field::Id, _) => &mut entry.key,
            (Field::Str, _) => &mut entry.value,
            (Field::IdPlural, Some(plural)) => &mut plural.key,
            (Field::StrPlural(i), Some(plural)) => &mut plural.values[i],
            (Field::IdPlural | Field::StrPlural(_), None) => {
                return Err(LayerError::malformed(
                    self.catalog.path(),
                    format!("line {}: continuation without msgid_plural", self.line_no),
                ));
            }
        };
        target.push_str(value);
        Ok(())
    }

    fn finish_pending(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        if !pending.has_id {
            // Trailing comments with no entry attached.
            return Ok(());
        }
        if !pending.has_str {
            return Err(self.error(format!("missing msgstr for '{}'", pending.entry.key)));
        }

        let entry = pending.entry;
        if entry.key.is_empty() && entry.context.is_none() && !entry.obsolete {
            if self.seen_header {
                return Err(self.error("duplicate header entry"));
            }
            self.seen_header = true;
            self.catalog.header_comments = entry.comments;
            self.catalog.header_flags = entry.flags;
            self.catalog.metadata = parse_metadata(&entry.value);
            return Ok(());
        }

        let id = entry.id();
        if !self.catalog.push(entry) {
            return Err(self.error(format!("duplicate message definition for '{id}'")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum CommentKind {
    Translator,
    Extracted,
    Reference,
    Flags,
    Previous,
}

fn strip_one_space(s: &str) -> String {
    s.strip_prefix(' ').unwrap_or(s).to_string()
}

fn parse_metadata(header: &str) -> Vec<(String, String)> {
    header
        .split('\n')
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Parse a double-quoted gettext string, resolving escape sequences.
fn parse_quoted(s: &str) -> std::result::Result<String, String> {
    let s = s.trim_end();
    let body = s
        .strip_prefix('"')
        .ok_or_else(|| format!("expected a quoted string, found '{s}'"))?;

    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('a') => result.push('\u{7}'),
                Some('b') => result.push('\u{8}'),
                Some('f') => result.push('\u{c}'),
                Some('v') => result.push('\u{b}'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => return Err("unterminated string".to_string()),
            },
            '"' => {
                let trailing = chars.as_str().trim();
                if !trailing.is_empty() {
                    return Err(format!("unexpected text after string: '{trailing}'"));
                }
                return Ok(result);
            }
            other => result.push(other),
        }
    }
    Err("unterminated string".to_string())
}

// ============================================================
// Rendering
// ============================================================

fn render(catalog: &Catalog) -> String {
    let mut out = String::new();

    let has_header = !catalog.metadata.is_empty()
        || !catalog.header_comments.is_empty()
        || !catalog.header_flags.is_empty();
    if has_header {
        for comment in &catalog.header_comments {
            push_comment(&mut out, "#", comment);
        }
        if !catalog.header_flags.is_empty() {
            out.push_str(&format!("#, {}\n", catalog.header_flags.join(", ")));
        }
        let header: String = catalog
            .metadata
            .iter()
            .map(|(k, v)| format!("{k}: {v}\n"))
            .collect();
        out.push_str("msgid \"\"\n");
        write_string(&mut out, "", "msgstr", &header, true);
    }

    for entry in catalog.entries() {
        if !out.is_empty() {
            out.push('\n');
        }
        render_entry(&mut out, entry);
    }
    out
}

fn render_entry(out: &mut String, entry: &StringEntry) {
    for comment in &entry.comments {
        push_comment(out, "#", comment);
    }
    for comment in &entry.extracted_comments {
        push_comment(out, "#.", comment);
    }
    for line in wrap_references(&entry.locations) {
        out.push_str(&line);
        out.push('\n');
    }
    if !entry.flags.is_empty() {
        out.push_str(&format!("#, {}\n", entry.flags.join(", ")));
    }

    let prefix = if entry.obsolete { "#~ " } else { "" };
    for previous in &entry.previous {
        let marker = if entry.obsolete { "#~|" } else { "#|" };
        out.push_str(&format!("{marker} {previous}\n"));
    }
    if let Some(context) = &entry.context {
        write_string(out, prefix, "msgctxt", context, false);
    }
    write_string(out, prefix, "msgid", &entry.key, false);
    match &entry.plural {
        Some(plural) => {
            write_string(out, prefix, "msgid_plural", &plural.key, false);
            for (i, value) in plural.values.iter().enumerate() {
                write_string(out, prefix, &format!("msgstr[{i}]"), value, false);
            }
        }
        None => write_string(out, prefix, "msgstr", &entry.value, false),
    }
}

fn push_comment(out: &mut String, marker: &str, text: &str) {
    if text.is_empty() {
        out.push_str(marker);
    } else {
        out.push_str(&format!("{marker} {text}"));
    }
    out.push('\n');
}

/// Write `keyword "value"`, splitting after each embedded newline.
fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str, force_multiline: bool) {
    let lines: Vec<&str> = value.split_inclusive('\n').collect();
    if lines.len() <= 1 && !force_multiline {
        out.push_str(&format!("{prefix}{keyword} \"{}\"\n", escape(value)));
        return;
    }
    out.push_str(&format!("{prefix}{keyword} \"\"\n"));
    for line in lines {
        out.push_str(&format!("{prefix}\"{}\"\n", escape(line)));
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn wrap_references(locations: &[Location]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for location in locations {
        let token = location.to_string();
        if !current.is_empty() && current.len() + 1 + token.len() > REFERENCE_WIDTH {
            lines.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            current.push_str("#:");
        }
        current.push(' ');
        current.push_str(&token);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
