//! Catalog model shared by gettext catalogs and flat JSON string maps.
//!
//! A [`Catalog`] is an ordered, key-unique list of [`StringEntry`] records plus
//! header metadata. The on-disk format is chosen once, at load time, by
//! [`CatalogFormat::detect`]; every operation after that goes through the
//! [`Codec`] trait so callers never branch on the format themselves.

mod json;
mod po;

use std::{
    collections::{HashMap, HashSet},
    fmt, fs,
    path::{Path, PathBuf},
};

use enum_dispatch::enum_dispatch;

pub use json::JsonCodec;
pub use po::PoCodec;

use crate::error::{LayerError, Result};

/// Metadata field naming the message domain of secondary-domain catalogs.
pub const DOMAIN_FIELD: &str = "Domain";
/// Metadata field naming the catalog's language.
pub const LANGUAGE_FIELD: &str = "Language";
/// The primary gettext domain; it is never recorded in the `Domain` field.
pub const PRIMARY_DOMAIN: &str = "django";

// ============================================================
// Entries
// ============================================================

/// A source reference (`#: file:line`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: String,
    pub line: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Parse a single reference token such as `lms/templates/a.html:12`.
    pub fn parse(token: &str) -> Self {
        if let Some((file, line)) = token.rsplit_once(':')
            && !file.is_empty()
            && let Ok(line) = line.parse()
        {
            return Self::new(file, Some(line));
        }
        Self::new(token, None)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => f.write_str(&self.file),
        }
    }
}

/// Plural forms of a gettext entry (`msgid_plural` / `msgstr[n]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plural {
    pub key: String,
    pub values: Vec<String>,
}

/// One translatable string.
///
/// For JSON maps only `key` and `value` are meaningful; the remaining fields
/// stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringEntry {
    pub key: String,
    pub value: String,
    pub locations: Vec<Location>,
    pub context: Option<String>,
    pub plural: Option<Plural>,
    pub flags: Vec<String>,
    pub comments: Vec<String>,
    pub extracted_comments: Vec<String>,
    /// Raw `#|` previous-msgid lines, kept verbatim.
    pub previous: Vec<String>,
    pub obsolete: bool,
}

impl StringEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Identity within a catalog: the key, qualified by its context if any.
    pub fn id(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{ctx}\u{4}{}", self.key),
            None => self.key.clone(),
        }
    }

    /// True if the singular value or any plural form is non-empty.
    pub fn is_translated(&self) -> bool {
        !self.value.is_empty()
            || self
                .plural
                .as_ref()
                .is_some_and(|p| p.values.iter().any(|v| !v.is_empty()))
    }

    /// An untranslated copy of this entry, keeping key, context, references,
    /// flags and plural shape.
    pub fn placeholder(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: String::new(),
            locations: self.locations.clone(),
            context: self.context.clone(),
            plural: self.plural.as_ref().map(|p| Plural {
                key: p.key.clone(),
                values: vec![String::new(); p.values.len().max(2)],
            }),
            flags: self.flags.clone(),
            extracted_comments: self.extracted_comments.clone(),
            ..Default::default()
        }
    }

    fn translation_eq(&self, other: &StringEntry) -> bool {
        self.value == other.value
            && self.plural.as_ref().map(|p| &p.values) == other.plural.as_ref().map(|p| &p.values)
    }

    fn adopt_translation(&mut self, other: &StringEntry) {
        self.value = other.value.clone();
        match (&mut self.plural, &other.plural) {
            (Some(mine), Some(theirs)) => mine.values = theirs.values.clone(),
            (None, Some(theirs)) => self.plural = Some(theirs.clone()),
            _ => {}
        }
    }
}

/// What happened to a key when an entry was laid over a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Added,
    Updated,
    Unchanged,
}

/// Which side wins when both catalogs hold a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// A non-empty incoming value replaces the existing one.
    Incoming,
    /// The incoming value is only used to fill an empty existing value.
    Existing,
}

// ============================================================
// Formats
// ============================================================

/// Read/write capability implemented once per file format.
#[enum_dispatch]
pub trait Codec {
    /// Parse file content; `path` is recorded on the catalog and used in errors.
    fn parse(&self, content: &str, path: &Path) -> Result<Catalog>;

    /// Render a catalog deterministically.
    fn render(&self, catalog: &Catalog) -> Result<String>;

    fn extension(&self) -> &'static str;
}

#[enum_dispatch(Codec)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Po(PoCodec),
    Json(JsonCodec),
}

impl CatalogFormat {
    /// Pick the format from a file extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [Self::from(PoCodec), Self::from(JsonCodec)]
            .into_iter()
            .find(|format| format.extension() == ext)
    }
}

/// True if the path has a catalog extension.
pub fn is_catalog_file(path: &Path) -> bool {
    CatalogFormat::detect(path).is_some()
}

// ============================================================
// Catalog
// ============================================================

#[derive(Debug, Clone)]
pub struct Catalog {
    format: CatalogFormat,
    path: PathBuf,
    header_comments: Vec<String>,
    header_flags: Vec<String>,
    metadata: Vec<(String, String)>,
    entries: Vec<StringEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(format: CatalogFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
            header_comments: Vec::new(),
            header_flags: Vec::new(),
            metadata: Vec::new(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Load a catalog, detecting its format from the extension.
    ///
    /// Fails with [`LayerError::MalformedCatalog`] if the content cannot be
    /// parsed; whether that aborts anything is up to the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let format = CatalogFormat::detect(path).ok_or_else(|| LayerError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let bytes = fs::read(path).map_err(LayerError::io(path))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| LayerError::malformed(path, format!("invalid UTF-8: {e}")))?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        format.parse(content, path)
    }

    /// Write the catalog to its own path, creating parent directories.
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = self.format.render(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(LayerError::io(parent))?;
        }
        fs::write(path, content).map_err(LayerError::io(path))
    }

    pub fn render(&self) -> Result<String> {
        self.format.render(self)
    }

    /// An empty catalog for `locale` at `path`, carrying this catalog's header.
    ///
    /// `Language` is set to the locale and, for secondary gettext domains,
    /// `Domain` records the domain name.
    pub fn blank_for_locale(&self, path: impl Into<PathBuf>, locale: &str) -> Self {
        let mut blank = self.blank_like(path);
        if matches!(self.format, CatalogFormat::Po(_)) {
            blank.set_metadata(LANGUAGE_FIELD, locale);
            if let Some(domain) = blank.domain()
                && domain != PRIMARY_DOMAIN
            {
                let domain = domain.to_string();
                blank.set_metadata(DOMAIN_FIELD, &domain);
            }
        }
        blank
    }

    /// An empty catalog at `path` with this catalog's header, unchanged.
    pub fn blank_like(&self, path: impl Into<PathBuf>) -> Self {
        let mut blank = Self::new(self.format, path);
        blank.header_comments = self.header_comments.clone();
        blank.header_flags = self.header_flags.clone();
        blank.metadata = self.metadata.clone();
        blank
    }

    pub fn format(&self) -> CatalogFormat {
        self.format
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// The message domain: the `Domain` metadata field, or the file stem.
    pub fn domain(&self) -> Option<&str> {
        self.metadata_value(DOMAIN_FIELD)
            .or_else(|| self.path.file_stem().and_then(|s| s.to_str()))
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a metadata field, keeping its position if it already exists.
    pub fn set_metadata(&mut self, key: &str, value: &str) {
        match self.metadata.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.metadata.push((key.to_string(), value.to_string())),
        }
    }

    pub fn header_comments(&self) -> &[String] {
        &self.header_comments
    }

    pub fn header_flags(&self) -> &[String] {
        &self.header_flags
    }

    pub fn entries(&self) -> impl Iterator<Item = &StringEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StringEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StringEntry> {
        self.index.get(id).map(|&i| &mut self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Append an entry unless its identity is already present.
    ///
    /// Returns `true` if the entry was added.
    pub fn push(&mut self, entry: StringEntry) -> bool {
        let id = entry.id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(entry);
        true
    }

    /// All live keys: non-empty and not obsolete.
    pub fn keys(&self) -> HashSet<String> {
        self.live_entries().map(StringEntry::id).collect()
    }

    /// Live entries of `self` whose identity is absent from `other`.
    pub fn entries_missing_from(&self, other: &Catalog) -> Vec<&StringEntry> {
        let known = other.keys();
        self.live_entries()
            .filter(|entry| !known.contains(&entry.id()))
            .collect()
    }

    /// Entries with a non-empty key that are not obsolete, in file order.
    pub fn live_entries(&self) -> impl Iterator<Item = &StringEntry> {
        self.entries
            .iter()
            .filter(|entry| !entry.key.is_empty() && !entry.obsolete)
    }

    /// Lay one entry over this catalog.
    ///
    /// A missing key is appended as-is (an obsolete entry with the same
    /// identity is replaced in place). An existing key takes the incoming
    /// translation according to `precedence`; an empty incoming value never
    /// blanks an existing one.
    pub fn overlay(&mut self, incoming: &StringEntry, precedence: Precedence) -> KeyAction {
        let position = self.index.get(&incoming.id()).copied();
        let Some(i) = position else {
            self.push(incoming.clone());
            return KeyAction::Added;
        };

        let existing = &mut self.entries[i];
        if existing.obsolete {
            *existing = incoming.clone();
            return KeyAction::Added;
        }
        if !incoming.is_translated() || existing.translation_eq(incoming) {
            return KeyAction::Unchanged;
        }
        match precedence {
            Precedence::Existing if existing.is_translated() => KeyAction::Unchanged,
            Precedence::Existing | Precedence::Incoming => {
                existing.adopt_translation(incoming);
                KeyAction::Updated
            }
        }
    }

    /// Replace the translation of an existing live key.
    ///
    /// Returns `false` if the key is absent, obsolete, or already holds `value`.
    pub fn set_translation(&mut self, id: &str, value: &str) -> bool {
        match self.get_mut(id) {
            Some(entry) if !entry.obsolete && entry.value != value => {
                entry.value = value.to_string();
                true
            }
            _ => false,
        }
    }
}
