//! Layer model: catalogs, locale path templates, discovery and tree helpers.

pub mod catalog;
pub mod discover;
pub mod locale_path;
pub mod tree;
pub mod workspace;

pub use catalog::{Catalog, CatalogFormat, KeyAction, Precedence, StringEntry};
pub use discover::discover_languages;
pub use locale_path::LocaleTemplate;
pub use workspace::Workspace;
