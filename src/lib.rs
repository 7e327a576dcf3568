//! Strata - layered translation catalogs
//!
//! Strata keeps three trees of translation catalogs in step: the upstream
//! layer pulled from the translation platform, the custom layer holding
//! strings and translations that exist only downstream, and the final layer
//! that ships, rebuilt as upstream overlaid with custom. Gettext `.po`
//! catalogs and flat JSON message maps are both supported.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, dispatch, reports)
//! - `config`: Configuration file loading and parsing
//! - `core`: Catalog model and codecs, locale paths, discovery, file trees
//! - `error`: Engine error taxonomy
//! - `ops`: The layer operations (update, merge, normalize, validate, backport)

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod ops;
