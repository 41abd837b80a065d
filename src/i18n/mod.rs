// SPDX-License-Identifier: MPL-2.0
//! Translation catalogs for Qt-style desktop components.
//!
//! This module loads Qt Linguist `.ts` catalogs (and their TOML or compiled
//! equivalents), merges them into an immutable [`Catalog`] per locale, and
//! resolves `(context, source, disambiguation)` lookups against it.
//!
//! # Features
//!
//! - Locale detection from an explicit request, the configuration, or the OS
//! - Layered sources: generic language first, then region, then user files
//! - Plural form selection driven by per-language rules
//! - Atomic catalog replacement on locale change via [`CatalogStore::reload`]
//! - Fallback to the source text when a translation is missing

pub mod catalog;
pub mod global;
pub mod locale;
pub mod plural;
pub mod registry;
pub mod source;
pub mod store;
mod ts;

pub use catalog::{Catalog, Entry, EntryKey, LoadOptions, LoadReport, Translation};
pub use locale::{candidate_tags, file_tag, parse_locale, resolve_locale};
pub use plural::{PluralCategory, PluralRule};
pub use registry::SourceRegistry;
pub use source::{
    CatalogDocument, CatalogSource, ContextDoc, Location, MessageDoc, MessageStatus,
    SourceFormat,
};
pub use store::CatalogStore;
