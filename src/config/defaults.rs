// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for configuration constants.

// ==========================================================================
// Locale Defaults
// ==========================================================================

/// Language the source strings are written in. Selecting it yields an empty
/// catalog, so every lookup returns the source text.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

// ==========================================================================
// Catalog Defaults
// ==========================================================================

/// Whether catalogs embedded in the binary are consulted.
pub const DEFAULT_USE_BUNDLED: bool = true;

/// Whether translations marked `unfinished` by translators are served.
pub const DEFAULT_INCLUDE_UNFINISHED: bool = true;

/// Catalog file extensions recognized during discovery, in load order.
pub const CATALOG_EXTENSIONS: [&str; 3] = ["ts", "toml", "cbor"];
