// SPDX-License-Identifier: MPL-2.0
//! `tscat` resolves translated UI strings from Qt Linguist catalogs.
//!
//! A [`i18n::CatalogStore`] owns the catalog of the active locale and swaps
//! it atomically when the locale changes, while readers keep using whichever
//! [`i18n::Catalog`] they already hold.

#![doc(html_root_url = "https://docs.rs/tscat/0.3.0")]

pub mod config;
pub mod error;
pub mod i18n;
pub mod paths;
