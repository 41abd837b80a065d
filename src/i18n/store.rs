// SPDX-License-Identifier: MPL-2.0
//! The active catalog and its replacement on locale change.
//!
//! [`CatalogStore`] owns the published [`Catalog`] behind an [`ArcSwap`].
//! Lookups load the current pointer without locking; [`CatalogStore::reload`]
//! builds a complete new catalog before swapping it in, so a reader sees
//! either the old catalog or the new one and never a mixture. Reloads are
//! serialized by a mutex so two locale changes cannot interleave.

use super::catalog::{Catalog, LoadOptions};
use super::locale::{file_tag, parse_locale, resolve_locale};
use super::registry::SourceRegistry;
use crate::config::Config;
use crate::error::{Error, Result};
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};
use unic_langid::LanguageIdentifier;

pub struct CatalogStore {
    registry: SourceRegistry,
    options: LoadOptions,
    source_language: LanguageIdentifier,
    active: ArcSwap<Catalog>,
    reload_lock: Mutex<()>,
}

impl CatalogStore {
    /// A store serving `source_language` with an empty catalog until the
    /// first [`reload`](Self::reload).
    pub fn new(
        registry: SourceRegistry,
        options: LoadOptions,
        source_language: LanguageIdentifier,
    ) -> Self {
        let initial = Catalog::empty(source_language.clone());
        Self {
            registry,
            options,
            source_language,
            active: ArcSwap::from_pointee(initial),
            reload_lock: Mutex::new(()),
        }
    }

    /// Builds the store described by `config` and loads the startup locale.
    ///
    /// The locale comes from `requested`, then `general.language`, then the
    /// OS. The source language always counts as available. When none of them
    /// has a catalog the store stays on the source language.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when `general.source_language` is not a locale, or
    /// the load error of the resolved locale.
    pub fn from_config(config: &Config, requested: Option<&str>) -> Result<Self> {
        let source_language = parse_locale(&config.general.source_language).ok_or_else(|| {
            Error::Config(format!(
                "invalid source language '{}'",
                config.general.source_language
            ))
        })?;
        let options = LoadOptions {
            include_unfinished: config.catalogs.include_unfinished,
        };
        let store = Self::new(SourceRegistry::from_config(config), options, source_language);

        let mut available = store.registry.available_tags();
        available.push(file_tag(&store.source_language));
        match resolve_locale(requested, config, &available) {
            Some(locale) => {
                store.reload(&locale)?;
            }
            None => {
                tracing::warn!(
                    requested = requested.unwrap_or(""),
                    fallback = %store.source_language,
                    "no catalog for the requested locale, serving source text"
                );
            }
        }
        Ok(store)
    }

    /// Builds the catalog for `locale` and publishes it.
    ///
    /// A source-language request without any catalog source (say `en-GB`
    /// with no `_en` or `_en_GB` file) publishes an empty catalog. On error
    /// the published catalog is left as it was.
    ///
    /// # Errors
    ///
    /// [`Error::LocaleNotFound`] when the registry has no source for
    /// `locale`, [`Error::MalformedCatalog`] when a source does not parse.
    pub fn reload(&self, locale: &LanguageIdentifier) -> Result<Arc<Catalog>> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let catalog = match self.registry.sources_for(locale) {
            Ok(sources) => Catalog::load_with(locale.clone(), &sources, self.options)?,
            Err(Error::LocaleNotFound(_))
                if locale.language == self.source_language.language =>
            {
                Catalog::empty(locale.clone())
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            locale = %locale,
            entries = catalog.len(),
            sources = catalog.report().sources.len(),
            overridden = catalog.report().overridden.len(),
            "catalog published"
        );

        let catalog = Arc::new(catalog);
        self.active.store(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// The published catalog. The snapshot stays valid, and unchanged, across
    /// later reloads.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.active.load_full()
    }

    pub fn current_locale(&self) -> LanguageIdentifier {
        self.active.load().locale().clone()
    }

    pub fn source_language(&self) -> &LanguageIdentifier {
        &self.source_language
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn available_locales(&self) -> Vec<LanguageIdentifier> {
        self.registry.available_locales()
    }

    pub fn lookup(&self, context: &str, source: &str, disambiguation: Option<&str>) -> String {
        self.active
            .load()
            .lookup(context, source, disambiguation)
            .to_string()
    }

    pub fn lookup_plural(
        &self,
        context: &str,
        source: &str,
        count: i64,
        disambiguation: Option<&str>,
    ) -> String {
        self.active
            .load()
            .lookup_plural(context, source, count, disambiguation)
            .to_string()
    }

    pub fn format_plural(
        &self,
        context: &str,
        source: &str,
        count: i64,
        disambiguation: Option<&str>,
    ) -> String {
        self.active
            .load()
            .format_plural(context, source, count, disambiguation)
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("source_language", &self.source_language)
            .field("current_locale", &self.current_locale())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    fn en() -> LanguageIdentifier {
        "en".parse().unwrap()
    }

    fn bundled_store() -> CatalogStore {
        CatalogStore::new(
            SourceRegistry::new().with_bundled(true),
            LoadOptions::default(),
            en(),
        )
    }

    #[test]
    fn new_store_serves_source_text() {
        let store = bundled_store();
        assert_eq!(store.current_locale(), en());
        assert_eq!(store.lookup("CanvasGridView", "Icon size", None), "Icon size");
    }

    const WINDOWS_BG: &str = r#"<TS language="bg"><context><name>ZoneMainWindow</name>
        <message numerus="yes"><source>%n window(s)</source><translation>
            <numerusform>%n прозорец</numerusform>
            <numerusform>%n прозореца</numerusform>
        </translation></message>
        </context></TS>"#;

    #[test]
    fn reload_switches_locale() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dde-desktop_bg.ts"), WINDOWS_BG).unwrap();
        let store = CatalogStore::new(
            SourceRegistry::new().with_bundled(true).with_directory(dir.path()),
            LoadOptions::default(),
            en(),
        );
        let catalog = store.reload(&"bg".parse().unwrap()).unwrap();

        assert_eq!(catalog.locale().to_string(), "bg");
        assert_eq!(store.current_locale().to_string(), "bg");
        assert_eq!(
            store.lookup("CanvasGridView", "Icon size", None),
            "Размер на икона"
        );
        assert_eq!(
            store.lookup_plural("ZoneMainWindow", "%n window(s)", 1, None),
            "%n прозорец"
        );
        assert_eq!(
            store.format_plural("ZoneMainWindow", "%n window(s)", 4, None),
            "4 прозореца"
        );
    }

    #[test]
    fn regional_source_language_catalog_is_loaded() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("shell_en_GB.ts"),
            r#"<TS language="en_GB"><context><name>Frame</name>
            <message><source>Color</source><translation>Colour</translation></message>
            </context></TS>"#,
        )
        .unwrap();
        let store = CatalogStore::new(
            SourceRegistry::new().with_directory(dir.path()),
            LoadOptions::default(),
            en(),
        );

        let catalog = store.reload(&"en-GB".parse().unwrap()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(store.lookup("Frame", "Color", None), "Colour");

        let catalog = store.reload(&"en-US".parse().unwrap()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(store.lookup("Frame", "Color", None), "Color");
    }

    #[test]
    fn reload_back_to_source_language_is_empty() {
        let store = bundled_store();
        store.reload(&"bg".parse().unwrap()).unwrap();
        let catalog = store.reload(&en()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(store.lookup("CanvasGridView", "Icon size", None), "Icon size");
    }

    #[test]
    fn failed_reload_keeps_published_catalog() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app_ru.ts"), "<TS language=\"ru\"><context>").unwrap();
        let store = CatalogStore::new(
            SourceRegistry::new().with_bundled(true).with_directory(dir.path()),
            LoadOptions::default(),
            en(),
        );
        store.reload(&"bg".parse().unwrap()).unwrap();

        let malformed = store.reload(&"ru".parse().unwrap()).unwrap_err();
        assert!(matches!(malformed, Error::MalformedCatalog { .. }));
        let missing = store.reload(&"fi".parse().unwrap()).unwrap_err();
        assert_eq!(missing, Error::LocaleNotFound("fi".to_string()));

        assert_eq!(store.current_locale().to_string(), "bg");
        assert_eq!(
            store.lookup("CanvasGridView", "Icon size", None),
            "Размер на икона"
        );
    }

    #[test]
    fn snapshot_survives_reload() {
        let store = bundled_store();
        store.reload(&"bg".parse().unwrap()).unwrap();
        let before = store.snapshot();
        store.reload(&en()).unwrap();

        assert_eq!(
            before.lookup("CanvasGridView", "Icon size", None),
            "Размер на икона"
        );
        assert_eq!(store.lookup("CanvasGridView", "Icon size", None), "Icon size");
    }

    #[test]
    fn concurrent_lookups_see_whole_catalogs() {
        let store = Arc::new(bundled_store());
        store.reload(&"bg".parse().unwrap()).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let catalog = store.snapshot();
                        let icon = catalog.lookup("CanvasGridView", "Icon size", None);
                        let auto = catalog.lookup("CanvasGridView", "Auto arrange", None);
                        match catalog.locale().language.as_str() {
                            "bg" => {
                                assert_eq!(icon, "Размер на икона");
                                assert_eq!(auto, "Автоматична подредба");
                            }
                            _ => {
                                assert_eq!(icon, "Icon size");
                                assert_eq!(auto, "Auto arrange");
                            }
                        }
                    }
                })
            })
            .collect();

        for i in 0..50 {
            let locale = if i % 2 == 0 { en() } else { "bg".parse().unwrap() };
            store.reload(&locale).unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn from_config_falls_back_to_source_language() {
        let mut config = Config::default();
        config.general.language = Some("fi".to_string());
        config.catalogs.bundled = false;

        let store = CatalogStore::from_config(&config, Some("fi")).unwrap();
        // The OS locale may be anything; without catalogs only English resolves.
        assert_eq!(store.current_locale().language.as_str(), "en");
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn from_config_loads_requested_locale() {
        let config = Config::default();
        let store = CatalogStore::from_config(&config, Some("bg_BG.UTF-8")).unwrap();
        assert_eq!(store.current_locale().to_string(), "bg-BG");
        assert_eq!(
            store.lookup("CanvasGridView", "Icon size", None),
            "Размер на икона"
        );
    }

    #[test]
    fn from_config_rejects_bad_source_language() {
        let mut config = Config::default();
        config.general.source_language = "C".to_string();
        assert!(matches!(
            CatalogStore::from_config(&config, None),
            Err(Error::Config(_))
        ));
    }
}
