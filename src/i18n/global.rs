// SPDX-License-Identifier: MPL-2.0
//! Process-wide catalog store.
//!
//! Hosts call [`install`] once at startup and may [`uninstall`] at teardown.
//! Without an installed store the `tr` family returns the source text, so
//! code using it keeps working in tests that never install one.

use super::store::CatalogStore;
use arc_swap::ArcSwapOption;
use std::sync::{Arc, LazyLock};

static STORE: LazyLock<ArcSwapOption<CatalogStore>> = LazyLock::new(ArcSwapOption::empty);

/// Makes `store` the process-wide store, returning the previous one.
pub fn install(store: Arc<CatalogStore>) -> Option<Arc<CatalogStore>> {
    tracing::debug!(locale = %store.current_locale(), "catalog store installed");
    STORE.swap(Some(store))
}

/// Removes the process-wide store, returning it.
pub fn uninstall() -> Option<Arc<CatalogStore>> {
    STORE.swap(None)
}

pub fn store() -> Option<Arc<CatalogStore>> {
    STORE.load_full()
}

pub fn tr(context: &str, source: &str) -> String {
    tr_disambiguated(context, source, None)
}

pub fn tr_disambiguated(context: &str, source: &str, disambiguation: Option<&str>) -> String {
    match STORE.load().as_deref() {
        Some(store) => store.lookup(context, source, disambiguation),
        None => source.to_string(),
    }
}

/// Plural lookup with `%n` replaced by `count`.
pub fn tr_plural(context: &str, source: &str, count: i64) -> String {
    match STORE.load().as_deref() {
        Some(store) => store.format_plural(context, source, count, None),
        None => source.replace("%n", &count.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{LoadOptions, SourceRegistry};
    use std::fs;

    // One test: the handle is shared by every test thread of this binary.
    #[test]
    fn install_and_uninstall_round_trip() {
        assert_eq!(tr("CanvasGridView", "Icon size"), "Icon size");
        assert_eq!(tr_plural("Frame", "%n items", 3), "3 items");

        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dde-desktop_bg.ts"),
            r#"<TS language="bg"><context><name>Frame</name>
            <message numerus="yes"><source>%n items</source><translation>
                <numerusform>%n елемент</numerusform>
                <numerusform>%n елемента</numerusform>
            </translation></message>
            </context></TS>"#,
        )
        .unwrap();
        let shared = Arc::new(CatalogStore::new(
            SourceRegistry::new()
                .with_bundled(true)
                .with_directory(dir.path()),
            LoadOptions::default(),
            "en".parse().unwrap(),
        ));
        shared.reload(&"bg".parse().unwrap()).unwrap();
        assert!(install(Arc::clone(&shared)).is_none());

        assert_eq!(tr("CanvasGridView", "Icon size"), "Размер на икона");
        assert_eq!(
            tr_disambiguated("CanvasGridView", "Icon size", Some("menu")),
            "Размер на икона"
        );
        assert_eq!(tr_plural("Frame", "%n items", 1), "1 елемент");
        assert_eq!(tr_plural("Frame", "%n items", 3), "3 елемента");
        assert!(store().is_some());

        let removed = uninstall().expect("store was installed");
        assert!(Arc::ptr_eq(&removed, &shared));
        assert_eq!(tr("CanvasGridView", "Icon size"), "Icon size");
        assert!(store().is_none());
        assert_eq!(tr_plural("Frame", "%n items", 3), "3 items");
    }
}
