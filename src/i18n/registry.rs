// SPDX-License-Identifier: MPL-2.0
//! Discovery of catalog sources for a locale.
//!
//! Catalog files are named `<prefix>_<tag>.<ext>` (for example
//! `dde-desktop_bg.ts`), where `tag` is a [`file_tag`] and `ext` one of
//! [`CATALOG_EXTENSIONS`]. Without a configured prefix any file whose stem
//! ends in `_<tag>` (or is exactly `<tag>`) matches.

use super::locale::{candidate_tags, file_tag, parse_locale};
use super::source::{CatalogSource, SourceFormat};
use crate::config::{Config, CATALOG_EXTENSIONS};
use crate::error::{Error, Result};
use crate::paths;
use rust_embed::RustEmbed;
use std::fs;
use std::path::{Path, PathBuf};
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "assets/translations/"]
struct Bundled;

/// Where catalog sources are looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRegistry {
    prefix: Option<String>,
    directories: Vec<PathBuf>,
    bundled: bool,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry described by the `[catalogs]` section. The user catalog
    /// directory (see [`paths::get_user_catalog_dir`]) is searched last so
    /// its files override the configured ones. It is skipped when missing.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self {
            prefix: config.catalogs.prefix.clone(),
            directories: config.catalogs.directories.clone(),
            bundled: config.catalogs.bundled,
        };
        if let Some(dir) = paths::get_user_catalog_dir().filter(|dir| dir.is_dir()) {
            if !registry.directories.contains(&dir) {
                registry.directories.push(dir);
            }
        }
        registry
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Adds a directory searched after the existing ones.
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    pub fn with_bundled(mut self, bundled: bool) -> Self {
        self.bundled = bundled;
        self
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Sources for `locale`, in merge order.
    ///
    /// Candidates go from the generic language to the full tag; within a
    /// candidate bundled catalogs come first, then directories in order.
    ///
    /// # Errors
    ///
    /// [`Error::LocaleNotFound`] when no candidate has any source, or an I/O
    /// error from reading a matching file.
    pub fn sources_for(&self, locale: &LanguageIdentifier) -> Result<Vec<CatalogSource>> {
        let mut sources = Vec::new();
        for tag in candidate_tags(locale) {
            if self.bundled {
                for name in self.bundled_names(&tag) {
                    if let Some(file) = Bundled::get(&name) {
                        let format = format_of(Path::new(&name), &file.data);
                        sources.push(CatalogSource::from_bytes(
                            format!("bundled:{}", name),
                            format,
                            file.data,
                        ));
                    }
                }
            }
            for dir in &self.directories {
                for path in self.files_in(dir, &tag) {
                    sources.push(CatalogSource::from_path(&path)?);
                }
            }
        }

        if sources.is_empty() {
            return Err(Error::LocaleNotFound(file_tag(locale)));
        }
        tracing::debug!(
            locale = %locale,
            sources = sources.len(),
            "catalog sources discovered"
        );
        Ok(sources)
    }

    /// Every tag with at least one catalog source, sorted.
    pub fn available_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if self.bundled {
            tags.extend(Bundled::iter().filter_map(|name| self.tag_of(Path::new(&*name))));
        }
        for dir in &self.directories {
            tags.extend(
                catalog_files(dir)
                    .into_iter()
                    .filter_map(|path| self.tag_of(&path)),
            );
        }
        tags.sort();
        tags.dedup();
        tags
    }

    /// Every locale with at least one catalog source.
    pub fn available_locales(&self) -> Vec<LanguageIdentifier> {
        self.available_tags()
            .iter()
            .filter_map(|tag| parse_locale(tag))
            .collect()
    }

    fn bundled_names(&self, tag: &str) -> Vec<String> {
        let mut names: Vec<String> = Bundled::iter()
            .filter(|name| self.matches(Path::new(&**name), tag))
            .map(|name| name.into_owned())
            .collect();
        names.sort();
        names
    }

    fn files_in(&self, dir: &Path, tag: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = catalog_files(dir)
            .into_iter()
            .filter(|path| self.matches(path, tag))
            .collect();
        files.sort_by_key(|path| sort_key(path));
        files
    }

    fn matches(&self, path: &Path, tag: &str) -> bool {
        self.tag_of(path)
            .is_some_and(|found| found.eq_ignore_ascii_case(tag))
    }

    /// The locale tag encoded in a catalog file name.
    fn tag_of(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        if !CATALOG_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let tag = match &self.prefix {
            Some(prefix) => stem.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
            None => strip_any_prefix(stem),
        };
        let locale = parse_locale(tag)?;
        // Reject stems like `notes_v2` that happen to parse loosely.
        file_tag(&locale).eq_ignore_ascii_case(tag).then(|| file_tag(&locale))
    }
}

/// `dde-desktop_bg_BG` -> `bg_BG`, `dde-desktop_bg` -> `bg`, `bg` -> `bg`.
fn strip_any_prefix(stem: &str) -> &str {
    let parts: Vec<&str> = stem.split('_').collect();
    let trailing = parts
        .iter()
        .rev()
        .take_while(|part| is_script_or_region(part))
        .count();
    let start = parts.len().saturating_sub(trailing + 1);
    let consumed: usize = parts[..start].iter().map(|part| part.len() + 1).sum();
    &stem[consumed..]
}

/// Script (`Latn`) or region (`BG`, `419`) subtag.
fn is_script_or_region(part: &str) -> bool {
    let is_region = (part.len() == 2 && part.chars().all(|c| c.is_ascii_uppercase()))
        || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()));
    let is_script = part.len() == 4
        && part.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && part.chars().skip(1).all(|c| c.is_ascii_lowercase());
    is_region || is_script
}

fn catalog_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect()
}

/// Orders files by extension load order, then name.
fn sort_key(path: &Path) -> (usize, PathBuf) {
    let rank = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            CATALOG_EXTENSIONS
                .iter()
                .position(|e| e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(CATALOG_EXTENSIONS.len());
    (rank, path.to_path_buf())
}

fn format_of(path: &Path, bytes: &[u8]) -> SourceFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension)
        .unwrap_or_else(|| SourceFormat::sniff(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FRAME_BG: &str = r#"<TS language="bg"><context><name>Frame</name>
        <message><source>Apply</source><translation>Приложи</translation></message>
        </context></TS>"#;

    #[test]
    fn strip_any_prefix_keeps_locale_subtags() {
        assert_eq!(strip_any_prefix("dde-desktop_bg"), "bg");
        assert_eq!(strip_any_prefix("dde-desktop_bg_BG"), "bg_BG");
        assert_eq!(strip_any_prefix("app_sr_Latn_RS"), "sr_Latn_RS");
        assert_eq!(strip_any_prefix("es_419"), "es_419");
        assert_eq!(strip_any_prefix("bg"), "bg");
    }

    #[test]
    fn bundled_catalog_is_discovered() {
        let registry = SourceRegistry::new().with_bundled(true);
        assert!(registry.available_tags().contains(&"bg".to_string()));

        let sources = registry.sources_for(&"bg".parse().unwrap()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].format(), SourceFormat::Ts);
        assert!(sources[0].origin().starts_with("bundled:"));
    }

    #[test]
    fn unknown_locale_is_not_found() {
        let registry = SourceRegistry::new().with_bundled(true);
        let err = registry.sources_for(&"fi".parse().unwrap()).unwrap_err();
        assert_eq!(err, Error::LocaleNotFound("fi".to_string()));
    }

    #[test]
    fn directory_sources_follow_bundled_and_specific_follow_generic() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dde-desktop_bg_BG.ts"), FRAME_BG).unwrap();
        fs::write(dir.path().join("dde-desktop_bg.ts"), FRAME_BG).unwrap();
        fs::write(dir.path().join("dde-desktop_ru.ts"), FRAME_BG).unwrap();
        fs::write(dir.path().join("README.md"), "not a catalog").unwrap();

        let registry = SourceRegistry::new()
            .with_bundled(true)
            .with_directory(dir.path());
        let sources = registry.sources_for(&"bg-BG".parse().unwrap()).unwrap();
        let origins: Vec<&str> = sources.iter().map(|s| s.origin()).collect();

        assert_eq!(origins.len(), 3);
        assert!(origins[0].starts_with("bundled:"));
        assert!(origins[1].ends_with("dde-desktop_bg.ts"));
        assert!(origins[2].ends_with("dde-desktop_bg_BG.ts"));
    }

    #[test]
    fn prefix_filters_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dde-desktop_bg.ts"), FRAME_BG).unwrap();
        fs::write(dir.path().join("dde-file-manager_bg.ts"), FRAME_BG).unwrap();

        let registry = SourceRegistry::new()
            .with_prefix("dde-desktop")
            .with_directory(dir.path());
        let sources = registry.sources_for(&"bg".parse().unwrap()).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].origin().ends_with("dde-desktop_bg.ts"));
    }

    #[test]
    fn available_locales_lists_directory_and_bundled_tags() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("shell_ru.toml"), "").unwrap();
        fs::write(dir.path().join("shell_pt_BR.ts"), FRAME_BG).unwrap();
        fs::write(dir.path().join("shell_notes.txt"), "").unwrap();

        let registry = SourceRegistry::new()
            .with_bundled(true)
            .with_directory(dir.path());
        assert_eq!(registry.available_tags(), vec!["bg", "pt_BR", "ru"]);
        assert_eq!(registry.available_locales().len(), 3);
    }

    #[test]
    fn missing_directory_is_ignored() {
        let registry = SourceRegistry::new().with_directory("/nonexistent/tscat/catalogs");
        assert!(registry.available_tags().is_empty());
    }

    #[test]
    fn from_config_copies_catalog_section() {
        let mut config = Config::default();
        config.catalogs.prefix = Some("dde-desktop".to_string());
        config.catalogs.directories = vec![PathBuf::from("/usr/share/dde-desktop/translations")];
        config.catalogs.bundled = false;

        let registry = SourceRegistry::from_config(&config);
        assert_eq!(
            registry.directories()[0],
            PathBuf::from("/usr/share/dde-desktop/translations")
        );
        assert!(!registry.bundled);
        assert_eq!(registry.prefix.as_deref(), Some("dde-desktop"));
    }
}
