// SPDX-License-Identifier: MPL-2.0
//! Immutable translation catalog for one locale.
//!
//! # Invariants
//!
//! 1. **Built once**: a [`Catalog`] only comes out of [`Catalog::load`] (or
//!    the other constructors) fully merged. There is no mutable API.
//! 2. **Lookups never fail**: a missing entry resolves to the source text.
//! 3. **Later wins**: when two sources define the same
//!    `(context, source, disambiguation)` key, the later one replaces the
//!    whole entry, and the override is recorded in the [`LoadReport`].
//! 4. **Provenance is inert**: entry locations are kept for tooling and are
//!    never consulted while resolving.

use super::plural::PluralRule;
use super::source::{
    write_compiled, CatalogDocument, CatalogSource, ContextDoc, Location, MessageDoc,
    MessageStatus,
};
use crate::config::DEFAULT_INCLUDE_UNFINISHED;
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use unic_langid::LanguageIdentifier;

/// Plural indices at or above this bound are rejected as bogus.
const MAX_PLURAL_FORMS: usize = 16;

/// Composite identity of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub context: String,
    pub source: String,
    pub disambiguation: Option<String>,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.context, self.source)?;
        if let Some(disambiguation) = &self.disambiguation {
            write!(f, " ({})", disambiguation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Text(String),
    /// Plural forms in the order of the locale's plural categories. A `None`
    /// slot is a form the sources did not provide.
    Plural(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    disambiguation: Option<String>,
    translation: Translation,
    location: Option<Location>,
}

impl Entry {
    pub fn disambiguation(&self) -> Option<&str> {
        self.disambiguation.as_deref()
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// Knobs applied while merging sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Serve translations marked `unfinished`.
    pub include_unfinished: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            include_unfinished: DEFAULT_INCLUDE_UNFINISHED,
        }
    }
}

/// What happened while a catalog was merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Origins of the merged sources, in load order.
    pub sources: Vec<String>,
    /// Keys whose earlier definition was replaced.
    pub overridden: Vec<EntryKey>,
    /// Records not indexed: empty, obsolete, or excluded unfinished translations.
    pub skipped: usize,
}

/// Source text -> entries differing only by disambiguation.
type SourceIndex = HashMap<String, Vec<Entry>>;

/// Immutable index of translations for one locale.
///
/// # Example
///
/// ```
/// use tscat::i18n::{Catalog, CatalogSource, SourceFormat};
///
/// let source = CatalogSource::from_text(
///     "desktop_bg.toml",
///     SourceFormat::Toml,
///     r#"
/// [[context]]
/// name = "CanvasGridView"
/// [[context.message]]
/// source = "Icon size"
/// translation = "Размер на икона"
/// "#,
/// );
/// let catalog = Catalog::load("bg".parse().unwrap(), &[source]).unwrap();
///
/// assert_eq!(catalog.lookup("CanvasGridView", "Icon size", None), "Размер на икона");
/// assert_eq!(catalog.lookup("CanvasGridView", "Nonexistent String", None), "Nonexistent String");
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    locale: LanguageIdentifier,
    plural_rule: Option<PluralRule>,
    contexts: HashMap<String, SourceIndex>,
    len: usize,
    report: LoadReport,
}

impl Catalog {
    /// A catalog without entries: every lookup returns the source text.
    pub fn empty(locale: LanguageIdentifier) -> Self {
        CatalogBuilder::new(locale, LoadOptions::default()).build()
    }

    /// Parses every source and merges them, later sources overriding earlier ones.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::MalformedCatalog`] for the first source that does not parse.
    pub fn load(locale: LanguageIdentifier, sources: &[CatalogSource]) -> Result<Self> {
        Self::load_with(locale, sources, LoadOptions::default())
    }

    pub fn load_with(
        locale: LanguageIdentifier,
        sources: &[CatalogSource],
        options: LoadOptions,
    ) -> Result<Self> {
        let mut builder = CatalogBuilder::new(locale, options);
        for source in sources {
            let document = source.parse()?;
            builder.add_document(source.origin(), document);
        }
        Ok(builder.build())
    }

    /// Merges already parsed documents, in order.
    pub fn from_documents<I, S>(
        locale: LanguageIdentifier,
        documents: I,
        options: LoadOptions,
    ) -> Self
    where
        I: IntoIterator<Item = (S, CatalogDocument)>,
        S: Into<String>,
    {
        let mut builder = CatalogBuilder::new(locale, options);
        for (origin, document) in documents {
            builder.add_document(origin.into(), document);
        }
        builder.build()
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Plural rule of the locale, `None` when the language has no plural data.
    pub fn plural_rule(&self) -> Option<PluralRule> {
        self.plural_rule
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Context names, sorted.
    pub fn contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The entry stored under exactly this key.
    pub fn entry(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&Entry> {
        let disambiguation = disambiguation.filter(|d| !d.is_empty());
        self.contexts
            .get(context)?
            .get(source)?
            .iter()
            .find(|entry| entry.disambiguation.as_deref() == disambiguation)
    }

    /// Exact key first; a disambiguated miss retries without disambiguation.
    fn resolve(
        &self,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&Entry> {
        let disambiguation = disambiguation.filter(|d| !d.is_empty());
        let variants = self.contexts.get(context)?.get(source)?;
        variants
            .iter()
            .find(|entry| entry.disambiguation.as_deref() == disambiguation)
            .or_else(|| {
                disambiguation?;
                variants.iter().find(|entry| entry.disambiguation.is_none())
            })
    }

    /// Translated text for the key, or `source` unchanged when there is none.
    pub fn lookup<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        disambiguation: Option<&str>,
    ) -> &'a str {
        match self.resolve(context, source, disambiguation) {
            Some(Entry {
                translation: Translation::Text(text),
                ..
            }) => text,
            Some(Entry {
                translation: Translation::Plural(forms),
                ..
            }) => forms.first().and_then(Option::as_deref).unwrap_or(source),
            None => source,
        }
    }

    /// Plural form of the key serving `count`.
    ///
    /// Falls back to the singular translation when the entry has no plural
    /// forms, to the first form when the locale has no plural rule, and to
    /// `source` when the entry or the selected form is missing. A selected
    /// index beyond the stored forms uses the last stored form.
    pub fn lookup_plural<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        count: i64,
        disambiguation: Option<&str>,
    ) -> &'a str {
        let Some(entry) = self.resolve(context, source, disambiguation) else {
            return source;
        };
        match &entry.translation {
            Translation::Text(text) => text,
            Translation::Plural(forms) => {
                let index = self.plural_rule.map_or(0, |rule| rule.form_index(count));
                let index = index.min(forms.len().saturating_sub(1));
                forms.get(index).and_then(Option::as_deref).unwrap_or(source)
            }
        }
    }

    /// [`Self::lookup_plural`] with `%n` replaced by `count`.
    pub fn format_plural(
        &self,
        context: &str,
        source: &str,
        count: i64,
        disambiguation: Option<&str>,
    ) -> String {
        self.lookup_plural(context, source, count, disambiguation)
            .replace("%n", &count.to_string())
    }

    /// Every entry as a document, contexts and sources sorted.
    pub fn to_document(&self) -> CatalogDocument {
        let mut contexts: Vec<(&String, &SourceIndex)> = self.contexts.iter().collect();
        contexts.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let contexts = contexts
            .into_iter()
            .map(|(name, index)| {
                let mut sources: Vec<(&String, &Vec<Entry>)> = index.iter().collect();
                sources.sort_unstable_by(|a, b| a.0.cmp(b.0));
                let mut messages = Vec::new();
                for (source, entries) in sources {
                    for entry in entries {
                        let template = MessageDoc {
                            disambiguation: entry.disambiguation.clone(),
                            location: entry.location.clone(),
                            ..MessageDoc::new(source.clone(), String::new())
                        };
                        match &entry.translation {
                            Translation::Text(text) => messages.push(MessageDoc {
                                translation: text.clone(),
                                ..template
                            }),
                            Translation::Plural(forms) => {
                                for (index, form) in forms.iter().enumerate() {
                                    if let Some(form) = form {
                                        messages.push(MessageDoc {
                                            translation: form.clone(),
                                            plural_index: Some(index),
                                            ..template.clone()
                                        });
                                    }
                                }
                            }
                        }
                    }
                }
                ContextDoc {
                    name: name.clone(),
                    messages,
                }
            })
            .collect();

        CatalogDocument {
            language: Some(self.locale.to_string()),
            contexts,
        }
    }

    /// Writes the catalog in the compiled (CBOR) format, loadable as a
    /// [`super::SourceFormat::Compiled`] source.
    pub fn compile<W: Write>(&self, writer: W) -> Result<()> {
        write_compiled(self.to_document(), writer)
    }
}

/// The catalog while sources are still being merged.
struct CatalogBuilder {
    locale: LanguageIdentifier,
    options: LoadOptions,
    contexts: HashMap<String, HashMap<String, Vec<(usize, Entry)>>>,
    generation: usize,
    report: LoadReport,
}

impl CatalogBuilder {
    fn new(locale: LanguageIdentifier, options: LoadOptions) -> Self {
        Self {
            locale,
            options,
            contexts: HashMap::new(),
            generation: 0,
            report: LoadReport::default(),
        }
    }

    fn add_document(&mut self, origin: impl Into<String>, document: CatalogDocument) {
        let origin = origin.into();
        self.generation += 1;

        if let Some(declared) = document.language.as_deref() {
            let declared_language = declared.split(['_', '-']).next().unwrap_or(declared);
            if !declared_language.eq_ignore_ascii_case(self.locale.language.as_str()) {
                tracing::warn!(
                    origin = %origin,
                    declared = declared,
                    locale = %self.locale,
                    "catalog source declares a different language"
                );
            }
        }

        for context in document.contexts {
            for message in context.messages {
                self.insert(&context.name, message);
            }
        }
        self.report.sources.push(origin);
    }

    fn insert(&mut self, context: &str, message: MessageDoc) {
        let excluded = match message.status {
            MessageStatus::Finished => false,
            MessageStatus::Unfinished => !self.options.include_unfinished,
            MessageStatus::Obsolete => true,
        };
        let bogus_index = message.plural_index.is_some_and(|i| i >= MAX_PLURAL_FORMS);
        if excluded || bogus_index || message.translation.is_empty() {
            self.report.skipped += 1;
            return;
        }

        let generation = self.generation;
        let disambiguation = message.disambiguation.filter(|d| !d.is_empty());
        let variants = self
            .contexts
            .entry(context.to_string())
            .or_default()
            .entry(message.source.clone())
            .or_default();
        let slot = variants
            .iter()
            .position(|(_, entry)| entry.disambiguation == disambiguation);

        let fresh = |translation: String, location: Option<Location>| {
            let translation = match message.plural_index {
                None => Translation::Text(translation),
                Some(index) => {
                    let mut forms = vec![None; index + 1];
                    forms[index] = Some(translation);
                    Translation::Plural(forms)
                }
            };
            Entry {
                disambiguation: disambiguation.clone(),
                translation,
                location,
            }
        };

        let overridden = match slot {
            None => {
                variants.push((generation, fresh(message.translation, message.location)));
                false
            }
            Some(slot) => {
                let (existing_generation, existing) = &mut variants[slot];
                let extends_plural = *existing_generation == generation
                    && matches!(existing.translation, Translation::Plural(_));
                match (&mut existing.translation, message.plural_index) {
                    (Translation::Plural(forms), Some(index)) if extends_plural => {
                        if forms.len() <= index {
                            forms.resize(index + 1, None);
                        }
                        let replaced = forms[index].replace(message.translation).is_some();
                        if existing.location.is_none() {
                            existing.location = message.location;
                        }
                        replaced
                    }
                    _ => {
                        *existing_generation = generation;
                        *existing = fresh(message.translation, message.location);
                        true
                    }
                }
            }
        };

        if overridden {
            let key = EntryKey {
                context: context.to_string(),
                source: message.source,
                disambiguation,
            };
            tracing::debug!(key = %key, "catalog entry overridden");
            self.report.overridden.push(key);
        }
    }

    fn build(self) -> Catalog {
        let plural_rule = PluralRule::for_language(
            self.locale.language.as_str(),
            self.locale.region.as_ref().map(|region| region.as_str()),
        );
        let mut len = 0;
        let contexts = self
            .contexts
            .into_iter()
            .map(|(name, index)| {
                let index: SourceIndex = index
                    .into_iter()
                    .map(|(source, variants)| {
                        len += variants.len();
                        (source, variants.into_iter().map(|(_, entry)| entry).collect())
                    })
                    .collect();
                (name, index)
            })
            .collect();

        Catalog {
            locale: self.locale,
            plural_rule,
            contexts,
            len,
            report: self.report,
        }
    }
}
