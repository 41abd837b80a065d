// SPDX-License-Identifier: MPL-2.0
//! Locale parsing, catalog file tags and startup locale resolution.

use crate::config::Config;
use unic_langid::LanguageIdentifier;

/// Parses a locale in BCP 47 (`bg-BG`) or POSIX (`bg_BG.UTF-8@euro`) form.
pub fn parse_locale(value: &str) -> Option<LanguageIdentifier> {
    let trimmed = value.trim();
    let base = trimmed
        .split(['.', '@'])
        .next()
        .unwrap_or(trimmed)
        .replace('_', "-");
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    base.parse().ok()
}

/// File-name tag of a locale, in the underscore style used by catalog files
/// (`bg`, `bg_BG`, `sr_Latn_RS`).
pub fn file_tag(locale: &LanguageIdentifier) -> String {
    let mut tag = locale.language.as_str().to_string();
    if let Some(script) = &locale.script {
        tag.push('_');
        tag.push_str(script.as_str());
    }
    if let Some(region) = &locale.region {
        tag.push('_');
        tag.push_str(region.as_str());
    }
    tag
}

/// Tags to look for when loading `locale`, most generic first.
///
/// `sr-Latn-RS` yields `sr`, `sr_Latn`, `sr_RS`, `sr_Latn_RS`.
pub fn candidate_tags(locale: &LanguageIdentifier) -> Vec<String> {
    let language = locale.language.as_str();
    let mut tags = vec![language.to_string()];
    if let Some(script) = &locale.script {
        tags.push(format!("{}_{}", language, script.as_str()));
    }
    if let Some(region) = &locale.region {
        tags.push(format!("{}_{}", language, region.as_str()));
    }
    let full = file_tag(locale);
    if !tags.contains(&full) {
        tags.push(full);
    }
    tags
}

/// Whether any tag of `locale`'s candidate chain is in `available`.
pub fn is_available(locale: &LanguageIdentifier, available: &[String]) -> bool {
    candidate_tags(locale)
        .iter()
        .any(|tag| available.iter().any(|a| a.eq_ignore_ascii_case(tag)))
}

/// Picks the startup locale: explicit request, then `general.language`, then
/// the OS locale. Only candidates with an available catalog are accepted.
pub fn resolve_locale(
    requested: Option<&str>,
    config: &Config,
    available: &[String],
) -> Option<LanguageIdentifier> {
    resolve_from(
        [
            requested.map(str::to_string),
            config.general.language.clone(),
            sys_locale::get_locale(),
        ],
        available,
    )
}

fn resolve_from(
    candidates: impl IntoIterator<Item = Option<String>>,
    available: &[String],
) -> Option<LanguageIdentifier> {
    candidates
        .into_iter()
        .flatten()
        .filter_map(|value| parse_locale(&value))
        .find(|locale| is_available(locale, available))
}
