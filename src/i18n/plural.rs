// SPDX-License-Identifier: MPL-2.0
//! Plural rules keyed by language.
//!
//! A catalog message with plural forms stores one translation per form, in
//! the order of the rule's [`PluralRule::categories`]. Selecting a form is
//! `categorize(count)` followed by a position lookup in that list, so the
//! number of forms a language needs and the function choosing among them
//! both live in one table row.
//!
//! Negative counts are categorized by their absolute value.

use std::fmt;

/// CLDR-style plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// Families of plural rules sharing a categorize function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// A single form (ja, zh, ko, vi, tr, ...).
    Invariant,
    /// `one` for 1, `other` otherwise (en, bg, de, ...).
    OneOther,
    /// `one` for 0 and 1, `other` otherwise (fr, pt-BR).
    ZeroOneOther,
    /// East and South Slavic three-form rule (ru, uk, be, sr, hr, bs).
    EastSlavic,
    /// `one` for 1, `few` for 2-4 outside the teens, `many` otherwise.
    Polish,
    /// `one` for 1, `few` for 2-4, `other` otherwise (cs, sk).
    CzechSlovak,
    /// Four forms keyed on `n % 100` (sl).
    Slovenian,
    /// Three forms for Lithuanian.
    Lithuanian,
    /// Three forms in Qt order: singular, plural, then a form for zero (lv).
    Latvian,
    /// Three forms for Romanian.
    Romanian,
    /// Six forms (ar).
    Arabic,
}

/// Language subtag -> rule. Languages absent from the table have no plural
/// data; their catalogs serve the first form.
const PLURAL_TABLE: &[(&str, PluralRule)] = &[
    ("ja", PluralRule::Invariant),
    ("zh", PluralRule::Invariant),
    ("ko", PluralRule::Invariant),
    ("vi", PluralRule::Invariant),
    ("th", PluralRule::Invariant),
    ("id", PluralRule::Invariant),
    ("ms", PluralRule::Invariant),
    ("tr", PluralRule::Invariant),
    ("fa", PluralRule::Invariant),
    ("ka", PluralRule::Invariant),
    ("bo", PluralRule::Invariant),
    ("en", PluralRule::OneOther),
    ("bg", PluralRule::OneOther),
    ("ca", PluralRule::OneOther),
    ("da", PluralRule::OneOther),
    ("de", PluralRule::OneOther),
    ("el", PluralRule::OneOther),
    ("es", PluralRule::OneOther),
    ("et", PluralRule::OneOther),
    ("fi", PluralRule::OneOther),
    ("hu", PluralRule::OneOther),
    ("it", PluralRule::OneOther),
    ("nb", PluralRule::OneOther),
    ("nl", PluralRule::OneOther),
    ("pt", PluralRule::OneOther),
    ("sq", PluralRule::OneOther),
    ("sv", PluralRule::OneOther),
    ("uz", PluralRule::OneOther),
    ("ug", PluralRule::OneOther),
    ("fr", PluralRule::ZeroOneOther),
    ("ru", PluralRule::EastSlavic),
    ("uk", PluralRule::EastSlavic),
    ("be", PluralRule::EastSlavic),
    ("sr", PluralRule::EastSlavic),
    ("hr", PluralRule::EastSlavic),
    ("bs", PluralRule::EastSlavic),
    ("pl", PluralRule::Polish),
    ("cs", PluralRule::CzechSlovak),
    ("sk", PluralRule::CzechSlovak),
    ("sl", PluralRule::Slovenian),
    ("lt", PluralRule::Lithuanian),
    ("lv", PluralRule::Latvian),
    ("ro", PluralRule::Romanian),
    ("ar", PluralRule::Arabic),
];

/// Region-specific overrides, checked before [`PLURAL_TABLE`].
const REGIONAL_TABLE: &[(&str, &str, PluralRule)] = &[("pt", "BR", PluralRule::ZeroOneOther)];

impl PluralRule {
    /// Rule for a language subtag and optional region, or `None` when the
    /// language has no plural data.
    #[must_use]
    pub fn for_language(language: &str, region: Option<&str>) -> Option<Self> {
        if let Some(region) = region {
            let regional = REGIONAL_TABLE.iter().find(|(lang, reg, _)| {
                lang.eq_ignore_ascii_case(language) && reg.eq_ignore_ascii_case(region)
            });
            if let Some((_, _, rule)) = regional {
                return Some(*rule);
            }
        }
        PLURAL_TABLE
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
            .map(|(_, rule)| *rule)
    }

    /// Categories this rule distinguishes, in plural-form order.
    #[must_use]
    pub fn categories(self) -> &'static [PluralCategory] {
        use PluralCategory::*;
        match self {
            PluralRule::Invariant => &[Other],
            PluralRule::OneOther | PluralRule::ZeroOneOther => &[One, Other],
            PluralRule::EastSlavic | PluralRule::Polish => &[One, Few, Many],
            PluralRule::CzechSlovak | PluralRule::Lithuanian | PluralRule::Romanian => {
                &[One, Few, Other]
            }
            PluralRule::Slovenian => &[One, Two, Few, Other],
            PluralRule::Latvian => &[One, Other, Zero],
            PluralRule::Arabic => &[Zero, One, Two, Few, Many, Other],
        }
    }

    /// Number of plural forms a catalog for this rule carries.
    #[must_use]
    pub fn form_count(self) -> usize {
        self.categories().len()
    }

    /// Category for `count`.
    #[must_use]
    pub fn categorize(self, count: i64) -> PluralCategory {
        use PluralCategory::*;
        let n = count.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;
        let teens = (11..=19).contains(&n100);
        match self {
            PluralRule::Invariant => Other,
            PluralRule::OneOther => {
                if n == 1 {
                    One
                } else {
                    Other
                }
            }
            PluralRule::ZeroOneOther => {
                if n <= 1 {
                    One
                } else {
                    Other
                }
            }
            PluralRule::EastSlavic => {
                if n10 == 1 && n100 != 11 {
                    One
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    Few
                } else {
                    Many
                }
            }
            PluralRule::Polish => {
                if n == 1 {
                    One
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    Few
                } else {
                    Many
                }
            }
            PluralRule::CzechSlovak => match n {
                1 => One,
                2..=4 => Few,
                _ => Other,
            },
            PluralRule::Slovenian => match n100 {
                1 => One,
                2 => Two,
                3 | 4 => Few,
                _ => Other,
            },
            PluralRule::Lithuanian => {
                if n10 == 1 && !teens {
                    One
                } else if n10 >= 2 && !teens {
                    Few
                } else {
                    Other
                }
            }
            PluralRule::Latvian => {
                if n == 0 {
                    Zero
                } else if n10 == 1 && n100 != 11 {
                    One
                } else {
                    Other
                }
            }
            PluralRule::Romanian => {
                if n == 1 {
                    One
                } else if n == 0 || (1..=19).contains(&n100) {
                    Few
                } else {
                    Other
                }
            }
            PluralRule::Arabic => match n {
                0 => Zero,
                1 => One,
                2 => Two,
                _ if (3..=10).contains(&n100) => Few,
                _ if n100 >= 11 => Many,
                _ => Other,
            },
        }
    }

    /// Index of the plural form serving `count`. Always below [`Self::form_count`].
    #[must_use]
    pub fn form_index(self, count: i64) -> usize {
        let category = self.categorize(count);
        self.categories()
            .iter()
            .position(|c| *c == category)
            .unwrap_or(0)
    }
}
