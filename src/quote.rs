//! Quote data model and the bundled seed list.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};

const SEED_QUOTES_JSON: &str = include_str!("../data/seed_quotes.json");

static SEED_QUOTES: Lazy<Vec<Quote>> = Lazy::new(|| {
    serde_json::from_str(SEED_QUOTES_JSON).expect("Failed to parse bundled seed quotes")
});

/// The quotes bundled with the application.
pub fn seed_quotes() -> &'static [Quote] {
    &SEED_QUOTES
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    It,
    En,
    Es,
    Fr,
    De,
}

impl Language {
    pub const ALL: [Language; 5] = [Language::It, Language::En, Language::Es, Language::Fr, Language::De];

    pub fn code(self) -> &'static str {
        match self {
            Language::It => "it",
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::It => "Italiano",
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::De => "Deutsch",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported language '{}', expected one of it, en, es, fr, de", s))
    }
}

pub type Localized<T> = BTreeMap<Language, T>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDetails {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub example: String,
}

/// A quote as produced by the generation endpoint, before it has an id.
///
/// Localized maps are read leniently: a `null` map is empty and keys for
/// unsupported languages are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteData {
    pub latin: String,
    #[serde(default, deserialize_with = "lenient_localized")]
    pub author: Localized<String>,
    #[serde(default, deserialize_with = "lenient_localized")]
    pub source: Localized<String>,
    #[serde(default, deserialize_with = "lenient_localized")]
    pub translations: Localized<String>,
    #[serde(default, deserialize_with = "lenient_localized")]
    pub details: Localized<QuoteDetails>,
}

fn lenient_localized<'de, D, T>(deserializer: D) -> Result<Localized<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<BTreeMap<String, T>> = Option::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .flatten()
        .filter_map(|(code, value)| code.parse::<Language>().ok().map(|lang| (lang, value)))
        .collect())
}

impl QuoteData {
    pub fn author(&self, lang: Language) -> &str {
        localized(&self.author, lang).map(String::as_str).unwrap_or_default()
    }

    pub fn source(&self, lang: Language) -> &str {
        localized(&self.source, lang).map(String::as_str).unwrap_or_default()
    }

    pub fn translation(&self, lang: Language) -> &str {
        localized(&self.translations, lang).map(String::as_str).unwrap_or_default()
    }

    pub fn details(&self, lang: Language) -> Option<&QuoteDetails> {
        localized(&self.details, lang)
    }

    /// True when every localized map carries all supported languages.
    pub fn is_complete(&self) -> bool {
        Language::ALL.iter().all(|lang| {
            self.author.contains_key(lang)
                && self.source.contains_key(lang)
                && self.translations.contains_key(lang)
                && self.details.contains_key(lang)
        })
    }
}

fn localized<T>(map: &Localized<T>, lang: Language) -> Option<&T> {
    map.get(&lang).or_else(|| map.get(&Language::It))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u64,
    #[serde(flatten)]
    pub data: QuoteData,
}

impl Quote {
    pub fn new(id: u64, data: QuoteData) -> Self {
        Quote { id, data }
    }
}
