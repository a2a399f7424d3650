use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::quote::Language;

const UI_TEXT_JSON: &str = include_str!("../../data/ui_text.json");

static UI_TEXT: Lazy<BTreeMap<Language, UiText>> = Lazy::new(|| {
    serde_json::from_str(UI_TEXT_JSON).expect("Failed to parse bundled UI text")
});

/// Interface strings for one language.
#[derive(Debug, Clone, Deserialize)]
pub struct UiText {
    pub translate: String,
    pub context: String,
    pub practical_use: String,
    pub example_label: String,
    pub save_favorite: String,
    pub remove_favorite: String,
    pub share: String,
    pub copied: String,
    pub favorites_title: String,
    pub no_favorites: String,
    pub play_pronunciation: String,
    pub switch_to_light: String,
    pub switch_to_dark: String,
    pub loading: String,
    pub shuffle: String,
    pub new_quote_error: String,
}

pub fn ui_text(lang: Language) -> &'static UiText {
    UI_TEXT
        .get(&lang)
        .or_else(|| UI_TEXT.get(&Language::It))
        .expect("Bundled UI text has no Italian entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_ui_text() {
        for lang in Language::ALL {
            assert!(UI_TEXT.contains_key(&lang), "missing {}", lang);
        }
        assert_eq!(ui_text(Language::En).copied, "Copied!");
        assert_eq!(ui_text(Language::De).shuffle, "Neues Zitat");
    }
}
