//! Application state owned by the UI root.
//!
//! Every user action maps to one transition method on [`QuoteBrowser`]; the
//! UI renders from the accessors and never mutates fields directly.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::Datelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::client::generate::QuoteSource;
use crate::client::i18n::{ui_text, UiText};
use crate::client::playback::Playback;
use crate::client::selection::{self, ShuffleDecision};
use crate::client::share::{self, ShareData, ShareOutcome, Sharer, COPIED_DURATION};
use crate::client::storage::{KeyValueStore, StoredValue, FAVORITES_KEY, THEME_KEY};
use crate::client::toast::{Toast, ToastKind};
use crate::error::GenerateError;
use crate::quote::{Language, Quote, QuoteData};

/// Upper bound on one generation request.
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(8);

const FAVORITES: StoredValue<Vec<u64>> = StoredValue::new(FAVORITES_KEY, Vec::new());
const THEME: StoredValue<Theme> = StoredValue::new(THEME_KEY, Theme::Light);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    Translation,
    Context,
    Application,
}

impl FromStr for DetailTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "translation" => Ok(DetailTab::Translation),
            "context" => Ok(DetailTab::Context),
            "application" => Ok(DetailTab::Application),
            other => Err(format!("unknown tab '{}', expected translation, context or application", other)),
        }
    }
}

/// Environment facts read once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Startup {
    /// 1-based day of the year.
    pub day_of_year: u32,
    pub prefers_dark: bool,
}

impl Startup {
    pub fn today(prefers_dark: bool) -> Self {
        Startup {
            day_of_year: chrono::Local::now().ordinal(),
            prefers_dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleOutcome {
    /// A new quote was appended at this index and is now current.
    Added(usize),
    /// The model repeated a known quote; the index now shown, if it changed.
    Duplicate(Option<usize>),
    /// Generation failed; the index now shown, if it changed.
    Failed(Option<usize>),
    /// A shuffle was already in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub lang: Language,
}

pub struct QuoteBrowser<S> {
    store: S,
    quotes: Vec<Quote>,
    seed_len: usize,
    current: usize,
    shuffling: bool,
    language: Language,
    tab: DetailTab,
    favorites: Vec<u64>,
    theme: Theme,
    pulsing: bool,
    favorites_open: bool,
    toast: Toast,
    copied_until: Option<Instant>,
    playback: Playback,
    request_timeout: Duration,
}

/// Clears the shuffling flag when dropped, including when the shuffle future
/// is cancelled mid-request.
struct ShufflingGuard<'a, S>(&'a mut QuoteBrowser<S>);

impl<S> Drop for ShufflingGuard<'_, S> {
    fn drop(&mut self) {
        self.0.shuffling = false;
    }
}

impl<S: KeyValueStore> QuoteBrowser<S> {
    pub fn new(store: S, seed: Vec<Quote>, startup: Startup) -> Self {
        let seed_len = seed.len();
        let current = selection::quote_of_the_day(startup.day_of_year, seed_len);

        let favorites = FAVORITES.load(&store);
        let mut browser = QuoteBrowser {
            theme: THEME.load(&store),
            store,
            quotes: seed,
            seed_len,
            current,
            shuffling: false,
            language: Language::default(),
            tab: DetailTab::default(),
            favorites,
            pulsing: false,
            favorites_open: false,
            toast: Toast::default(),
            copied_until: None,
            playback: Playback::default(),
            request_timeout: GENERATE_TIMEOUT,
        };

        if !THEME.is_stored(&browser.store) && startup.prefers_dark {
            browser.set_theme(Theme::Dark);
        }

        tracing::debug!(
            day = startup.day_of_year,
            index = current,
            theme = %browser.theme,
            favorites = browser.favorites.len(),
            "Quote browser ready"
        );
        browser
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn seed_len(&self) -> usize {
        self.seed_len
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_quote(&self) -> Option<&Quote> {
        self.quotes.get(self.current)
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: DetailTab) {
        self.tab = tab;
    }

    pub fn ui(&self) -> &'static UiText {
        ui_text(self.language)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme.toggled());
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        THEME.save(&mut self.store, &theme);
    }

    pub fn favorites(&self) -> &[u64] {
        &self.favorites
    }

    pub fn is_favorite(&self) -> bool {
        self.current_quote()
            .is_some_and(|quote| self.favorites.contains(&quote.id))
    }

    /// Known quotes that are favorites, in collection order.
    pub fn favorite_quotes(&self) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|quote| self.favorites.contains(&quote.id))
            .collect()
    }

    /// Adds or removes the current quote. Adding starts the pulse cue.
    pub fn toggle_favorite(&mut self) {
        let Some(id) = self.current_quote().map(|quote| quote.id) else {
            return;
        };
        if self.favorites.contains(&id) {
            self.favorites.retain(|&fav| fav != id);
        } else {
            self.favorites.push(id);
            self.pulsing = true;
        }
        FAVORITES.save(&mut self.store, &self.favorites);
    }

    pub fn remove_favorite(&mut self, id: u64) {
        self.favorites.retain(|&fav| fav != id);
        FAVORITES.save(&mut self.store, &self.favorites);
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulsing
    }

    /// Called when the pulse animation completes.
    pub fn end_pulse(&mut self) {
        self.pulsing = false;
    }

    pub fn favorites_open(&self) -> bool {
        self.favorites_open
    }

    pub fn open_favorites(&mut self) {
        self.favorites_open = true;
    }

    pub fn close_favorites(&mut self) {
        self.favorites_open = false;
    }

    /// Shows the quote with `id` and closes the favorites panel.
    pub fn view_quote(&mut self, id: u64) -> bool {
        let found = self.quotes.iter().position(|quote| quote.id == id);
        if let Some(index) = found {
            self.current = index;
        }
        self.favorites_open = false;
        found.is_some()
    }

    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn dismiss_toast(&mut self) {
        self.toast.dismiss();
    }

    pub fn is_copied(&self) -> bool {
        self.copied_until.is_some()
    }

    /// Expires timed UI state: the toast and the "copied" indicator.
    pub fn tick(&mut self, now: Instant) {
        self.toast.tick(now);
        if self.copied_until.is_some_and(|until| now >= until) {
            self.copied_until = None;
        }
    }

    /// Requests a new quote, falling back to another known one on failure or repetition.
    pub async fn shuffle<Q, R>(&mut self, source: &Q, rng: &mut R, now: Instant) -> ShuffleOutcome
    where
        Q: QuoteSource + Sync + ?Sized,
        R: Rng + ?Sized,
    {
        if self.shuffling {
            return ShuffleOutcome::Busy;
        }
        self.shuffling = true;
        let mut browser = ShufflingGuard(self);

        let timeout = browser.0.request_timeout;
        let result = match tokio::time::timeout(timeout, source.generate_quote(&browser.0.quotes)).await {
            Ok(result) => result,
            Err(_) => Err(GenerateError::Timeout(timeout)),
        };
        browser.0.apply_generated(result, rng, now)
    }

    /// Folds the result of a generation call into the state.
    pub fn apply_generated<R: Rng + ?Sized>(
        &mut self,
        result: Result<QuoteData, GenerateError>,
        rng: &mut R,
        now: Instant,
    ) -> ShuffleOutcome {
        match result {
            Ok(data) => match selection::decide(&self.quotes, Some(self.current), &data.latin, rng) {
                ShuffleDecision::Append => {
                    let now_millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
                    let id = selection::fresh_id(&self.quotes, now_millis);
                    tracing::info!(id, latin = %data.latin, "Added generated quote");
                    self.quotes.push(Quote::new(id, data));
                    self.current = self.quotes.len() - 1;
                    ShuffleOutcome::Added(self.current)
                }
                ShuffleDecision::Reselect(index) => {
                    tracing::info!(latin = %data.latin, "Model repeated a known quote");
                    if let Some(index) = index {
                        self.current = index;
                    }
                    ShuffleOutcome::Duplicate(index)
                }
            },
            Err(err) => {
                tracing::error!(
                    details = err.details().unwrap_or_default(),
                    "Error while generating a quote: {}",
                    err
                );
                let message = err
                    .user_message()
                    .unwrap_or_else(|| self.ui().new_quote_error.clone());
                self.toast.show(message, ToastKind::Error, now);

                let index = selection::pick_other_index(self.quotes.len(), Some(self.current), rng);
                if let Some(index) = index {
                    self.current = index;
                }
                ShuffleOutcome::Failed(index)
            }
        }
    }

    pub fn page_meta(&self) -> Option<PageMeta> {
        let quote = self.current_quote()?;
        let title = format!("Verba Latina: \"{}\"", quote.data.latin);
        let description = format!(
            "\"{}\" ({}) - {}. Scopri il significato e l'uso di questa famosa citazione.",
            quote.data.latin,
            quote.data.translation(self.language),
            quote.data.author(self.language)
        );
        Some(PageMeta {
            title,
            description,
            lang: self.language,
        })
    }

    /// Shares the current quote; a clipboard copy lights the "copied" indicator.
    pub fn share<Sh: Sharer + ?Sized>(&mut self, sharer: &mut Sh, url: &str, now: Instant) -> Option<ShareOutcome> {
        let meta = self.page_meta()?;
        let quote = self.current_quote()?;
        let data = ShareData::compose(quote, self.language, meta.title, url);

        let outcome = share::share(sharer, &data);
        if outcome == ShareOutcome::Copied {
            self.copied_until = Some(now + COPIED_DURATION);
        }
        Some(outcome)
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Starts pronouncing the current quote. Returns the audio URL, or `None`
    /// if something is already playing.
    pub fn play_pronunciation(&mut self) -> Option<String> {
        let quote = self.quotes.get(self.current)?;
        self.playback
            .start(quote.id, &quote.data.latin)
            .map(|handle| handle.url.clone())
    }

    /// Called when playback ends or errors.
    pub fn playback_finished(&mut self) {
        self.playback.release();
    }

    pub fn teardown(&mut self) {
        if let Some(handle) = self.playback.release() {
            tracing::debug!(quote = handle.quote_id, "Stopped playback on teardown");
        }
    }
}
