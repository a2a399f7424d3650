use std::io::Write;
use std::time::Duration;

use base64::Engine;

use crate::error::ShareError;
use crate::quote::{Language, Quote};

pub const COPIED_DURATION: Duration = Duration::from_secs(2);

const PROMO_LINE: &str = "Scopri di più su Verba Latina!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    pub fn compose(quote: &Quote, lang: Language, title: impl Into<String>, url: impl Into<String>) -> Self {
        ShareData {
            title: title.into(),
            text: format!("\"{}\" - {}\n{}", quote.data.latin, quote.data.author(lang), PROMO_LINE),
            url: url.into(),
        }
    }

    /// What goes on the clipboard when native sharing is unavailable.
    pub fn clipboard_text(&self) -> String {
        format!("{}\n{}", self.text, self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Failed,
}

/// Platform hooks for sharing.
pub trait Sharer {
    /// `None` when the platform has no native share capability.
    fn native_share(&mut self, data: &ShareData) -> Option<Result<(), ShareError>>;

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ShareError>;
}

/// Shares natively when possible, otherwise copies to the clipboard.
/// Failures are logged, never surfaced.
pub fn share<S: Sharer + ?Sized>(sharer: &mut S, data: &ShareData) -> ShareOutcome {
    let result = match sharer.native_share(data) {
        Some(result) => result.map(|_| ShareOutcome::Shared),
        None => sharer
            .copy_to_clipboard(&data.clipboard_text())
            .map(|_| ShareOutcome::Copied),
    };

    result.unwrap_or_else(|e| {
        tracing::error!("Couldn't share or copy: {}", e);
        ShareOutcome::Failed
    })
}

/// Copies through the terminal with an OSC 52 escape sequence.
pub struct TerminalClipboard<W: Write> {
    out: W,
}

impl<W: Write> TerminalClipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sharer for TerminalClipboard<W> {
    fn native_share(&mut self, _data: &ShareData) -> Option<Result<(), ShareError>> {
        None
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ShareError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        write!(self.out, "\x1b]52;c;{}\x07", encoded)?;
        self.out.flush()?;
        Ok(())
    }
}
