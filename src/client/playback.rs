const TTS_BASE_URL: &str = "https://translate.google.com/translate_tts";

/// Text-to-speech URL that pronounces `latin`.
pub fn pronunciation_url(latin: &str) -> String {
    format!(
        "{}?ie=UTF-8&q={}&tl=la&client=tw-ob",
        TTS_BASE_URL,
        urlencoding::encode(latin)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackHandle {
    pub quote_id: u64,
    pub url: String,
}

/// Owns at most one active playback.
#[derive(Debug, Default)]
pub struct Playback {
    active: Option<PlaybackHandle>,
}

impl Playback {
    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&PlaybackHandle> {
        self.active.as_ref()
    }

    /// Starts playback unless one is already running, in which case nothing happens.
    pub fn start(&mut self, quote_id: u64, latin: &str) -> Option<&PlaybackHandle> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(PlaybackHandle {
            quote_id,
            url: pronunciation_url(latin),
        });
        self.active.as_ref()
    }

    /// Releases the handle on completion, error or teardown.
    pub fn release(&mut self) -> Option<PlaybackHandle> {
        self.active.take()
    }
}
