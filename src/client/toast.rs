use std::time::{Duration, Instant};

pub const TOAST_DURATION: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastKind {
    #[default]
    Info,
    Error,
}

/// A transient notification. Hidden until shown, hidden again on expiry or dismissal.
#[derive(Debug, Clone, Default)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
    expires_at: Option<Instant>,
}

impl Toast {
    /// Shows `message`, replacing whatever was visible and restarting the timer.
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.message = message.into();
        self.kind = kind;
        self.visible = true;
        self.expires_at = Some(now + TOAST_DURATION);
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
        self.expires_at = None;
    }

    /// Hides the toast once its duration has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.expires_at.is_some_and(|at| now >= at) {
            self.dismiss();
        }
    }
}
