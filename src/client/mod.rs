//! The quote-browsing client: state, persistence and the call to the
//! generation endpoint.

pub mod generate;
pub mod i18n;
pub mod playback;
pub mod selection;
pub mod share;
pub mod state;
pub mod storage;
pub mod toast;
