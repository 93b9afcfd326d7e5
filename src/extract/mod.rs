//! Privacy-reducing extraction for conversation records.
//!
//! Messages flow through these stages, each consuming its input:
//!
//! 1. [`normalize`] - absolute timestamps, sentinel for unknown participants
//! 2. [`Anonymizer`] - stable per-run `Contact_<k>` pseudonyms
//! 3. [`ConversationWindower`] - per-pseudonym groups bounded to the latest N
//! 4. [`format_request`] - the text blob handed to an analysis provider
//!
//! [`ActivityPreview`] reuses stage 2 to count messages without any backend.

mod anonymize;
mod format;
mod normalize;
mod preview;
mod window;

pub use anonymize::{Anonymizer, Pseudonym};
pub use format::format_request;
pub use normalize::{normalize, NormalizedMessage, UNKNOWN_PARTICIPANT};
pub use preview::ActivityPreview;
pub use window::{
    ConversationWindow, ConversationWindower, ConversationWindows, WindowEntry, WINDOW_SIZE,
};
