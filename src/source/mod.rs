//! Read-only access to locally stored conversation records.
//!
//! - [`timestamp`] - native timestamp conversion
//! - [`chat_db`] - the SQLite-backed Messages store

mod chat_db;
mod timestamp;

use std::path::PathBuf;

pub use chat_db::{default_database_path, ChatDb};
pub use timestamp::TimestampCodec;

/// A conversation record as it comes out of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Message body, never empty
    pub text: String,
    /// Nanoseconds since the store's reference epoch
    pub timestamp: i64,
    /// Sent by the local user
    pub is_from_self: bool,
    /// Handle of the other participant, absent for some system rows
    pub participant_id: Option<String>,
}

impl RawMessage {
    /// Convenience constructor used by tests and in-memory sources.
    pub fn new(
        text: impl Into<String>,
        timestamp: i64,
        is_from_self: bool,
        participant_id: Option<&str>,
    ) -> Self {
        Self {
            text: text.into(),
            timestamp,
            is_from_self,
            participant_id: participant_id.map(str::to_string),
        }
    }
}

/// Errors raised while reading the message store.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Messages database not found at: {path}. Make sure you're running this on macOS with Messages enabled.")]
    NotFound { path: PathBuf },

    #[error("Cannot access Messages database at {path}: {source}. You may need to grant your terminal 'Full Disk Access' in System Settings > Privacy & Security.")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Error querying Messages database: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Supplies raw messages newer than a native-unit cutoff.
///
/// Implementations must return messages ordered by timestamp ascending,
/// each with non-empty text.
pub trait MessageSource {
    /// Fetch every message with a timestamp strictly greater than `cutoff`.
    fn fetch_since(&self, cutoff: i64) -> Result<Vec<RawMessage>, SourceError>;
}

/// In-memory source, mostly for tests and embedding.
impl MessageSource for Vec<RawMessage> {
    fn fetch_since(&self, cutoff: i64) -> Result<Vec<RawMessage>, SourceError> {
        let mut messages: Vec<RawMessage> = self
            .iter()
            .filter(|m| m.timestamp > cutoff && !m.text.is_empty())
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}
