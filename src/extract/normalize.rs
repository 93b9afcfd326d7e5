//! Raw store rows to normalized messages.

use chrono::{DateTime, Utc};

use crate::source::{RawMessage, TimestampCodec};

/// Participant id used when the store has no handle for a message.
pub const UNKNOWN_PARTICIPANT: &str = "Unknown";

/// A message with an absolute timestamp and a guaranteed participant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_from_self: bool,
    pub participant_id: String,
}

/// Convert raw rows 1:1, preserving their order.
///
/// Absent or empty participant ids become [`UNKNOWN_PARTICIPANT`].
pub fn normalize(messages: Vec<RawMessage>, codec: &TimestampCodec) -> Vec<NormalizedMessage> {
    messages
        .into_iter()
        .map(|raw| NormalizedMessage {
            timestamp: codec.to_absolute(raw.timestamp),
            participant_id: raw
                .participant_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| UNKNOWN_PARTICIPANT.to_string()),
            text: raw.text,
            is_from_self: raw.is_from_self,
        })
        .collect()
}
