//! Per-participant grouping bounded to the most recent entries.

use chrono::{DateTime, Utc};

use super::anonymize::{Anonymizer, Pseudonym};
use super::normalize::NormalizedMessage;

/// Default number of most recent messages kept per participant.
pub const WINDOW_SIZE: usize = 20;

/// One message inside a conversation window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_from_self: bool,
}

/// The latest messages exchanged with one pseudonymous participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow {
    pub pseudonym: Pseudonym,
    /// Chronological, at most the windower's size
    pub entries: Vec<WindowEntry>,
}

/// Windows in pseudonym first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationWindows {
    windows: Vec<ConversationWindow>,
}

impl ConversationWindows {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationWindow> {
        self.windows.iter()
    }

    /// Window for a pseudonym, if that participant appeared in the run.
    pub fn get(&self, pseudonym: &Pseudonym) -> Option<&ConversationWindow> {
        // Pseudonym indices are dense and 1-based in first-seen order.
        self.windows
            .get(pseudonym.index().wrapping_sub(1))
            .filter(|w| &w.pseudonym == pseudonym)
    }

    /// Total entries across every window.
    pub fn entry_count(&self) -> usize {
        self.windows.iter().map(|w| w.entries.len()).sum()
    }
}

impl<'a> IntoIterator for &'a ConversationWindows {
    type Item = &'a ConversationWindow;
    type IntoIter = std::slice::Iter<'a, ConversationWindow>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.iter()
    }
}

/// Groups messages by pseudonym and keeps the newest `size` per group.
#[derive(Debug, Clone)]
pub struct ConversationWindower {
    size: usize,
}

impl ConversationWindower {
    /// Create a windower keeping `size` entries per participant (minimum 1).
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Anonymize and group `messages`, which must be in chronological order.
    ///
    /// A fresh [`Anonymizer`] is used for every call, so pseudonyms never
    /// carry over between runs.
    pub fn window(&self, messages: Vec<NormalizedMessage>) -> ConversationWindows {
        let mut anonymizer = Anonymizer::new();
        let mut groups: Vec<ConversationWindow> = Vec::new();

        for message in messages {
            let pseudonym = anonymizer.anonymize(&message.participant_id);
            let slot = pseudonym.index() - 1;
            if slot == groups.len() {
                groups.push(ConversationWindow {
                    pseudonym,
                    entries: Vec::new(),
                });
            }
            groups[slot].entries.push(WindowEntry {
                text: message.text,
                timestamp: message.timestamp,
                is_from_self: message.is_from_self,
            });
        }

        for group in &mut groups {
            let len = group.entries.len();
            if len > self.size {
                group.entries.drain(..len - self.size);
            }
        }

        tracing::debug!(
            conversations = groups.len(),
            window_size = self.size,
            "grouped messages into windows"
        );
        ConversationWindows { windows: groups }
    }
}

impl Default for ConversationWindower {
    fn default() -> Self {
        Self::new(WINDOW_SIZE)
    }
}
