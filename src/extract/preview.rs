//! Anonymized activity counts, computed without any analysis backend.

use super::anonymize::{Anonymizer, Pseudonym};
use super::normalize::NormalizedMessage;

/// Per-contact message counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPreview {
    total_messages: usize,
    contacts: Vec<(Pseudonym, usize)>,
}

impl ActivityPreview {
    pub fn from_messages(messages: &[NormalizedMessage]) -> Self {
        let mut anonymizer = Anonymizer::new();
        let mut contacts: Vec<(Pseudonym, usize)> = Vec::new();

        for message in messages {
            let pseudonym = anonymizer.anonymize(&message.participant_id);
            let slot = pseudonym.index() - 1;
            if slot == contacts.len() {
                contacts.push((pseudonym, 0));
            }
            contacts[slot].1 += 1;
        }

        Self {
            total_messages: messages.len(),
            contacts,
        }
    }

    /// One `Contact_k: N messages` line per contact, first-seen order.
    pub fn lines(&self) -> Vec<String> {
        self.contacts
            .iter()
            .map(|(pseudonym, count)| format!("{}: {} messages", pseudonym, count))
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Processed {} messages from {} contacts",
            self.total_messages,
            self.contacts.len()
        )
    }
}
