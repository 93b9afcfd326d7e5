//! Per-run participant pseudonyms.

use std::collections::HashMap;
use std::fmt;

/// Stable label standing in for a participant id, e.g. `Contact_3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pseudonym {
    index: usize,
    label: String,
}

impl Pseudonym {
    fn new(index: usize) -> Self {
        Self {
            index,
            label: format!("Contact_{}", index),
        }
    }

    /// 1-based first-seen position.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Assigns `Contact_<k>` labels in first-seen order.
///
/// The table lives for one run only. Ids are kept in an insertion-ordered
/// list alongside the lookup map so iteration never depends on hash order.
#[derive(Debug, Default)]
pub struct Anonymizer {
    ids: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Anonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pseudonym for `participant_id`, allocating the next label on first sight.
    pub fn anonymize(&mut self, participant_id: &str) -> Pseudonym {
        if let Some(&index) = self.lookup.get(participant_id) {
            return Pseudonym::new(index);
        }
        self.ids.push(participant_id.to_string());
        let index = self.ids.len();
        self.lookup.insert(participant_id.to_string(), index);
        Pseudonym::new(index)
    }

    /// Number of distinct ids seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Assigned pseudonyms in first-seen order.
    pub fn pseudonyms(&self) -> impl Iterator<Item = Pseudonym> + '_ {
        (1..=self.ids.len()).map(Pseudonym::new)
    }
}
