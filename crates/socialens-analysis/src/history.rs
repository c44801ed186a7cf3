//! Bounded in-memory record of analysis bundles per conversation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::AnalysisBundle;

/// Per-conversation ring buffer. Appends from overlapping background runs
/// are serialized by the mutex; once a conversation holds `capacity`
/// bundles the oldest is dropped.
#[derive(Debug)]
pub struct AnalysisHistory {
    capacity: usize,
    entries: Mutex<HashMap<String, VecDeque<AnalysisBundle>>>,
}

impl AnalysisHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn append(&self, conversation_key: &str, bundle: AnalysisBundle) {
        let mut entries = self.lock();
        let buffer = entries.entry(conversation_key.to_owned()).or_default();
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(bundle);
    }

    /// Bundles for a conversation, oldest first.
    #[must_use]
    pub fn recent(&self, conversation_key: &str) -> Vec<AnalysisBundle> {
        self.lock()
            .get(conversation_key)
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn latest(&self, conversation_key: &str) -> Option<AnalysisBundle> {
        self.lock()
            .get(conversation_key)
            .and_then(|b| b.back().cloned())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<AnalysisBundle>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
