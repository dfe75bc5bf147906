use chrono::{DateTime, Utc};
use relgraph_core::NodeId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub entity_id: NodeId,
    pub display_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Browser-style back/forward list of visited entities.
///
/// `current` is `None` only while the history is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationHistory {
    entries: Vec<HistoryEntry>,
    current: Option<usize>,
    capacity: usize,
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a visit. Re-visiting the current entry is a no-op; otherwise
    /// the forward entries are discarded.
    pub fn push(&mut self, entity_id: impl Into<NodeId>, display_name: impl Into<String>) {
        let entity_id = entity_id.into();
        if self.current().is_some_and(|entry| entry.entity_id == entity_id) {
            return;
        }

        if let Some(current) = self.current {
            self.entries.truncate(current + 1);
        }

        self.entries.push(HistoryEntry {
            entity_id,
            display_name: display_name.into(),
            timestamp: Utc::now(),
        });

        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }
        self.current = Some(self.entries.len() - 1);
    }

    pub fn back(&mut self) -> Option<&HistoryEntry> {
        let current = self.current?;
        if current == 0 {
            return None;
        }
        self.current = Some(current - 1);
        self.entries.get(current - 1)
    }

    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        let current = self.current?;
        if current + 1 >= self.entries.len() {
            return None;
        }
        self.current = Some(current + 1);
        self.entries.get(current + 1)
    }

    pub fn jump_to(&mut self, index: usize) -> Option<&HistoryEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.current = Some(index);
        self.entries.get(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    pub fn can_go_back(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
