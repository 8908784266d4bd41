//! The session history stack: what the browser History API would hold for
//! the page. Entries are created on every successful content load and
//! replayed when the cursor moves back or forward.

use serde::Serialize;

/// One visited address and the topic state pushed with it. The initial page
/// entry carries no topic, so replaying it loads nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    pub topic: Option<String>,
}

/// Cursor-based stack with browser pushState semantics: pushing while the
/// cursor sits behind the tip discards the forward entries.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry {
                url: initial_url.into(),
                topic: None,
            }],
            cursor: 0,
        }
    }

    pub fn push(&mut self, url: impl Into<String>, topic: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            url: url.into(),
            topic: Some(topic.into()),
        });
        self.cursor = self.entries.len() - 1;
    }

    /// Moves the cursor back one entry, returning the entry to replay.
    pub fn back(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Moves the cursor forward one entry, returning the entry to replay.
    pub fn forward(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
