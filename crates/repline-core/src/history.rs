//! Bounded command history with previous/next navigation
//!
//! Every expression entered in a session lands here, oldest first. The
//! buffer never holds more than its configured size; overflow is evicted
//! from the oldest end. A cursor walks the entries the way arrow keys do in
//! a shell:
//!
//! ```text
//!   entries:  [ "a" , "b" , "c" ]   (new input slot)
//!   cursor:      0     1     2            3 == len
//! ```

/// Default number of commands kept when storage has no value
pub const DEFAULT_BUFFER_SIZE: usize = 50;

/// Command history with a navigation cursor
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Entered expressions (oldest first)
    entries: Vec<String>,
    /// Maximum entries to keep
    max_entries: usize,
    /// Navigation cursor, `entries.len()` means nothing selected
    cursor: usize,
}

impl HistoryBuffer {
    /// Create an empty history
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
            cursor: 0,
        }
    }

    /// Create a history from persisted entries
    ///
    /// Entries beyond `max_entries` are kept as loaded; they are trimmed on
    /// the next [`HistoryBuffer::push`].
    pub fn from_entries(entries: Vec<String>, max_entries: usize) -> Self {
        let cursor = entries.len();
        Self {
            entries,
            max_entries,
            cursor,
        }
    }

    /// Add a command to history
    ///
    /// Returns `true` when older entries were evicted to make room.
    pub fn push(&mut self, command: impl Into<String>) -> bool {
        self.entries.push(command.into());
        let trimmed = self.trim();
        self.cursor = self.entries.len();
        trimmed
    }

    /// Step back to the previous command
    ///
    /// At the oldest entry nothing is returned and the cursor stays put.
    pub fn previous_command(&mut self) -> Option<&str> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step forward to the next command
    ///
    /// Past the newest entry the cursor snaps to the empty input slot and
    /// nothing is returned.
    pub fn next_command(&mut self) -> Option<&str> {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            self.entries.get(self.cursor).map(String::as_str)
        } else {
            self.cursor = self.entries.len();
            None
        }
    }

    /// Change the maximum size, evicting the oldest entries if needed
    pub fn set_max_entries(&mut self, max_entries: usize) -> bool {
        self.max_entries = max_entries;
        let trimmed = self.trim();
        self.cursor = self.cursor.min(self.entries.len());
        trimmed
    }

    /// Search commands by query (most recent first)
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .rev()
            .filter(|e| e.to_lowercase().contains(&query_lower))
            .map(String::as_str)
            .collect()
    }

    /// Get recent commands (most recent first)
    pub fn recent(&self, count: usize) -> Vec<&str> {
        self.entries
            .iter()
            .rev()
            .take(count)
            .map(String::as_str)
            .collect()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn trim(&mut self) -> bool {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(0..excess);
            true
        } else {
            false
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}
