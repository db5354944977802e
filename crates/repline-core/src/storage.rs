//! Persistence for command histories
//!
//! Histories outlive the session that typed them. Each session title owns
//! one bucket; the buffer size is shared by all titles:
//!
//! ```json
//! {
//!   "command_history": {
//!     "Calculator": ["1 + 1", "2 * 3"],
//!     "Shell": ["ls"]
//!   },
//!   "command_history_buffer_size": 50
//! }
//! ```

use crate::{CoreError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Backing store for command histories
///
/// Writing one title's bucket must leave every other bucket untouched.
pub trait HistoryStorage: Send + Sync {
    /// Stored commands for `title`, oldest first
    fn load_history(&self, title: &str) -> Result<Option<Vec<String>>>;

    /// Replace the stored commands for `title`
    fn save_history(&self, title: &str, commands: &[String]) -> Result<()>;

    /// Stored history buffer size
    fn load_buffer_size(&self) -> Result<Option<usize>>;

    /// Replace the stored history buffer size
    fn save_buffer_size(&self, size: usize) -> Result<()>;
}

/// Everything a storage backend keeps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredHistories {
    /// Commands per session title
    pub command_history: BTreeMap<String, Vec<String>>,
    /// Shared history buffer size
    pub command_history_buffer_size: Option<usize>,
}

/// In-memory storage, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<StoredHistories>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything stored
    pub fn snapshot(&self) -> StoredHistories {
        self.data.read().clone()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load_history(&self, title: &str) -> Result<Option<Vec<String>>> {
        Ok(self.data.read().command_history.get(title).cloned())
    }

    fn save_history(&self, title: &str, commands: &[String]) -> Result<()> {
        self.data
            .write()
            .command_history
            .insert(title.to_string(), commands.to_vec());
        Ok(())
    }

    fn load_buffer_size(&self) -> Result<Option<usize>> {
        Ok(self.data.read().command_history_buffer_size)
    }

    fn save_buffer_size(&self, size: usize) -> Result<()> {
        self.data.write().command_history_buffer_size = Some(size);
        Ok(())
    }
}

/// Storage in a single JSON file
///
/// Every write re-reads the file first so histories saved by other sessions
/// in the meantime survive. The lock serializes writers within a process.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredHistories> {
        if !self.path.exists() {
            return Ok(StoredHistories::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            CoreError::Storage(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        if content.trim().is_empty() {
            return Ok(StoredHistories::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, data: &StoredHistories) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, content).map_err(|e| {
            CoreError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    fn modify(&self, f: impl FnOnce(&mut StoredHistories)) -> Result<()> {
        let _guard = self.lock.write();
        let mut data = self.read()?;
        f(&mut data);
        self.write(&data)
    }
}

impl HistoryStorage for JsonFileStorage {
    fn load_history(&self, title: &str) -> Result<Option<Vec<String>>> {
        let _guard = self.lock.read();
        Ok(self.read()?.command_history.remove(title))
    }

    fn save_history(&self, title: &str, commands: &[String]) -> Result<()> {
        self.modify(|data| {
            data.command_history
                .insert(title.to_string(), commands.to_vec());
        })
    }

    fn load_buffer_size(&self) -> Result<Option<usize>> {
        let _guard = self.lock.read();
        Ok(self.read()?.command_history_buffer_size)
    }

    fn save_buffer_size(&self, size: usize) -> Result<()> {
        self.modify(|data| data.command_history_buffer_size = Some(size))
    }
}
