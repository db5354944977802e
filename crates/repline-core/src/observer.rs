//! Change notification for session views
//!
//! Listeners are plain callbacks run synchronously, in subscription order,
//! after a mutation has completed.

/// What changed in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// Output or a prompt was appended
    TranscriptChanged,
    /// The transcript was wiped by `clear`
    Cleared,
    /// The session went back to its preamble and lost its history
    Reset,
    /// The history buffer size changed
    BufferSizeChanged(usize),
}

/// Handle returned by [`Observers::subscribe`]
pub type ObserverId = u64;

/// A change listener
pub type Callback = Box<dyn Fn(&SessionChange) + Send + Sync>;

/// Registered change listeners
pub struct Observers {
    listeners: Vec<(ObserverId, Callback)>,
    next_id: ObserverId,
}

impl Observers {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a listener. Returns an ID for unsubscribing.
    pub fn subscribe(&mut self, callback: Callback) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, callback));
        id
    }

    /// Remove a listener. Returns true if it was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() < before
    }

    /// Call every listener with `change`
    pub fn notify(&self, change: &SessionChange) {
        for (_, callback) in &self.listeners {
            callback(change);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for Observers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
