//! # Repline Core
//!
//! The session engine behind Repline's read-eval-print views.
//!
//! This crate provides:
//! - Transcript construction and expression extraction
//! - Special commands (`clear`, `reset`, `help`, `buffer`, `buffer N`)
//! - Bounded, persisted command history with previous/next navigation
//! - The evaluator boundary each REPL flavor implements
//! - Synchronous change notification for views
//!
//! ```text
//! Calculator
//! Type 'help' for a list of commands.
//! >> 6 * 7
//! => 42
//! >> _
//! ```

pub mod command;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod observer;
pub mod session;
pub mod storage;
pub mod transcript;

pub use command::SpecialCommand;
pub use error::{CoreError, Result};
pub use evaluator::{Evaluator, FlavorConfig, DEFAULT_PROMPT};
pub use history::{HistoryBuffer, DEFAULT_BUFFER_SIZE};
pub use observer::{ObserverId, Observers, SessionChange};
pub use session::{Session, SessionEngine};
pub use storage::{HistoryStorage, JsonFileStorage, MemoryStorage, StoredHistories};
pub use transcript::Transcript;

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
