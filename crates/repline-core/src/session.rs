//! REPL sessions
//!
//! A [`Session`] ties a transcript, a command history and an evaluator
//! together. Text comes in as the whole transcript the user was looking at;
//! the newest expression is pulled out of it, recorded, dispatched and
//! answered:
//!
//! ```text
//!   commit(full text)
//!        │
//!        ▼
//!   extract expression ──► record in history ──► special command?
//!                                                  │yes        │no
//!                                                  ▼           ▼
//!                                              handler     evaluator
//!                                                  │      "=> " / "x> "
//!                                                  └─────┬─────┘
//!                                                        ▼
//!                                              fresh prompt, notify
//! ```
//!
//! [`SessionEngine`] wraps a session in a lock and a list of observers so a
//! view can share it.

use crate::command::SpecialCommand;
use crate::evaluator::{Evaluator, FlavorConfig};
use crate::history::{HistoryBuffer, DEFAULT_BUFFER_SIZE};
use crate::observer::{ObserverId, Observers, SessionChange};
use crate::storage::HistoryStorage;
use crate::transcript::Transcript;
use crate::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Session state for one REPL view
pub struct Session<E: Evaluator> {
    flavor: FlavorConfig,
    transcript: Transcript,
    history: HistoryBuffer,
    /// Most recent successful result
    last_output: Option<String>,
    evaluator: E,
    storage: Arc<dyn HistoryStorage>,
    /// Buffer size used while storage has none
    default_buffer_size: usize,
}

impl<E: Evaluator> Session<E> {
    /// Open a session, loading its history from storage
    pub fn new(
        flavor: FlavorConfig,
        evaluator: E,
        storage: Arc<dyn HistoryStorage>,
    ) -> Result<Self> {
        Self::with_default_buffer_size(flavor, evaluator, storage, DEFAULT_BUFFER_SIZE)
    }

    /// Open a session with a custom fallback buffer size
    pub fn with_default_buffer_size(
        flavor: FlavorConfig,
        evaluator: E,
        storage: Arc<dyn HistoryStorage>,
        default_buffer_size: usize,
    ) -> Result<Self> {
        let transcript = Transcript::new(flavor.title.clone(), flavor.prompt.clone())?;
        let history = load_history(storage.as_ref(), &flavor.title, default_buffer_size)?;

        tracing::info!(
            title = %flavor.title,
            commands = history.len(),
            buffer_size = history.max_entries(),
            "Opened REPL session"
        );

        Ok(Self {
            flavor,
            transcript,
            history,
            last_output: None,
            evaluator,
            storage,
            default_buffer_size,
        })
    }

    /// Submit the transcript as the user left it and evaluate what they typed
    pub fn commit(&mut self, full_text: &str) -> SessionChange {
        let expression = self.transcript.extract_expression(full_text);
        self.transcript.replace(full_text);
        self.evaluate(&expression)
    }

    /// Record and run one expression
    pub fn evaluate(&mut self, expression: &str) -> SessionChange {
        self.add_command(expression);

        match SpecialCommand::parse(expression) {
            Some(command) => self.run_special(command),
            None => {
                self.run_expression(expression);
                SessionChange::TranscriptChanged
            }
        }
    }

    /// Append an expression to the command history
    pub fn add_command(&mut self, expression: &str) {
        if self.history.push(expression) {
            tracing::debug!(
                title = %self.flavor.title,
                buffer_size = self.history.max_entries(),
                "Trimmed command history"
            );
        }
        self.persist_history();
    }

    /// Step back through the command history
    pub fn previous_command(&mut self) -> Option<String> {
        self.history.previous_command().map(str::to_string)
    }

    /// Step forward through the command history
    pub fn next_command(&mut self) -> Option<String> {
        self.history.next_command().map(str::to_string)
    }

    /// Go back to the preamble and erase this session's stored history
    pub fn reset(&mut self) -> Result<()> {
        self.transcript.reset();
        self.history = HistoryBuffer::new(self.history.max_entries());
        self.storage.save_history(&self.flavor.title, &[])?;
        self.history = load_history(
            self.storage.as_ref(),
            &self.flavor.title,
            self.default_buffer_size,
        )?;
        tracing::info!(title = %self.flavor.title, "Reset REPL session");
        Ok(())
    }

    /// Change how many commands are kept
    pub fn set_buffer_size(&mut self, size: usize) {
        let trimmed = self.history.set_max_entries(size);
        if let Err(e) = self.storage.save_buffer_size(size) {
            tracing::warn!("Failed to save history buffer size: {}", e);
        }
        if trimmed {
            self.persist_history();
        }
    }

    fn run_special(&mut self, command: SpecialCommand) -> SessionChange {
        tracing::debug!(%command, "Running special command");

        match command {
            SpecialCommand::Clear => {
                self.transcript.clear();
                SessionChange::Cleared
            }
            SpecialCommand::Reset => {
                if let Err(e) = self.reset() {
                    tracing::warn!("Failed to reset command history: {}", e);
                }
                SessionChange::Reset
            }
            SpecialCommand::Help => {
                self.transcript.push_block(&SpecialCommand::help_text());
                SessionChange::TranscriptChanged
            }
            SpecialCommand::ShowBufferSize => {
                let line = format!("Buffer size: {}", self.history.max_entries());
                self.transcript.push_block(&line);
                SessionChange::TranscriptChanged
            }
            SpecialCommand::SetBufferSize(size) => {
                self.set_buffer_size(size);
                self.transcript
                    .push_block(&format!("Buffer size set to {}", size));
                SessionChange::BufferSizeChanged(size)
            }
        }
    }

    fn run_expression(&mut self, expression: &str) {
        match self.evaluator.execute(expression) {
            Ok(output) => {
                self.transcript.push_result(&output);
                self.last_output = Some(output);
            }
            Err(error) => {
                let message = self.evaluator.format_error(&error);
                tracing::debug!(%expression, error = %message, "Evaluation failed");
                self.transcript.push_error(&message);
            }
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self
            .storage
            .save_history(&self.flavor.title, self.history.entries())
        {
            tracing::warn!("Failed to save command history: {}", e);
        }
    }

    pub fn flavor(&self) -> &FlavorConfig {
        &self.flavor
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }
}

fn load_history(
    storage: &dyn HistoryStorage,
    title: &str,
    default_buffer_size: usize,
) -> Result<HistoryBuffer> {
    let buffer_size = storage.load_buffer_size()?.unwrap_or(default_buffer_size);
    let commands = storage.load_history(title)?.unwrap_or_default();
    Ok(HistoryBuffer::from_entries(commands, buffer_size))
}

/// A session shared between a view and its observers
///
/// Mutations hold one lock for their whole duration, evaluation included.
/// Observers run after the lock is released, so they may read the session
/// back; they must not subscribe or unsubscribe from inside a callback.
pub struct SessionEngine<E: Evaluator> {
    session: Mutex<Session<E>>,
    observers: RwLock<Observers>,
}

impl<E: Evaluator> SessionEngine<E> {
    pub fn new(
        flavor: FlavorConfig,
        evaluator: E,
        storage: Arc<dyn HistoryStorage>,
    ) -> Result<Self> {
        Ok(Self::from_session(Session::new(flavor, evaluator, storage)?))
    }

    pub fn from_session(session: Session<E>) -> Self {
        Self {
            session: Mutex::new(session),
            observers: RwLock::new(Observers::new()),
        }
    }

    /// Submit the transcript as the user left it
    pub fn commit(&self, full_text: &str) {
        let change = self.session.lock().commit(full_text);
        self.notify(change);
    }

    /// Record and run one expression
    pub fn evaluate(&self, expression: &str) {
        let change = self.session.lock().evaluate(expression);
        self.notify(change);
    }

    pub fn previous_command(&self) -> Option<String> {
        self.session.lock().previous_command()
    }

    pub fn next_command(&self) -> Option<String> {
        self.session.lock().next_command()
    }

    /// Record an expression without evaluating it
    pub fn append_to_history(&self, expression: &str) {
        self.session.lock().add_command(expression);
    }

    pub fn reset(&self) -> Result<()> {
        let result = self.session.lock().reset();
        self.notify(SessionChange::Reset);
        result
    }

    /// Register a change listener
    pub fn subscribe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        self.observers.write().subscribe(Box::new(callback))
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.write().unsubscribe(id)
    }

    /// Run `f` against the locked session
    pub fn with_session<R>(&self, f: impl FnOnce(&Session<E>) -> R) -> R {
        f(&self.session.lock())
    }

    pub fn transcript(&self) -> String {
        self.with_session(|s| s.transcript().text().to_string())
    }

    pub fn current_offset(&self) -> usize {
        self.with_session(|s| s.transcript().offset())
    }

    pub fn last_output(&self) -> Option<String> {
        self.with_session(|s| s.last_output().map(str::to_string))
    }

    pub fn command_history(&self) -> Vec<String> {
        self.with_session(|s| s.history().entries().to_vec())
    }

    pub fn history_cursor(&self) -> usize {
        self.with_session(|s| s.history().cursor())
    }

    pub fn buffer_size(&self) -> usize {
        self.with_session(|s| s.history().max_entries())
    }

    /// Search the command history, most recent first
    pub fn search_history(&self, query: &str) -> Vec<String> {
        self.with_session(|s| {
            s.history()
                .search(query)
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }

    pub fn flavor(&self) -> FlavorConfig {
        self.with_session(|s| s.flavor().clone())
    }

    fn notify(&self, change: SessionChange) {
        self.observers.read().notify(&change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("DivisionByZero")]
        DivisionByZero,
    }

    /// Doubles numbers, fails on `1/0`, echoes anything else
    struct Doubler;

    impl Evaluator for Doubler {
        type Error = TestError;

        fn execute(&mut self, expression: &str) -> std::result::Result<String, TestError> {
            if expression == "1/0" {
                return Err(TestError::DivisionByZero);
            }
            Ok(match expression.parse::<i64>() {
                Ok(n) => (n * 2).to_string(),
                Err(_) => format!("echo: {}", expression),
            })
        }

        fn format_error(&self, error: &TestError) -> String {
            format!("error: {}", error)
        }
    }

    fn flavor() -> FlavorConfig {
        FlavorConfig::new("Doubler", "source.test")
    }

    fn engine_with(storage: Arc<MemoryStorage>) -> SessionEngine<Doubler> {
        SessionEngine::new(flavor(), Doubler, storage).unwrap()
    }

    fn engine() -> (SessionEngine<Doubler>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (engine_with(Arc::clone(&storage)), storage)
    }

    /// Type `input` after the current prompt and submit
    fn type_and_commit(engine: &SessionEngine<Doubler>, input: &str) {
        let text = format!("{}{}", engine.transcript(), input);
        engine.commit(&text);
    }

    fn preamble() -> String {
        "Doubler\nType 'help' for a list of commands.\n>> ".to_string()
    }

    #[test]
    fn test_new_session_starts_at_preamble() {
        let (engine, _) = engine();
        assert_eq!(engine.transcript(), preamble());
        assert_eq!(engine.current_offset(), preamble().chars().count());
        assert_eq!(engine.history_cursor(), 0);
        assert_eq!(engine.buffer_size(), DEFAULT_BUFFER_SIZE);
        assert_eq!(engine.last_output(), None);
    }

    #[test]
    fn test_successful_evaluation() {
        let (engine, _) = engine();
        type_and_commit(&engine, "21");

        assert_eq!(engine.transcript(), format!("{}21\n=> 42\n>> ", preamble()));
        assert_eq!(engine.last_output(), Some("42".to_string()));
        assert_eq!(engine.command_history(), vec!["21"]);
        assert_eq!(engine.current_offset(), engine.transcript().chars().count());
    }

    #[test]
    fn test_failed_evaluation_keeps_last_output() {
        let (engine, _) = engine();
        type_and_commit(&engine, "5");
        type_and_commit(&engine, "1/0");

        assert!(engine
            .transcript()
            .ends_with("1/0\nx> error: DivisionByZero\n>> "));
        assert_eq!(engine.last_output(), Some("10".to_string()));
    }

    #[test]
    fn test_idle_prompt_evaluates_empty_expression() {
        let (engine, _) = engine();
        engine.commit(&engine.transcript());

        assert!(engine.transcript().ends_with(">> \n=> echo: \n>> "));
        assert_eq!(engine.command_history(), vec![""]);
    }

    #[test]
    fn test_commit_uses_newest_prompt() {
        let (engine, _) = engine();
        engine.commit(">> 1\n=> 2\n\n>> 3");
        assert_eq!(engine.last_output(), Some("6".to_string()));
    }

    #[test]
    fn test_clear_wipes_transcript_only() {
        let (engine, _) = engine();
        type_and_commit(&engine, "1");
        type_and_commit(&engine, "clear");

        assert_eq!(engine.transcript(), ">> ");
        assert_eq!(engine.current_offset(), 3);
        assert_eq!(engine.command_history(), vec!["1", "clear"]);
        assert_eq!(engine.last_output(), Some("2".to_string()));
    }

    #[test]
    fn test_help_lists_commands() {
        let (engine, _) = engine();
        type_and_commit(&engine, "help");

        let transcript = engine.transcript();
        assert!(transcript.contains("Special commands:"));
        assert!(transcript.contains("buffer <n>"));
        assert!(transcript.ends_with("\n>> "));
        assert_eq!(engine.last_output(), None);
    }

    #[test]
    fn test_show_buffer_size() {
        let (engine, _) = engine();
        type_and_commit(&engine, "buffer");
        assert!(engine
            .transcript()
            .ends_with(&format!("Buffer size: {}\n>> ", DEFAULT_BUFFER_SIZE)));
    }

    #[test]
    fn test_set_buffer_size_persists() {
        let (engine, storage) = engine();
        type_and_commit(&engine, "buffer 5");

        assert_eq!(engine.buffer_size(), 5);
        assert!(engine.transcript().contains("Buffer size set to 5"));
        assert_eq!(storage.load_buffer_size().unwrap(), Some(5));
    }

    #[test]
    fn test_shrinking_buffer_trims_history() {
        let (engine, storage) = engine();
        for input in ["1", "2", "3"] {
            type_and_commit(&engine, input);
        }
        type_and_commit(&engine, "buffer 2");

        assert_eq!(engine.command_history(), vec!["3", "buffer 2"]);
        assert_eq!(
            storage.load_history("Doubler").unwrap(),
            Some(vec!["3".to_string(), "buffer 2".to_string()])
        );
    }

    #[test]
    fn test_non_digit_buffer_is_evaluated() {
        let (engine, _) = engine();
        type_and_commit(&engine, "buffer ten");

        assert_eq!(engine.buffer_size(), DEFAULT_BUFFER_SIZE);
        assert_eq!(engine.last_output(), Some("echo: buffer ten".to_string()));
    }

    #[test]
    fn test_history_bounded_by_stored_size() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save_buffer_size(2).unwrap();
        let engine = engine_with(Arc::clone(&storage));

        for command in ["a", "b", "c"] {
            engine.append_to_history(command);
        }

        assert_eq!(engine.command_history(), vec!["b", "c"]);
        assert_eq!(engine.history_cursor(), 2);
        assert_eq!(
            storage.load_history("Doubler").unwrap(),
            Some(vec!["b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_history_loaded_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save_history("Doubler", &["x".to_string(), "y".to_string()])
            .unwrap();
        storage.save_history("Other", &["z".to_string()]).unwrap();

        let engine = engine_with(Arc::clone(&storage));
        assert_eq!(engine.command_history(), vec!["x", "y"]);
        assert_eq!(engine.history_cursor(), 2);
        assert_eq!(engine.previous_command(), Some("y".to_string()));
        assert_eq!(engine.previous_command(), Some("x".to_string()));
        assert_eq!(engine.next_command(), Some("y".to_string()));
        assert_eq!(engine.next_command(), None);
        assert_eq!(engine.history_cursor(), 2);
    }

    #[test]
    fn test_reset_restores_preamble_and_empties_bucket() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save_history("Other", &["keep".to_string()]).unwrap();
        let engine = engine_with(Arc::clone(&storage));

        type_and_commit(&engine, "1");
        type_and_commit(&engine, "reset");

        assert_eq!(engine.transcript(), preamble());
        assert!(engine.command_history().is_empty());
        assert_eq!(engine.history_cursor(), 0);
        assert_eq!(storage.load_history("Doubler").unwrap(), Some(vec![]));
        assert_eq!(
            storage.load_history("Other").unwrap(),
            Some(vec!["keep".to_string()])
        );

        type_and_commit(&engine, "2");
        assert_eq!(engine.command_history(), vec!["2"]);
    }

    #[test]
    fn test_reset_keeps_buffer_size() {
        let (engine, _) = engine();
        type_and_commit(&engine, "buffer 3");
        engine.reset().unwrap();

        assert_eq!(engine.buffer_size(), 3);
        assert_eq!(engine.transcript(), preamble());
    }

    #[test]
    fn test_observers_notified_after_each_commit() {
        let (engine, _) = engine();
        let changes = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let recorded = Arc::clone(&changes);
        engine.subscribe(move |change| recorded.lock().push(*change));

        for input in ["1", "clear", "buffer 4", "reset"] {
            type_and_commit(&engine, input);
        }

        assert_eq!(
            *changes.lock(),
            vec![
                SessionChange::TranscriptChanged,
                SessionChange::Cleared,
                SessionChange::BufferSizeChanged(4),
                SessionChange::Reset,
            ]
        );
    }

    #[test]
    fn test_navigation_does_not_notify() {
        let (engine, _) = engine();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = engine.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        engine.append_to_history("1");
        engine.previous_command();
        engine.next_command();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        engine.evaluate("1");
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(engine.unsubscribe(id));
        engine.evaluate("1");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_observer_can_read_engine() {
        let (engine, _) = engine();
        let engine = Arc::new(engine);
        let seen = Arc::new(parking_lot::Mutex::new(String::new()));

        let weak = Arc::downgrade(&engine);
        let sink = Arc::clone(&seen);
        engine.subscribe(move |_| {
            if let Some(engine) = weak.upgrade() {
                *sink.lock() = engine.transcript();
            }
        });

        engine.evaluate("4");
        assert!(seen.lock().ends_with("=> 8\n>> "));
    }

    #[test]
    fn test_transcript_at_rest_after_every_command() {
        let (engine, _) = engine();
        for input in ["1", "1/0", "help", "buffer", "buffer 9", "clear", "reset", ""] {
            type_and_commit(&engine, input);
            engine.with_session(|s| assert!(s.transcript().is_at_rest(), "after {:?}", input));
        }
    }
}
