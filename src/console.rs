//! Line-editor front end
//!
//! The editor has already echoed what the user typed, so after each commit
//! only the text the transcript gained is printed. When the transcript was
//! replaced (`clear`, `reset`) the screen is redrawn instead. The trailing
//! prompt is never printed here; the editor draws it when it reads the next
//! line.
//!
//! Up and Down walk the session's own history buffer. The editor keeps no
//! history of its own.

use repline_core::{Evaluator, SessionEngine};
use rustyline::error::ReadlineError;
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyCode,
    KeyEvent, Modifiers, Movement, RepeatCount,
};
use std::io::Write;
use std::sync::Arc;

/// What to print after a commit
#[derive(Debug, PartialEq, Eq)]
pub enum Update<'a> {
    /// Text appended after the submitted line
    Append(&'a str),
    /// The whole transcript, which no longer extends the submitted text
    Redraw(&'a str),
}

/// Compare the submitted text with the transcript that came back
pub fn update<'a>(submitted: &str, transcript: &'a str) -> Update<'a> {
    match transcript.strip_prefix(submitted) {
        Some(added) => Update::Append(added.strip_prefix('\n').unwrap_or(added)),
        None => Update::Redraw(transcript),
    }
}

/// Submit one line typed after the current prompt
pub fn submit<E: Evaluator>(engine: &SessionEngine<E>, line: &str) -> String {
    let submitted = format!("{}{}", engine.transcript(), line);
    engine.commit(&submitted);
    let transcript = engine.transcript();
    match update(&submitted, &transcript) {
        Update::Append(added) => added.to_string(),
        Update::Redraw(all) => format!("\x1b[2J\x1b[H{}", all),
    }
}

/// The prompt the editor draws before each line
pub fn prompt_text<E: Evaluator>(engine: &SessionEngine<E>) -> String {
    format!("{} ", engine.flavor().prompt)
}

/// Drop the trailing prompt from printed transcript text
pub fn strip_prompt<'a>(printed: &'a str, prompt: &str) -> &'a str {
    printed.strip_suffix(prompt).unwrap_or(printed)
}

/// Evaluate a single expression, returning its output without the next prompt
pub fn execute_once<E: Evaluator>(engine: &SessionEngine<E>, expression: &str) -> String {
    let printed = submit(engine, expression);
    strip_prompt(&printed, &prompt_text(engine)).trim_end().to_string()
}

/// History direction bound to an arrow key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    Previous,
    Next,
}

/// Arrow-key handler that reads from the session's history buffer
pub struct HistoryKey<E: Evaluator> {
    engine: Arc<SessionEngine<E>>,
    direction: Recall,
}

impl<E: Evaluator> HistoryKey<E> {
    pub fn new(engine: Arc<SessionEngine<E>>, direction: Recall) -> Self {
        Self { engine, direction }
    }

    /// Text to put on the line, `None` to leave the line as it is
    pub fn replacement(&self) -> Option<String> {
        match self.direction {
            Recall::Previous => self.engine.previous_command(),
            // Past the newest entry the line goes back to empty input
            Recall::Next => Some(self.engine.next_command().unwrap_or_default()),
        }
    }
}

impl<E: Evaluator + 'static> ConditionalEventHandler for HistoryKey<E> {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        _ctx: &EventContext,
    ) -> Option<Cmd> {
        match self.replacement() {
            Some(line) => Some(Cmd::Replace(Movement::WholeBuffer, Some(line))),
            None => Some(Cmd::Noop),
        }
    }
}

/// Read and evaluate lines until Ctrl-D
pub fn run<E>(engine: Arc<SessionEngine<E>>, show_welcome: bool) -> anyhow::Result<()>
where
    E: Evaluator + 'static,
{
    let mut editor = DefaultEditor::new()?;
    for (code, direction) in [(KeyCode::Up, Recall::Previous), (KeyCode::Down, Recall::Next)] {
        let handler = HistoryKey::new(Arc::clone(&engine), direction);
        editor.bind_sequence(
            KeyEvent(code, Modifiers::NONE),
            EventHandler::Conditional(Box::new(handler)),
        );
    }

    let prompt = prompt_text(&engine);
    let mut stdout = std::io::stdout();

    if show_welcome {
        write!(stdout, "{}", strip_prompt(&engine.transcript(), &prompt))?;
        stdout.flush()?;
    }

    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let printed = submit(&engine, &line);
                write!(stdout, "{}", strip_prompt(&printed, &prompt))?;
                stdout.flush()?;
            }
            Err(ReadlineError::Interrupted) => {
                println!("Ctrl-C: press Ctrl-D to exit");
            }
            Err(ReadlineError::Eof) => {
                tracing::debug!("End of input, closing session");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
