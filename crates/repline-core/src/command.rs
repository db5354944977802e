//! Special commands recognised ahead of evaluation
//!
//! A handful of words control the session itself instead of being sent to
//! the evaluator. Matching is exact: `clear` is special, ` clear` after
//! extraction is the same (input is trimmed), `clear all` is not.
//! `buffer` followed by anything other than digits is not special either and
//! goes to the evaluator like any other expression.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static BUFFER_SIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^buffer (\d+)$").expect("Invalid buffer size regex"));

/// A control command for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Wipe the transcript down to a bare prompt
    Clear,
    /// Restore the preamble and forget this session's history
    Reset,
    /// List the special commands
    Help,
    /// Report the history buffer size
    ShowBufferSize,
    /// Change the history buffer size
    SetBufferSize(usize),
}

impl SpecialCommand {
    /// Every command shape with its description, in help order
    pub const TABLE: &'static [(&'static str, &'static str)] = &[
        ("clear", "Clear the console"),
        ("reset", "Reset the console and erase its command history"),
        ("help", "Show this list of commands"),
        ("buffer", "Show the command history buffer size"),
        ("buffer <n>", "Set the command history buffer size to n"),
    ];

    /// Recognise a special command
    ///
    /// Digit strings too large for the platform's `usize` are not a valid
    /// size, so `buffer 99999999999999999999999` falls through to evaluation.
    pub fn parse(expression: &str) -> Option<Self> {
        match expression {
            "clear" => Some(Self::Clear),
            "reset" => Some(Self::Reset),
            "help" => Some(Self::Help),
            "buffer" => Some(Self::ShowBufferSize),
            _ => BUFFER_SIZE_REGEX
                .captures(expression)
                .and_then(|caps| caps[1].parse().ok())
                .map(Self::SetBufferSize),
        }
    }

    /// Render the help block listing every command
    pub fn help_text() -> String {
        let width = Self::TABLE
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);

        let mut text = String::from("Special commands:");
        for (name, description) in Self::TABLE {
            text.push_str(&format!("\n  {:<width$}  {}", name, description, width = width));
        }
        text
    }
}

impl fmt::Display for SpecialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "clear"),
            Self::Reset => write!(f, "reset"),
            Self::Help => write!(f, "help"),
            Self::ShowBufferSize => write!(f, "buffer"),
            Self::SetBufferSize(size) => write!(f, "buffer {}", size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_fixed_commands() {
        assert_eq!(SpecialCommand::parse("clear"), Some(SpecialCommand::Clear));
        assert_eq!(SpecialCommand::parse("reset"), Some(SpecialCommand::Reset));
        assert_eq!(SpecialCommand::parse("help"), Some(SpecialCommand::Help));
        assert_eq!(
            SpecialCommand::parse("buffer"),
            Some(SpecialCommand::ShowBufferSize)
        );
    }

    #[test]
    fn test_parse_buffer_size() {
        assert_eq!(
            SpecialCommand::parse("buffer 10"),
            Some(SpecialCommand::SetBufferSize(10))
        );
        assert_eq!(
            SpecialCommand::parse("buffer 0"),
            Some(SpecialCommand::SetBufferSize(0))
        );
    }

    #[test]
    fn test_non_digit_buffer_falls_through() {
        assert_eq!(SpecialCommand::parse("buffer ten"), None);
        assert_eq!(SpecialCommand::parse("buffer -1"), None);
        assert_eq!(SpecialCommand::parse("buffer 1.5"), None);
        assert_eq!(SpecialCommand::parse("buffer 99999999999999999999999"), None);
    }

    #[test]
    fn test_ordinary_expressions() {
        assert_eq!(SpecialCommand::parse(""), None);
        assert_eq!(SpecialCommand::parse("clear all"), None);
        assert_eq!(SpecialCommand::parse("Help"), None);
        assert_eq!(SpecialCommand::parse("1 + 1"), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for command in [
            SpecialCommand::Clear,
            SpecialCommand::Reset,
            SpecialCommand::Help,
            SpecialCommand::ShowBufferSize,
            SpecialCommand::SetBufferSize(7),
        ] {
            assert_eq!(SpecialCommand::parse(&command.to_string()), Some(command));
        }
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = SpecialCommand::help_text();
        for (name, description) in SpecialCommand::TABLE {
            assert!(help.contains(name));
            assert!(help.contains(description));
        }
    }
}
