// Keyrec Key Traces
// Line-oriented scripts of key events and recorder commands

use std::fmt;

use crate::action::{Action, KeyEvent};
use crate::recorder::ShortcutRecorder;
use crate::Key;

/// One step of a key trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStep {
    Key(KeyEvent),
    Start,
    Stop,
    Reset,
    Clear,
}

impl TraceStep {
    /// Apply this step to a recorder
    pub fn apply(&self, recorder: &mut ShortcutRecorder) {
        match self {
            TraceStep::Key(event) => recorder.handle_event(event),
            TraceStep::Start => recorder.start_recording(),
            TraceStep::Stop => recorder.stop_recording(),
            TraceStep::Reset => recorder.reset_recording(),
            TraceStep::Clear => recorder.clear_last_recording(),
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceStep::Key(event) => write!(f, "{}", event),
            TraceStep::Start => write!(f, "start"),
            TraceStep::Stop => write!(f, "stop"),
            TraceStep::Reset => write!(f, "reset"),
            TraceStep::Clear => write!(f, "clear"),
        }
    }
}

/// Errors that can occur while parsing a trace
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' expects a key")]
    MissingKey { line: usize, command: String },

    #[error("line {line}: unexpected trailing input '{rest}'")]
    TrailingInput { line: usize, rest: String },
}

/// Parse a whole trace.
///
/// One step per line; `#` starts a comment and blank lines are skipped.
/// `tap <Key>` expands into a press followed by a release.
pub fn parse_trace(input: &str) -> Result<Vec<TraceStep>, TraceError> {
    let mut steps = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let content = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if content.is_empty() {
            continue;
        }
        parse_line(line, content, &mut steps)?;
    }
    Ok(steps)
}

fn parse_line(line: usize, content: &str, steps: &mut Vec<TraceStep>) -> Result<(), TraceError> {
    // Shorthand: +Key presses, -Key releases
    if let Some(rest) = content.strip_prefix('+') {
        steps.push(TraceStep::Key(KeyEvent::press(single_key(line, "+", rest)?)));
        return Ok(());
    }
    if let Some(rest) = content.strip_prefix('-') {
        steps.push(TraceStep::Key(KeyEvent::release(single_key(line, "-", rest)?)));
        return Ok(());
    }

    let (command, rest) = match content.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (content, ""),
    };

    if let Some(action) = Action::from_word(command) {
        let key = single_key(line, command, rest)?;
        steps.push(TraceStep::Key(KeyEvent::new(key, action)));
        return Ok(());
    }

    let step = match command {
        "tap" => {
            let key = single_key(line, command, rest)?;
            steps.push(TraceStep::Key(KeyEvent::press(key.clone())));
            TraceStep::Key(KeyEvent::release(key))
        }
        "start" => TraceStep::Start,
        "stop" => TraceStep::Stop,
        "reset" => TraceStep::Reset,
        "clear" => TraceStep::Clear,
        _ => {
            return Err(TraceError::UnknownCommand {
                line,
                command: command.to_string(),
            })
        }
    };

    if matches!(step, TraceStep::Key(_)) || rest.is_empty() {
        steps.push(step);
        Ok(())
    } else {
        Err(TraceError::TrailingInput {
            line,
            rest: rest.to_string(),
        })
    }
}

fn single_key(line: usize, command: &str, rest: &str) -> Result<Key, TraceError> {
    let (key, trailing) = match rest.trim().split_once(char::is_whitespace) {
        Some((key, trailing)) => (key, trailing.split_whitespace().collect::<Vec<_>>()),
        None => (rest, Vec::new()),
    };
    if !trailing.is_empty() {
        return Err(TraceError::TrailingInput {
            line,
            rest: trailing.join(" "),
        });
    }
    key.parse::<Key>().map_err(|_| TraceError::MissingKey {
        line,
        command: command.to_string(),
    })
}
