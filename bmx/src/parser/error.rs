use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::Files;
use thiserror::Error;

const HINT_FILLER: char = '~';
const HINT_POINTER: char = '^';

/// Which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be obtained: empty string, unreadable stream.
    Input,
    /// The input violates the BMX grammar.
    Syntax,
}

/// Location of a syntax error inside the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 0-based character index within the line.
    pub column: usize,
    /// Byte index within the line.
    pub offset: usize,
    /// Byte length of the character at `offset` (0 past the end of the line).
    pub width: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column + 1)
    }
}

/// Errors raised while loading a BMX document.
///
/// Parsing stops at the first error; no partial document is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{message}")]
    Input { message: String },

    #[error("{position}: {message}")]
    Syntax {
        message: String,
        position: Position,
        /// The offending line followed by a `~~~^` pointer line.
        hint: String,
    },
}

impl ParseError {
    pub fn input(message: impl Into<String>) -> Self {
        ParseError::Input {
            message: message.into(),
        }
    }

    /// Build a syntax error pointing at byte `offset` of `line`.
    pub fn syntax(line_number: usize, line: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(line.len());
        let before = line.get(..offset).unwrap_or(line);
        let column = before.chars().count();
        let width = line
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);

        ParseError::Syntax {
            message: message.into(),
            position: Position {
                line: line_number,
                column,
                offset,
                width,
            },
            hint: render_hint(line, column),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Input { .. } => ErrorKind::Input,
            ParseError::Syntax { .. } => ErrorKind::Syntax,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Input { message } | ParseError::Syntax { message, .. } => message,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            ParseError::Input { .. } => None,
            ParseError::Syntax { position, .. } => Some(position),
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            ParseError::Input { .. } => None,
            ParseError::Syntax { hint, .. } => Some(hint),
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    ///
    /// The label covers the offending character of the line in `file_id`.
    /// If `files` does not know that line, the textual hint is attached as a
    /// note instead.
    pub fn to_diagnostic<'a, F>(&self, files: &'a F, file_id: usize) -> Diagnostic<usize>
    where
        F: Files<'a, FileId = usize>,
    {
        match self {
            ParseError::Input { message } => Diagnostic::error().with_message(message),
            ParseError::Syntax {
                message,
                position,
                hint,
            } => {
                let diagnostic = Diagnostic::error().with_message(message);
                match files.line_range(file_id, position.line.saturating_sub(1)) {
                    Ok(range) => {
                        let start = (range.start + position.offset).min(range.end);
                        let end = (start + position.width).min(range.end);
                        diagnostic.with_labels(vec![Label::primary(file_id, start..end)])
                    }
                    Err(_) => diagnostic.with_notes(vec![hint.clone()]),
                }
            }
        }
    }
}

/// Two-line pointer text: the raw line, then filler up to `column` and a
/// pointer exactly under it.
pub(crate) fn render_hint(line: &str, column: usize) -> String {
    let mut hint = String::with_capacity(line.len() + column + 2);
    hint.push_str(line);
    hint.push('\n');
    hint.extend(std::iter::repeat_n(HINT_FILLER, column));
    hint.push(HINT_POINTER);
    hint
}

/// A grammar violation within one line, before the line number is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineError {
    pub offset: usize,
    pub message: &'static str,
}

impl LineError {
    pub fn new(offset: usize, message: &'static str) -> Self {
        LineError { offset, message }
    }
}
