//! Chapter error definitions.

use std::fmt;

use thiserror::Error;

/// Line/column position inside an XML document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub row: u32,
    pub col: u32,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

impl From<roxmltree::TextPos> for TextPosition {
    fn from(pos: roxmltree::TextPos) -> Self {
        Self {
            row: pos.row,
            col: pos.col,
        }
    }
}

/// Errors that can occur while reading or parsing chapters.
#[derive(Error, Debug)]
pub enum ChapterError {
    /// A line in a simple chapter file where a timestamp line was expected.
    #[error("Simple chapter parser: '{0}' is not a CHAPTERxx=... line.")]
    InvalidLine(String),

    /// A line in a simple chapter file where a name line was expected.
    #[error("Simple chapter parser: '{0}' is not a CHAPTERxxNAME=... line.")]
    InvalidNameLine(String),

    #[error("Simple chapter parser: Invalid minute: {0}")]
    InvalidMinute(i64),

    #[error("Simple chapter parser: Invalid second: {0}")]
    InvalidSecond(i64),

    /// Malformed cue sheet.
    #[error("Cue sheet parser: line {line}: {message}")]
    InvalidCue { line: usize, message: String },

    /// Nothing in the source looks like a known chapter format.
    #[error("Unknown chapter file format in '{0}'. It does not contain a supported chapter format.")]
    UnknownFormat(String),

    /// Reading the chapter source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML is malformed or violates the element schema.
    #[error("{}", xml_message(.message, .position))]
    Xml {
        message: String,
        position: Option<TextPosition>,
    },

    /// Uniform error returned at the parsing boundary.
    #[error("{0}")]
    Parser(String),
}

impl ChapterError {
    pub(crate) fn xml(message: impl Into<String>, position: Option<TextPosition>) -> Self {
        Self::Xml {
            message: message.into(),
            position,
        }
    }
}

fn xml_message(message: &str, position: &Option<TextPosition>) -> String {
    match position {
        Some(pos) => format!("XML error at position {}: {}", pos, message),
        None => format!("XML error: {}", message),
    }
}

/// Result type for chapter operations.
pub type ChapterResult<T> = Result<T, ChapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            ChapterError::InvalidMinute(75).to_string(),
            "Simple chapter parser: Invalid minute: 75"
        );
        assert_eq!(
            ChapterError::InvalidLine("FOO".into()).to_string(),
            "Simple chapter parser: 'FOO' is not a CHAPTERxx=... line."
        );
        let err = ChapterError::xml("bad", Some(TextPosition { row: 3, col: 7 }));
        assert_eq!(err.to_string(), "XML error at position 3:7: bad");
    }
}
