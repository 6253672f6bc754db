//! Tag error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while editing tags or accounting track statistics.
#[derive(Error, Debug)]
pub enum TagError {
    /// A track's compression or encryption cannot be reversed.
    #[error("Tracks with unsupported content encoding schemes (compression or encryption) cannot be modified (track {track_number}).")]
    UnsupportedContentEncoding { track_number: u64 },

    /// Reversing a supported content encoding failed for a frame.
    #[error("Content decoding failed for track {track_number}: {message}")]
    ContentDecoding { track_number: u64, message: String },

    /// Reading from the segment failed.
    #[error("Error reading the segment: {0}")]
    Read(String),

    /// The tag file could not be read.
    #[error("Could not open '{path}' for reading: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tag file is not a valid Matroska tag XML document.
    #[error("The XML tag file '{path}' contains an error: {message}")]
    Xml { path: PathBuf, message: String },

    /// Malformed `--tags` style argument.
    #[error("Invalid tag argument '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// No track matches the selector of a track-scoped edit.
    #[error("No track corresponding to the selector '{0}' was found.")]
    TrackNotFound(String),
}

/// Result type alias for tag operations.
pub type TagResult<T> = Result<T, TagError>;
