//! Error types for path construction and parsing.

use thiserror::Error;

/// Errors that can occur while building, validating, or parsing paths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// The first segment of a non-empty path is not a `moveTo`.
    #[error("path must start with moveTo, found {0}")]
    MissingMoveTo(&'static str),

    /// A drawing segment carries no anchor point.
    #[error("segment {index} ({kind}) has no points")]
    MissingPoints {
        /// Index of the segment in the path.
        index: usize,
        /// Segment kind name.
        kind: &'static str,
    },

    /// A segment references a non-finite coordinate or parameter.
    #[error("segment {0} has non-finite geometry")]
    NonFinite(usize),

    /// SVG path data contained an unexpected character.
    #[error("invalid path data at offset {offset}: {message}")]
    Syntax {
        /// Byte offset in the input.
        offset: usize,
        /// Error message.
        message: String,
    },

    /// SVG path data used a command this kernel does not import.
    #[error("unsupported path data command '{0}'")]
    UnsupportedCommand(char),
}

/// Result type for path operations.
pub type Result<T> = std::result::Result<T, PathError>;
