//! Error types for lyric format parsing and generation.

use thiserror::Error;

/// Format adapter error variants.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A structured time value could not be parsed
    #[error("invalid time value `{0}`")]
    BadTime(String),

    /// ASS input without an [Events] section
    #[error("no [Events] section found")]
    MissingEvents,

    /// SRT parsing error
    #[error(transparent)]
    Srt(#[from] srtlib::ParsingError),

    /// Unrecognized format name or file extension
    #[error("unknown lyric format: {0}")]
    UnknownFormat(String),
}

/// Result type alias for format operations.
pub type Result<T> = std::result::Result<T, FormatError>;
