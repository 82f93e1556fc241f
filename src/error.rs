//! Error types for midi-lstm.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Candle tensor/model error.
    #[error("candle: {0}")]
    Candle(#[from] candle_core::Error),

    /// MIDI file could not be parsed.
    #[error("midi: {0}")]
    Midi(String),

    /// Directory traversal error while scanning for MIDI files.
    #[error("walkdir: {0}")]
    WalkDir(String),

    /// Token file (de)serialization error.
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    /// Invalid configuration.
    #[error("config: {0}")]
    Config(String),

    /// No tokens were extracted from the corpus directory.
    #[error("no note or chord events found under {}", dir.display())]
    EmptyCorpus { dir: PathBuf },

    /// Fewer tokens than needed to fill one window plus its label.
    #[error("{tokens} tokens is not enough for a window of {window}")]
    InsufficientTokens { tokens: usize, window: usize },

    /// A token has no code in the vocabulary it is encoded against.
    #[error("token {0} is not in the vocabulary")]
    UnknownToken(String),

    /// I/O error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<midly::Error> for Error {
    fn from(error: midly::Error) -> Self {
        Error::Midi(error.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Error::WalkDir(error.to_string())
    }
}
