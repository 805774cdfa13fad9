//! Error types for Setu

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Setu error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Position outside the grid
    #[error("Position ({col}, {row}) is outside the grid")]
    OutOfBounds {
        /// Column of the rejected position
        col: usize,
        /// Row of the rejected position
        row: usize,
    },

    /// Transport reports that it is not open
    #[error("Serial port is not open")]
    NotOpen,

    /// Transport failed permanently and the link was closed
    #[error("Transport closed: {0}")]
    TransportClosed(String),

    /// Session operation requested in the wrong link state
    #[error("Invalid link state: {0}")]
    InvalidState(&'static str),

    /// Worker thread panicked
    #[error("Link worker thread panicked")]
    ThreadPanic,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
