//! # Error Types
//!
//! Custom error types for Centrifuge Panel using `thiserror`.

use std::num::ParseIntError;

use thiserror::Error;

/// Main error type for Centrifuge Panel
#[derive(Debug, Error)]
pub enum CentrifugeError {
    /// Serial port could not be opened, written or read
    #[error("Serial error: {0}")]
    Serial(String),

    /// The controller closed the serial link
    #[error("Serial link closed by device")]
    LinkClosed,

    /// Duration field did not hold a whole number of seconds
    #[error("Invalid duration '{input}': {source}")]
    InvalidDuration {
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// Duration parsed but exceeds the longest supported run
    #[error("Duration {secs}s exceeds the maximum run of {max_secs}s")]
    DurationTooLong { secs: u64, max_secs: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Centrifuge Panel
pub type Result<T> = std::result::Result<T, CentrifugeError>;
