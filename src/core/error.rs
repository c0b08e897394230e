//! Error types for the chopsticks application
//!
//! Covers settings loading, terminal I/O, command-line input parsing and errors bubbling
//! up from the engine.

use chopsticks_engine::EngineError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Error, Debug)]
pub enum AppError {
    /// Settings file or terminal I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("Settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),

    /// Engine rejected a state, move or configuration
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Text the user typed could not be understood
    #[error("Could not parse {what} from '{input}': {reason}")]
    Parse {
        what: &'static str,
        input: String,
        reason: String,
    },

    /// Logging could not be installed
    #[error("Logging initialization failed: {message}")]
    Logging { message: String },
}

impl AppError {
    pub(crate) fn parse(what: &'static str, input: &str, reason: impl Into<String>) -> Self {
        AppError::Parse {
            what,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
