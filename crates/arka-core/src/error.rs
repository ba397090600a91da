//! Error types for Arka
//!
//! The AI pipeline is a linear state machine and every terminal failure maps
//! to exactly one of these variants. The pure finance helpers never return
//! errors; they degrade to benign output instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Required credential missing. Checked before any I/O, never retried.
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// Non-success HTTP status from the AI provider.
    #[error("API Error: {status} {status_text} - {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Response body is not JSON and no embedded JSON object could be located.
    #[error("Parsing Error: {0}")]
    Parsing(String),

    /// JSON parsed but fails schema constraints. The message lists every
    /// violated field/constraint pair, not just the first.
    #[error("Validation Error: {0}")]
    Validation(String),

    /// Catch-all for any other unexpected failure during the pipeline,
    /// preserving the original message.
    #[error("Processing Error: {0}")]
    Processing(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Processing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
