use thiserror::Error;

use crate::runtime::RuntimeError;

/// Error types for the ingestion flow. Every variant is fatal to a run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The request itself failed (DNS, connection, body decoding)
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Fetching {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A link could not be resolved into an absolute URL
    #[error("Invalid URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// An expected fragment is absent from a page
    #[error("Missing {field} on page {page}")]
    MissingField { field: &'static str, page: String },

    /// A start timestamp is not valid ISO-8601
    #[error("Invalid timestamp '{value}' on page {page}: {source}")]
    Timestamp {
        value: String,
        page: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The runtime text could not be turned into a duration
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Type alias for Result with IngestError
pub type Result<T> = std::result::Result<T, IngestError>;
