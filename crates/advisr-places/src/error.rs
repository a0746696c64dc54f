use thiserror::Error;

/// Errors returned by the external places adapter.
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The service answered 200 with a non-success `status` field such as
    /// `REQUEST_DENIED` or `INVALID_REQUEST`.
    #[error("places service returned {status}: {message}")]
    Status { status: String, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
