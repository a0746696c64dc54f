use thiserror::Error;

/// Errors returned by the internal REST API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response to a read request.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The backend refused a write; `message` is its `detail` / `name` text.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The list body was neither an array nor a `results` / `data` envelope.
    #[error("unrecognized list response shape from {context}")]
    UnexpectedShape { context: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
