//! Delivery error types.

/// Errors delivering a response to the controller.
///
/// URLs carried here are redacted: the presigned query string is a
/// credential and must not end up in logs. Wrapped `reqwest` errors are
/// stored with their URL stripped.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The event's `ResponseURL` is not a usable URL.
    #[error("invalid response URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The envelope could not be serialized.
    #[error("failed to serialize response envelope: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    /// HTTP transport error.
    #[error("HTTP error sending response to {url}: {source}")]
    Http { url: String, source: reqwest::Error },
    /// The controller did not acknowledge with 200.
    #[error("Expected HTTP 200, but received {status} from {url}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },
}
