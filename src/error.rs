//! Error types for the valuation client.

/// Errors that can occur while calling the API or mapping its responses.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required caller-supplied parameter was missing or empty.
    ///
    /// Raised before any network traffic; the payload names the offending
    /// query parameter.
    #[error("Invalid request: parameter `{0}` must not be empty")]
    InvalidRequest(&'static str),

    /// The HTTP round trip failed: connection error, timeout, or a
    /// non-success status code.
    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded, or the decoded tree was
    /// missing the structure the operation requires.
    ///
    /// `body` holds the raw response text for diagnosis.
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String, body: String },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
