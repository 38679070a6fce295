use thiserror::Error;

/// Errors produced by the transport gateway.
///
/// Three classes, kept distinguishable because callers treat them
/// differently: transport failures and decode failures mean the service was
/// never heard or not understood, while `Service` carries the service's own
/// `Err` payload verbatim.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request could not be completed (connect, timeout, body read).
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The channel answered with a non-success HTTP status.
    #[error("transport failure: service answered status {0}")]
    Status(reqwest::StatusCode),

    /// The call succeeded but the service returned an application error.
    #[error("{0}")]
    Service(String),

    /// A successful payload could not be parsed into the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this is a transport-level failure (as opposed to an
    /// application `Err` or a decode failure).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status(_))
    }
}
