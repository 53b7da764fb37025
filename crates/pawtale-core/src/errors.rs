use std::time::Duration;

/// Typed error hierarchy for model backend calls.
/// Transient errors are retried; fatal ones surface immediately.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GatewayError {
    // Fatal
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    // Backend reported failure
    #[error("rate limited")]
    RateLimited,
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    // Transient
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// Only connection-level failures are retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::Timeout(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::InvalidRequest(_) | Self::NotConfigured(_)
        )
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotConfigured(_) => "not_configured",
            Self::RateLimited => "rate_limited",
            Self::ServerError { .. } => "server_error",
            Self::UnexpectedResponse(_) => "unexpected_response",
            Self::NetworkError(_) => "network_error",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Classify an HTTP status code into the appropriate error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            400 | 404 | 422 => Self::InvalidRequest(body),
            429 => Self::RateLimited,
            500..=599 => Self::ServerError { status, body },
            _ => Self::UnexpectedResponse(format!("status {status}: {body}")),
        }
    }
}
