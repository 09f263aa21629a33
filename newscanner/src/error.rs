use rocket::http::Status;
use thiserror::Error;

/// Failures surfaced by the search and summary pipelines.
///
/// `Validation` is caller-caused; everything else means a provider failed or
/// replied with something we could not use. Nothing here is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScannerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    Throttled(String),
}

pub type Result<T> = std::result::Result<T, ScannerError>;

impl ScannerError {
    /// HTTP status used at the route boundary.
    pub fn status(&self) -> Status {
        match self {
            ScannerError::Validation(_) => Status::BadRequest,
            _ => Status::InternalServerError,
        }
    }

    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScannerError::Validation(_) => "validation",
            ScannerError::Upstream(_) => "upstream",
            ScannerError::MalformedResponse(_) => "malformed_response",
            ScannerError::Auth(_) => "auth",
            ScannerError::Request(_) => "request",
            ScannerError::Throttled(_) => "throttled",
        }
    }

    /// Classify a non-success provider status. `provider` names the service in messages.
    pub fn from_status(provider: &str, status: u16, body: &str) -> Self {
        let detail = body.trim();
        match status {
            401 => ScannerError::Auth(format!("{}: invalid API key", provider)),
            400 => ScannerError::Request(format!(
                "{}: invalid request (400): {}",
                provider, detail
            )),
            429 => ScannerError::Throttled(format!("{}: rate limit exceeded (429)", provider)),
            _ => ScannerError::Upstream(format!("{} error {}: {}", provider, status, detail)),
        }
    }

    /// Transport-level failure (connect, timeout, body read).
    pub fn transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScannerError::Upstream(format!("{} request timed out: {}", provider, err))
        } else {
            ScannerError::Upstream(format!("{} request failed: {}", provider, err))
        }
    }
}
