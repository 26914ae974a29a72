use thiserror::Error;

/// Transport and validation failures of a list endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx response carrying `ok: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Short machine-readable code, as the server reports it where available
    pub fn code(&self) -> &str {
        match self {
            ApiError::Http(_) => "transport",
            ApiError::Api { message, .. } => message,
            ApiError::Rejected(code) => code,
            ApiError::Parse(_) => "parse",
        }
    }
}
