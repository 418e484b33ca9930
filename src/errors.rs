use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// A request that never produced a usable response.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response ({status}): {reason}")]
    Decode { status: u16, reason: String },
    #[error("cannot build request URL for {0}")]
    Url(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend origin {origin:?}: {reason}")]
    Origin { origin: String, reason: String },
    #[error("{key} must be a number, got {value:?}")]
    Number { key: &'static str, value: String },
    #[error("APP_INCLUDE_CREDENTIALS must be 'include' or 'omit', got {0:?}")]
    Credentials(String),
}
