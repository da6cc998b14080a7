use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of a call against the metadata API.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse failed: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest includes the request URL, and with it the api_key parameter.
        UpstreamError::Transport(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(e: serde_json::Error) -> Self {
        UpstreamError::Decode(e.to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream call failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl UpstreamError {
    /// Client-facing description that never repeats upstream text.
    pub fn public_message(&self) -> String {
        match self {
            UpstreamError::Transport(_) => "metadata service unreachable".to_string(),
            UpstreamError::Status { status, .. } => {
                format!("metadata service returned status {}", status)
            }
            UpstreamError::Decode(_) => "metadata service sent an unreadable response".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::Upstream(e) => {
                tracing::error!(error = %e, "Upstream call failed");
                (StatusCode::BAD_GATEWAY, e.public_message())
            }
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}


pub type Result<T, E = Error> = std::result::Result<T, E>;
