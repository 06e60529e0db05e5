use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a single request through the [`ApiClient`](super::ApiClient).
///
/// The client never interprets these; services decide what a status means
/// for the endpoint they called.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(ErrorBody),

    #[error("Unauthorized: {0}")]
    Unauthorized(ErrorBody),

    #[error("Access denied: {0}")]
    AccessDenied(ErrorBody),

    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    #[error("Rate limited")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    ServerError { status: StatusCode, body: ErrorBody },

    #[error("Unexpected status {status}: {body}")]
    Rejected { status: StatusCode, body: ErrorBody },

    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Could not build request: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token store unavailable: {0}")]
    TokenStore(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Body of an error response.
///
/// `text` is truncated for display and logs. `message` is parsed from the
/// full body before truncation, so long payloads keep their detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub text: String,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(body: &str) -> Self {
        Self {
            text: ApiError::truncate_body(body),
            message: ServerMessage::extract(body),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = ErrorBody::new(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(body),
            401 => ApiError::Unauthorized(body),
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { status, body },
            _ => ApiError::Rejected { status, body },
        }
    }

    /// Classify a transport error from reqwest.
    ///
    /// Builder failures never left the process; everything else means the
    /// request went out and no usable response came back.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::NetworkError(err)
        }
    }

    /// HTTP status of the response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ApiError::AccessDenied(_) => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::ServerError { status, .. } | ApiError::Rejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::BadRequest(body)
            | ApiError::Unauthorized(body)
            | ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError { body, .. }
            | ApiError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Raw (truncated) response body, if the server answered with one.
    pub fn body(&self) -> Option<&str> {
        self.error_body().map(|b| b.text.as_str())
    }

    /// Human-readable detail the server put in its error body.
    pub fn server_message(&self) -> Option<String> {
        self.error_body().and_then(|b| b.message.clone())
    }
}

/// Error payload shape used by the Task Manager server.
///
/// Different endpoints fill different fields, so every one is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<ServerMessageDetails>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerMessageDetails {
    #[serde(default)]
    pub motivo: Option<String>,
}

impl ServerMessage {
    /// Pick the most specific message: `message`, then `details.motivo`,
    /// then `error`. Blank strings are skipped.
    pub fn extract(body: &str) -> Option<String> {
        let parsed: ServerMessage = serde_json::from_str(body).ok()?;
        let motivo = parsed.details.and_then(|d| d.motivo);
        [parsed.message, motivo, parsed.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}
