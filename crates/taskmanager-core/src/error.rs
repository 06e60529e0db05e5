//! Errors surfaced by the service layer.
//!
//! Every service function converts the raw [`ApiError`] into one of these
//! so the front end can show `to_string()` directly to the user.

use thiserror::Error;

use crate::api::ApiError;

/// Shown when a 400 on registration/profile update carries no detail
pub const INVALID_DATA_MESSAGE: &str = "Invalid data sent. Check the fields and try again.";

/// Client-side or server-reported problems with user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters.")]
    PasswordTooShort { min: usize },

    #[error("New password must differ from the current one.")]
    SamePassword,

    #[error("Current password is incorrect.")]
    WrongCurrentPassword,

    #[error("Task title is required.")]
    BlankTitle,

    #[error("{0}")]
    InvalidData(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("This account is inactive.")]
    InactiveAccount,

    #[error("This email has not been registered yet.")]
    UnregisteredEmail,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A 400 whose server message is shown as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Could not load {resource}.")]
    Fetch {
        resource: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Server is not responding. Check your connection.")]
    Connectivity(#[source] ApiError),

    #[error("Could not prepare the request: {0}")]
    Request(String),

    #[error("Token storage failed: {0}")]
    Storage(String),
}

/// Coarse classification of a [`ServiceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Server,
    Connectivity,
    Internal,
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Auth(_) => ErrorKind::Auth,
            ServiceError::Rejected(_) | ServiceError::Server(_) | ServiceError::Fetch { .. } => {
                ErrorKind::Server
            }
            ServiceError::Connectivity(_) => ErrorKind::Connectivity,
            ServiceError::Request(_) | ServiceError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Mapping shared by every endpoint once its specific statuses are handled.
    pub fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::NetworkError(_) => ServiceError::Connectivity(err),
            ApiError::Request(msg) => ServiceError::Request(msg),
            ApiError::TokenStore(msg) => ServiceError::Storage(msg),
            ApiError::InvalidResponse(msg) => ServiceError::Server(msg),
            ApiError::RateLimited => {
                ServiceError::Server("too many requests, try again shortly".to_string())
            }
            other => {
                let detail = other
                    .server_message()
                    .unwrap_or_else(|| match other.status() {
                        Some(status) => status.to_string(),
                        None => other.to_string(),
                    });
                ServiceError::Server(detail)
            }
        }
    }

    /// Any failure while loading `resource`, collapsed into one message.
    pub fn fetch(resource: &'static str, err: ApiError) -> Self {
        match err {
            ApiError::Request(msg) => ServiceError::Request(msg),
            ApiError::TokenStore(msg) => ServiceError::Storage(msg),
            source => ServiceError::Fetch { resource, source },
        }
    }

    pub fn storage(err: anyhow::Error) -> Self {
        ServiceError::Storage(format!("{:#}", err))
    }
}
