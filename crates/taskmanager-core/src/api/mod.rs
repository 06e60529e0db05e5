//! REST API client module for the Task Manager server.
//!
//! This module provides the `ApiClient` request pipeline. Requests are
//! authenticated with a bearer token read from the configured
//! [`TokenStore`](crate::auth::TokenStore) at call time.

pub mod client;
pub mod error;

pub use client::{ApiClient, ClientConfig};
pub use error::{ApiError, ErrorBody, ServerMessage};
