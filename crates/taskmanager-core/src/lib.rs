//! Core library for taskmanager.
//!
//! This crate provides the authenticated client side of the Task Manager
//! REST API:
//!
//! - `api`: HTTP pipeline that attaches the stored bearer token per request
//! - `auth`: token storage backends and the in-memory session
//! - `services`: login, registration, profile and task endpoints with
//!   user-facing error mapping
//! - `config`: file and environment configuration
//! - `redact`: scrubbing of credentials before payloads are logged

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod redact;
pub mod services;

pub use api::{ApiClient, ApiError, ClientConfig};
pub use auth::{SessionContext, SessionState, TokenStore};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{AuthError, ErrorKind, ServiceError, ValidationError};
pub use services::{AuthService, TaskService, UserService};
