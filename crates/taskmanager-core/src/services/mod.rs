//! Service layer over the API client.
//!
//! Each service validates input, calls its endpoints and translates
//! transport failures into [`ServiceError`](crate::error::ServiceError)s
//! whose messages can be shown to the user as-is.

pub mod auth;
pub mod task;
pub mod user;

pub use auth::AuthService;
pub use task::TaskService;
pub use user::UserService;
