//! Data models for Task Manager entities.
//!
//! Field names on the wire are Portuguese (`nome`, `senha`, ...); the Rust
//! side uses English names and serde renames.
//!
//! - `Credentials`, `LoginResponse`: login exchange
//! - `UserProfile` and its request bodies
//! - `Category`, `NewTask`, `Task`, `TaskStatus`, `TaskPriority`

pub mod task;
pub mod user;

pub use task::{CategoriesResponse, Category, NewTask, Task, TaskPriority, TaskStatus};
pub use user::{
    ChangePasswordRequest, Credentials, LoginResponse, RegisterRequest, UpdateProfileRequest,
    UserProfile, MIN_PASSWORD_LENGTH,
};
