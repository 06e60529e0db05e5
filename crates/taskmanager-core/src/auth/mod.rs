//! Authentication module for the bearer token and the user session.
//!
//! This module provides:
//! - `TokenStore`: durable home of the single bearer token (keychain, file
//!   or memory backed)
//! - `SessionContext`: in-memory record of the logged-in user

pub mod session;
pub mod token_store;

pub use session::{SessionContext, SessionState};
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
