//! Session state and lifecycle.
//!
//! `AuthState` is the immutable snapshot consumers render from;
//! `AuthManager` drives the transitions between them.

pub mod manager;
pub mod state;

pub use manager::AuthManager;
pub use state::AuthState;
