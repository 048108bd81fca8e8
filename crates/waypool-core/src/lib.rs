//! Core library for waypool, a carpooling marketplace client.
//!
//! Everything session-related lives here: the persistent key-value
//! stores, the authentication state machine, the HTTP gateway that
//! attaches stored credentials to marketplace requests, and the wire
//! models shared by all of them. Frontends depend on this crate and
//! stay free of storage and protocol detail.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError, AuthBackend, AuthPayload};
pub use auth::{AuthManager, AuthState};
pub use config::Config;
pub use storage::{open_store, Platform, SessionStore, StoreError, StoreKeys};
