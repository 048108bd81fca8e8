//! REST gateway module for the waypool backend.
//!
//! This module provides the `ApiClient` for authenticated requests.
//! Authorization comes from the storage layer at request time, error
//! bodies are mapped onto `ApiError`, and the backend's inconsistent
//! response envelopes are normalized before anything else sees them.

pub mod client;
pub mod error;
pub mod response;

pub use client::{ApiClient, AuthBackend};
pub use error::ApiError;
pub use response::AuthPayload;
