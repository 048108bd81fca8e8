//! Data models for waypool entities.
//!
//! This module contains the data structures exchanged with the waypool
//! backend and persisted locally:
//!
//! - `User`, `LoginCredentials`, `RegisterCredentials`: identity types
//! - `Trip`, `TripDriver`: published rides and their drivers
//! - `Reservation`: seat requests and upcoming confirmed rides
//! - `ChatMessage`: per-trip conversations between driver and passenger

pub mod message;
pub mod reservation;
pub mod trip;
pub mod user;

pub use message::{ChatMessage, SendMessageRequest};
pub use reservation::{Reservation, ReservationDriver, ReservationTrip};
pub use trip::{CreateTripRequest, Trip, TripDriver, TripFilters};
pub use user::{LoginCredentials, RegisterCredentials, User};
