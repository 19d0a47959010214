//! API layer for the car rental gateway
//!
//! HTTP handlers exposing car status, availability calendars, quotes and
//! server-held booking sessions. Every handler is generic over the
//! `ReservationBackend`, so the same routes run against the REST backend in
//! production and an in-memory double in tests.

#![forbid(unsafe_code)]

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod state;

pub use dto::ApiResponse;
pub use extract::BackendToken;
pub use handlers::configure_routes;
pub use state::{AppState, SessionStore};
