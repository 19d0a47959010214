//! REST backend client
//!
//! Implements `ReservationBackend` over the backend's JSON API. Responses come
//! wrapped in a `{success, message, data}` envelope which is unwrapped here, and
//! HTTP failures are mapped onto `AppError` so callers never see transport types.
//!
//! ```rust,ignore
//! use rental_client::RestBackend;
//!
//! let backend = RestBackend::new("http://localhost:8080", 10_000)?;
//! let cars = backend.authorized(Some(token)).fetch_cars().await?;
//! ```

mod client;
mod error;
mod types;

pub use client::RestBackend;
pub use error::ClientError;
pub use types::{ApiEnvelope, CreatedReservation, ErrorBody};
