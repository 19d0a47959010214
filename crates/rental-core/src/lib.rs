//! Car rental core library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the car rental booking gateway. It includes:
//!
//! - Domain models (Car, Reservation, statuses)
//! - Day-granularity date utilities used by every availability check
//! - Traits for the REST backend and the injected clock
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
