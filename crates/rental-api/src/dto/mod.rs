//! Data Transfer Objects (DTOs) for API requests and responses

pub mod booking;
pub mod car;
pub mod common;

pub use booking::*;
pub use car::*;
pub use common::*;
