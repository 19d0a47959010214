//! Domain models for the car rental gateway
//!
//! Shapes follow the REST backend's JSON so they can be deserialized directly.

pub mod car;
pub mod reservation;

pub use car::{Car, CarId, DriveType, TransmissionType};
pub use reservation::{CreateReservation, Reservation, ReservationId, ReservationStatus};
