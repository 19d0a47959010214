//! Booking logic for the car rental gateway
//!
//! Everything here is pure over a fetched snapshot of cars and reservations;
//! the only I/O goes through the `ReservationBackend` trait.
//!
//! # Services
//!
//! - `AvailabilityPolicy` - Which calendar days can still be booked
//! - `CarStatus` - Aggregate booking status of a car
//! - `CarFilter` - Catalog filtering and ordering
//! - `BookingController` - Date selection, validation and single submission
//! - `ReservationManager` - Backend-facing queries and the cancel-pending action

pub mod availability;
pub mod booking;
pub mod catalog;
pub mod eligibility;
pub mod reservation_manager;

pub use availability::{
    is_date_blocked, AvailabilityPolicy, BlockReason, DayAvailability, HoldState,
};
pub use booking::{
    submit_failure_message, BookingController, BookingError, BookingRules, BookingState, Quote,
    GENERIC_FAILURE,
};
pub use catalog::{CarFilter, CarSort, SortDirection};
pub use eligibility::{can_reserve, classify, pending_reservation, CarStatus};
pub use reservation_manager::{CarSummary, ReservationManager, UserReservation};

/// Booking rule defaults
pub mod constants {
    /// How long a PENDING reservation holds its dates, in minutes
    pub const PENDING_HOLD_MINUTES: i64 = 30;

    /// Whole days between today and the first bookable day
    pub const LEAD_TIME_DAYS: i64 = 1;

    /// Shortest rental, in days
    pub const MIN_RENTAL_DAYS: i64 = 1;

    /// Longest rental, in days
    pub const MAX_RENTAL_DAYS: i64 = 90;

    /// Largest availability calendar served in one request
    pub const CALENDAR_MAX_DAYS: i64 = 90;
}
