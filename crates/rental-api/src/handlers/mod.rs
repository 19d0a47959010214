//! HTTP request handlers

pub mod booking;
pub mod car;
pub mod health;
pub mod reservation;

use actix_web::web;
use rental_core::traits::ReservationBackend;

pub use booking::configure as configure_bookings;
pub use car::configure as configure_cars;
pub use health::configure as configure_health;
pub use reservation::configure as configure_reservations;

/// Configure every API route under `/api/v1`
pub fn configure_routes<B: ReservationBackend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .configure(configure_health::<B>)
            // Car status, calendar, quote and cancel-pending
            .configure(configure_cars::<B>)
            // A user's reservations with hold state
            .configure(configure_reservations::<B>)
            // Server-held booking forms
            .configure(configure_bookings::<B>),
    );
}
