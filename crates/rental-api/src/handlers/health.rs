//! Health check handler

use actix_web::{web, HttpResponse};
use rental_core::traits::ReservationBackend;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// GET /api/v1/health
pub async fn health_check<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "car-rental",
        "version": env!("CARGO_PKG_VERSION"),
        "booking_sessions": state.sessions.len(),
        "now": state.clock().now(),
    }))
}

/// Configure health routes
pub fn configure<B: ReservationBackend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check::<B>));
}
