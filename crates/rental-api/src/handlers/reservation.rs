//! User reservation handlers

use actix_web::{web, HttpResponse};
use rental_core::traits::ReservationBackend;
use rental_core::AppError;
use tracing::{debug, instrument};

use crate::dto::ApiResponse;
use crate::extract::BackendToken;
use crate::state::AppState;

/// A user's reservations, newest first, with pending holds tagged
/// `active` or `expired`
///
/// GET /api/v1/users/{user_id}/reservations
#[instrument(skip(state, token))]
pub async fn user_reservations<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<i64>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let reservations = state.manager(&token).user_reservations(user_id).await?;
    debug!(user_id, count = reservations.len(), "Listed user reservations");

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservations)))
}

/// Configure user reservation routes
pub fn configure<B: ReservationBackend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/users/{user_id}/reservations",
        web::get().to(user_reservations::<B>),
    );
}
