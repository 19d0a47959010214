//! Car handlers
//!
//! Status, availability calendar, quote and the cancel-pending action.

use actix_web::{web, HttpResponse};
use rental_core::models::CarId;
use rental_core::traits::ReservationBackend;
use rental_core::AppError;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::{
    ApiResponse, CalendarQuery, CalendarResponse, CarFilterParams, PaginationParams, QuoteRequest,
};
use crate::extract::BackendToken;
use crate::state::AppState;

/// One page of cars with their booking status
///
/// GET /api/v1/cars?page=1&per_page=12&only_available=true&make=...&sort_by=price_per_day
#[instrument(skip(state, token))]
pub async fn list_cars<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    pagination: web::Query<PaginationParams>,
    filters: web::Query<CarFilterParams>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    pagination.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let filter = filters.into_inner().into_filter()?;
    let (cars, total) = state
        .manager(&token)
        .search_cars(&filter, pagination.pagination())
        .await?;
    debug!(count = cars.len(), total, "Listed cars");

    Ok(HttpResponse::Ok().json(pagination.paginate(cars, total)))
}

/// Booking status of a single car
///
/// GET /api/v1/cars/{id}/status
#[instrument(skip(state, token))]
pub async fn car_status<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<CarId>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    let summary = state.manager(&token).car_status(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// Disabled-day calendar for date pickers
///
/// GET /api/v1/cars/{id}/calendar?from=YYYY-MM-DD&days=N
#[instrument(skip(state, token))]
pub async fn car_calendar<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<CarId>,
    query: web::Query<CalendarQuery>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Calendar query validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let car_id = path.into_inner();
    let days = state
        .manager(&token)
        .calendar(car_id, query.from, query.days)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CalendarResponse { car_id, days })))
}

/// Validate and price a date range
///
/// POST /api/v1/cars/{id}/quote
#[instrument(skip(state, token, req))]
pub async fn quote<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<CarId>,
    req: web::Json<QuoteRequest>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    let quote = state
        .manager(&token)
        .quote(path.into_inner(), req.start_date, req.end_date)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(quote)))
}

/// Cancel the car's pending reservation
///
/// POST /api/v1/cars/{id}/cancel-pending
#[instrument(skip(state, token))]
pub async fn cancel_pending<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<CarId>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    let car_id = path.into_inner();
    let summary = state.manager(&token).cancel_pending(car_id).await?;

    info!(car_id, status = %summary.status, "Pending reservation cancelled");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        summary,
        "Reservation cancelled successfully",
    )))
}

/// Configure car routes
pub fn configure<B: ReservationBackend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cars")
            .route("", web::get().to(list_cars::<B>))
            .route("/{id}/status", web::get().to(car_status::<B>))
            .route("/{id}/calendar", web::get().to(car_calendar::<B>))
            .route("/{id}/quote", web::post().to(quote::<B>))
            .route("/{id}/cancel-pending", web::post().to(cancel_pending::<B>)),
    );
}
