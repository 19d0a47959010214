//! Booking session handlers
//!
//! Each session holds one `BookingController`. Handlers lock the session store
//! only for synchronous controller calls; backend requests run unlocked.

use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use rental_core::traits::ReservationBackend;
use rental_core::{AppError, AppResult};
use rental_services::{submit_failure_message, BookingController, BookingError};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    ApiResponse, BookingSessionResponse, CreateBookingRequest, PickDateRequest, SubmitResponse,
};
use crate::extract::BackendToken;
use crate::state::AppState;

fn session_view<B: ReservationBackend>(
    state: &AppState<B>,
    session_id: Uuid,
    controller: &BookingController,
    now: NaiveDateTime,
) -> BookingSessionResponse {
    BookingSessionResponse::from_controller(
        session_id,
        controller,
        now.date(),
        state.booking().calendar_max_days,
        now,
    )
}

/// Apply a synchronous form action and return the updated view
fn apply<B, F>(state: &AppState<B>, session_id: Uuid, action: F) -> AppResult<HttpResponse>
where
    B: ReservationBackend,
    F: FnOnce(&mut BookingController, NaiveDateTime) -> Result<(), BookingError>,
{
    let now = state.clock().now();
    let view = state.sessions.with_session(session_id, |c| {
        action(c, now)?;
        Ok::<_, BookingError>(session_view(state, session_id, c, now))
    })??;

    Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
}

/// Refetch the session's reservation snapshot from the backend
async fn refresh<B: ReservationBackend + 'static>(
    state: &AppState<B>,
    session_id: Uuid,
    token: &BackendToken,
) -> AppResult<()> {
    let car_id = state.sessions.with_session(session_id, |c| c.car_id())?;
    let reservations = state.manager(token).reservations(car_id).await?;
    state
        .sessions
        .with_session(session_id, |c| c.replace_reservations(reservations))
}

/// Open a booking form for a reservable car
///
/// POST /api/v1/bookings
#[instrument(skip(state, token, req))]
pub async fn create_booking<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    req: web::Json<CreateBookingRequest>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Booking request validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let controller = state
        .manager(&token)
        .open_booking(req.car_id, req.user_id)
        .await?;

    let now = state.clock().now();
    let view_controller = controller.clone();
    let session_id = state.sessions.insert(controller);

    info!(%session_id, car_id = req.car_id, "Booking session created");

    Ok(HttpResponse::Created().json(ApiResponse::success(session_view(
        state.get_ref(),
        session_id,
        &view_controller,
        now,
    ))))
}

/// Current state of a booking form, with a freshly fetched snapshot
///
/// GET /api/v1/bookings/{sid}
#[instrument(skip(state, token))]
pub async fn get_booking<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    refresh(state.get_ref(), session_id, &token).await?;
    apply(state.get_ref(), session_id, |_, _| Ok(()))
}

/// Pick the first rental day
///
/// PUT /api/v1/bookings/{sid}/start
#[instrument(skip(state, req))]
pub async fn pick_start<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
    req: web::Json<PickDateRequest>,
) -> Result<HttpResponse, AppError> {
    let date = req.date;
    apply(state.get_ref(), path.into_inner(), |c, now| c.pick_start(date, now))
}

/// Pick the last rental day
///
/// PUT /api/v1/bookings/{sid}/end
#[instrument(skip(state, req))]
pub async fn pick_end<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
    req: web::Json<PickDateRequest>,
) -> Result<HttpResponse, AppError> {
    let date = req.date;
    apply(state.get_ref(), path.into_inner(), |c, now| c.pick_end(date, now))
}

/// Clear both dates
///
/// DELETE /api/v1/bookings/{sid}/start
#[instrument(skip(state))]
pub async fn clear_start<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    apply(state.get_ref(), path.into_inner(), |c, _| c.clear_start())
}

/// Clear the end date
///
/// DELETE /api/v1/bookings/{sid}/end
#[instrument(skip(state))]
pub async fn clear_end<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    apply(state.get_ref(), path.into_inner(), |c, _| c.clear_end())
}

/// Submit the selected range as a reservation
///
/// POST /api/v1/bookings/{sid}/submit
///
/// Only one request per session is ever in flight; a repeated submit is
/// answered with 409 `submission_in_progress` without contacting the backend.
/// If the session is deleted while the request is in flight, the backend's
/// answer is discarded.
#[instrument(skip(state, token))]
pub async fn submit_booking<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
    token: BackendToken,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();

    if state
        .sessions
        .with_session(session_id, |c| c.is_submitting())?
    {
        return Err(AppError::SubmissionInProgress);
    }

    refresh(state.get_ref(), session_id, &token).await?;

    let now = state.clock().now();
    let request = state
        .sessions
        .with_session(session_id, |c| c.begin_submit(now))??;

    let result = state
        .manager(&token)
        .backend()
        .create_reservation(&request)
        .await;

    let outcome = state
        .sessions
        .with_session(session_id, |c| {
            c.complete_submit(result).map(|id| (id, c.state().clone()))
        })
        .map_err(|e| {
            warn!(%session_id, "Session closed while submitting; discarding result");
            e
        })?;

    let (reservation_id, booking) = match outcome {
        Ok(done) => done,
        // Outages keep their status but show the form's generic message
        Err(e) if e.is_transient() => {
            return Ok(e.response_with_message(&submit_failure_message(&e)))
        }
        Err(e) => return Err(e),
    };

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        SubmitResponse {
            reservation_id,
            payment_path: state.booking().payment_path_for(reservation_id),
            booking,
        },
        "Reservation created successfully",
    )))
}

/// Close a booking form
///
/// DELETE /api/v1/bookings/{sid}
#[instrument(skip(state))]
pub async fn delete_booking<B: ReservationBackend + 'static>(
    state: web::Data<AppState<B>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    if !state.sessions.remove(session_id) {
        return Err(AppError::SessionNotFound(session_id.to_string()));
    }

    info!(%session_id, "Booking session closed");
    Ok(HttpResponse::NoContent().finish())
}

/// Configure booking routes
pub fn configure<B: ReservationBackend + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking::<B>))
            .route("/{sid}", web::get().to(get_booking::<B>))
            .route("/{sid}", web::delete().to(delete_booking::<B>))
            .route("/{sid}/start", web::put().to(pick_start::<B>))
            .route("/{sid}/start", web::delete().to(clear_start::<B>))
            .route("/{sid}/end", web::put().to(pick_end::<B>))
            .route("/{sid}/end", web::delete().to(clear_end::<B>))
            .route("/{sid}/submit", web::post().to(submit_booking::<B>)),
    );
}
