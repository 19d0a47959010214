//! Booking session DTOs

use chrono::{NaiveDate, NaiveDateTime};
use rental_core::models::{CarId, ReservationId};
use rental_services::{BookingController, BookingState, DayAvailability, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::deserialize_day;

/// Open a booking form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "car_id must be positive"))]
    pub car_id: CarId,

    #[validate(range(min = 1, message = "user_id must be positive"))]
    pub user_id: i64,
}

/// Pick a start or end day
#[derive(Debug, Clone, Deserialize)]
pub struct PickDateRequest {
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDateTime,
}

/// Snapshot of a booking form
#[derive(Debug, Serialize)]
pub struct BookingSessionResponse {
    pub session_id: Uuid,
    pub car_id: CarId,
    pub user_id: i64,
    pub price_per_day: Decimal,
    pub booking: BookingState,

    /// Price of the selected range when it is valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,

    /// Why the selected range cannot be submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,

    /// Disabled-day calendar for the date pickers
    pub calendar: Vec<DayAvailability>,
}

impl BookingSessionResponse {
    /// Build the view of `controller` as of `now`
    pub fn from_controller(
        session_id: Uuid,
        controller: &BookingController,
        calendar_from: NaiveDate,
        calendar_days: i64,
        now: NaiveDateTime,
    ) -> Self {
        let state = controller.state().clone();

        let (quote, validation_error) = match &state {
            BookingState::RangeSelected { .. } | BookingState::Error { .. } => {
                match controller.quote(now) {
                    Ok(quote) => (Some(quote), None),
                    Err(e) => (None, Some(e.to_string())),
                }
            }
            _ => (None, None),
        };

        Self {
            session_id,
            car_id: controller.car_id(),
            user_id: controller.user_id(),
            price_per_day: controller.price_per_day(),
            booking: state,
            quote,
            validation_error,
            calendar: controller.calendar(calendar_from, calendar_days, now),
        }
    }
}

/// Result of a successful submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub reservation_id: ReservationId,
    /// Where the client continues to pay for the reservation
    pub payment_path: String,
    pub booking: BookingState,
}
