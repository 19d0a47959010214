//! Booking form controller
//!
//! State machine behind a reservation form: date selection, validation,
//! pricing, and a single submission per user action.
//!
//! ```text
//! NoDatesSelected --pick_start--> StartSelected --pick_end--> RangeSelected
//!        ^                             ^   |                        |
//!        '---------clear_start---------'   '----pick_start(>=end)---'
//!
//! RangeSelected --begin_submit--> Submitting --ok--> Success
//!                                     '------err---> Error (dates kept, retry allowed)
//! ```
//!
//! Submission is split in two phases so a controller shared behind a lock
//! never holds the lock across the network call: `begin_submit` validates and
//! enters `Submitting`, `complete_submit` applies the backend's answer. A second
//! `begin_submit` while a request is in flight is refused and builds no request.

use chrono::{NaiveDate, NaiveDateTime};
use rental_core::config::BookingConfig;
use rental_core::dates::{days_between, end_of_day, is_same_day, start_of_day};
use rental_core::models::{Car, CarId, CreateReservation, Reservation, ReservationId};
use rental_core::traits::ReservationBackend;
use rental_core::AppError;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::availability::{AvailabilityPolicy, DayAvailability};
use crate::constants::{MAX_RENTAL_DAYS, MIN_RENTAL_DAYS};

/// Message shown when the backend could not be reached
pub const GENERIC_FAILURE: &str = "Failed to create reservation";

/// What the user is told when a submission fails
///
/// Backend rejections keep their own message; network trouble and backend
/// outages collapse into `GENERIC_FAILURE`.
pub fn submit_failure_message(err: &AppError) -> String {
    if err.is_transient() {
        GENERIC_FAILURE.to_string()
    } else {
        err.to_string()
    }
}

/// Client-detected booking problems
///
/// None of these ever reaches the backend; the form stays where it is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Please select both start and end dates")]
    MissingDates,

    #[error("Start date must be at least tomorrow")]
    LeadTime,

    #[error("End date must be at least one day after start date")]
    SameDay,

    #[error("Reservation must be at least {0} day(s)")]
    TooShort(i64),

    #[error("Reservation cannot be longer than {0} days")]
    TooLong(i64),

    #[error("End date must be after the start date")]
    EndNotAfterStart,

    #[error("{0} is not available for booking")]
    DateUnavailable(NaiveDate),

    #[error("Select a start date first")]
    NoStartDate,

    #[error("A reservation request is already being submitted")]
    SubmissionInProgress,
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SubmissionInProgress => AppError::SubmissionInProgress,
            BookingError::NoStartDate => AppError::InvalidTransition(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

/// Rules applied when validating a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRules {
    pub policy: AvailabilityPolicy,
    pub min_rental_days: i64,
    pub max_rental_days: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            policy: AvailabilityPolicy::default(),
            min_rental_days: MIN_RENTAL_DAYS,
            max_rental_days: MAX_RENTAL_DAYS,
        }
    }
}

impl From<&BookingConfig> for BookingRules {
    fn from(config: &BookingConfig) -> Self {
        Self {
            policy: AvailabilityPolicy::from(config),
            min_rental_days: config.min_rental_days,
            max_rental_days: config.max_rental_days,
        }
    }
}

/// Priced, validated date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub days: i64,
    pub price_per_day: Decimal,
    pub total_price: Decimal,
}

impl BookingRules {
    /// Validate a selection and price it
    ///
    /// Dates are normalized to whole days first, so callers may pass any time
    /// of day.
    pub fn validate(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        reservations: &[Reservation],
        price_per_day: Decimal,
        now: NaiveDateTime,
    ) -> Result<Quote, BookingError> {
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start_of_day(start), end_of_day(end)),
            _ => return Err(BookingError::MissingDates),
        };

        if start < self.policy.earliest_start(now) {
            return Err(BookingError::LeadTime);
        }

        if is_same_day(start, end) {
            return Err(BookingError::SameDay);
        }

        let days = days_between(start, end);
        if days < self.min_rental_days.max(1) {
            return Err(BookingError::TooShort(self.min_rental_days.max(1)));
        }

        let max_days = self.max_rental_days.max(self.min_rental_days.max(1));
        if days > max_days {
            return Err(BookingError::TooLong(max_days));
        }

        if let Some(blocked) =
            self.policy
                .first_blocked_in(start.date(), end.date(), reservations, now)
        {
            return Err(BookingError::DateUnavailable(blocked));
        }

        Ok(Quote {
            start_date: start,
            end_date: end,
            days,
            price_per_day,
            total_price: Decimal::from(days) * price_per_day,
        })
    }
}

/// Where the form currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BookingState {
    NoDatesSelected,
    StartSelected {
        start: NaiveDateTime,
    },
    RangeSelected {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Submitting {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Success {
        reservation_id: ReservationId,
    },
    /// Submission failed; the range is kept so the user can retry as-is
    Error {
        start: NaiveDateTime,
        end: NaiveDateTime,
        message: String,
    },
}

impl BookingState {
    pub fn start(&self) -> Option<NaiveDateTime> {
        match self {
            BookingState::StartSelected { start }
            | BookingState::RangeSelected { start, .. }
            | BookingState::Submitting { start, .. }
            | BookingState::Error { start, .. } => Some(*start),
            BookingState::NoDatesSelected | BookingState::Success { .. } => None,
        }
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        match self {
            BookingState::RangeSelected { end, .. }
            | BookingState::Submitting { end, .. }
            | BookingState::Error { end, .. } => Some(*end),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BookingState::NoDatesSelected => "no_dates_selected",
            BookingState::StartSelected { .. } => "start_selected",
            BookingState::RangeSelected { .. } => "range_selected",
            BookingState::Submitting { .. } => "submitting",
            BookingState::Success { .. } => "success",
            BookingState::Error { .. } => "error",
        }
    }
}

/// Reservation form for one car and one user
#[derive(Debug, Clone)]
pub struct BookingController {
    car_id: CarId,
    user_id: i64,
    price_per_day: Decimal,
    reservations: Vec<Reservation>,
    rules: BookingRules,
    state: BookingState,
}

impl BookingController {
    pub fn new(
        car_id: CarId,
        user_id: i64,
        price_per_day: Decimal,
        reservations: Vec<Reservation>,
        rules: BookingRules,
    ) -> Self {
        Self {
            car_id,
            user_id,
            price_per_day,
            reservations,
            rules,
            state: BookingState::NoDatesSelected,
        }
    }

    /// Controller seeded from a fetched car snapshot
    pub fn for_car(car: &Car, user_id: i64, rules: BookingRules) -> Self {
        Self::new(
            car.id,
            user_id,
            car.price_per_day,
            car.reservations.clone(),
            rules,
        )
    }

    pub fn car_id(&self) -> CarId {
        self.car_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn price_per_day(&self) -> Decimal {
        self.price_per_day
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, BookingState::Submitting { .. })
    }

    /// Swap in a freshly fetched reservation list
    pub fn replace_reservations(&mut self, reservations: Vec<Reservation>) {
        self.reservations = reservations;
    }

    /// Date-picker policy: a day is disabled iff it is blocked
    pub fn is_day_disabled(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        self.rules
            .policy
            .is_date_blocked(date, &self.reservations, now)
    }

    /// Disabled-day calendar over the current snapshot
    pub fn calendar(&self, from: NaiveDate, days: i64, now: NaiveDateTime) -> Vec<DayAvailability> {
        self.rules
            .policy
            .calendar(from, days, &self.reservations, now)
    }

    /// Select the first rental day
    ///
    /// Clears the end date if it is no longer after the new start.
    pub fn pick_start(&mut self, date: NaiveDateTime, now: NaiveDateTime) -> Result<(), BookingError> {
        self.ensure_idle()?;

        let start = start_of_day(date);
        if self.is_day_disabled(start.date(), now) {
            return Err(BookingError::DateUnavailable(start.date()));
        }

        self.state = match self.state.end() {
            Some(end) if start.date() < end.date() => BookingState::RangeSelected { start, end },
            Some(_) => {
                debug!(car_id = self.car_id, "New start date clears the end date");
                BookingState::StartSelected { start }
            }
            None => BookingState::StartSelected { start },
        };

        Ok(())
    }

    /// Select the last rental day
    ///
    /// An end on or before the start day is rejected and the selection is left
    /// untouched; there is no silent clamping.
    pub fn pick_end(&mut self, date: NaiveDateTime, now: NaiveDateTime) -> Result<(), BookingError> {
        self.ensure_idle()?;

        let start = self.state.start().ok_or(BookingError::NoStartDate)?;
        let end = end_of_day(date);

        if is_same_day(start, end) {
            return Err(BookingError::SameDay);
        }
        if end.date() < start.date() {
            return Err(BookingError::EndNotAfterStart);
        }

        if self.is_day_disabled(end.date(), now) {
            return Err(BookingError::DateUnavailable(end.date()));
        }

        self.state = BookingState::RangeSelected { start, end };
        Ok(())
    }

    /// Drop both dates
    pub fn clear_start(&mut self) -> Result<(), BookingError> {
        self.ensure_idle()?;
        self.state = BookingState::NoDatesSelected;
        Ok(())
    }

    /// Drop the end date, keeping the start
    pub fn clear_end(&mut self) -> Result<(), BookingError> {
        self.ensure_idle()?;
        self.state = match self.state.start() {
            Some(start) => BookingState::StartSelected { start },
            None => BookingState::NoDatesSelected,
        };
        Ok(())
    }

    /// Validate and price the current selection
    pub fn quote(&self, now: NaiveDateTime) -> Result<Quote, BookingError> {
        self.rules.validate(
            self.state.start(),
            self.state.end(),
            &self.reservations,
            self.price_per_day,
            now,
        )
    }

    /// Validate the selection and enter `Submitting`
    ///
    /// Returns the request to send. Validation failures leave the state as it
    /// was and nothing is sent.
    pub fn begin_submit(&mut self, now: NaiveDateTime) -> Result<CreateReservation, BookingError> {
        if self.is_submitting() {
            debug!(car_id = self.car_id, "Ignoring repeated submit while in flight");
            return Err(BookingError::SubmissionInProgress);
        }

        let quote = self.quote(now)?;

        self.state = BookingState::Submitting {
            start: quote.start_date,
            end: quote.end_date,
        };

        info!(
            car_id = self.car_id,
            user_id = self.user_id,
            days = quote.days,
            total = %quote.total_price,
            "Submitting reservation"
        );

        Ok(CreateReservation {
            car_id: self.car_id,
            user_id: self.user_id,
            start_date: quote.start_date,
            end_date: quote.end_date,
            total_price: quote.total_price,
        })
    }

    /// Apply the backend's answer to an in-flight submission
    pub fn complete_submit(
        &mut self,
        result: Result<ReservationId, AppError>,
    ) -> Result<ReservationId, AppError> {
        let (start, end) = match self.state {
            BookingState::Submitting { start, end } => (start, end),
            _ => {
                return Err(AppError::InvalidTransition(
                    "no reservation request is in flight".to_string(),
                ))
            }
        };

        match result {
            Ok(reservation_id) => {
                info!(car_id = self.car_id, reservation_id, "Reservation created");
                self.state = BookingState::Success { reservation_id };
                Ok(reservation_id)
            }
            Err(e) => {
                warn!(car_id = self.car_id, error = %e, "Reservation request failed");
                self.state = BookingState::Error {
                    start,
                    end,
                    message: submit_failure_message(&e),
                };
                Err(e)
            }
        }
    }

    /// Submit through `backend` and hand the new id to `on_success`
    #[instrument(skip(self, backend, on_success), fields(car_id = self.car_id))]
    pub async fn submit<B, F>(
        &mut self,
        backend: &B,
        now: NaiveDateTime,
        on_success: F,
    ) -> Result<ReservationId, AppError>
    where
        B: ReservationBackend,
        F: FnOnce(ReservationId),
    {
        let request = self.begin_submit(now)?;
        let result = backend.create_reservation(&request).await;
        let reservation_id = self.complete_submit(result)?;
        on_success(reservation_id);
        Ok(reservation_id)
    }

    fn ensure_idle(&self) -> Result<(), BookingError> {
        if self.is_submitting() {
            return Err(BookingError::SubmissionInProgress);
        }
        Ok(())
    }
}
