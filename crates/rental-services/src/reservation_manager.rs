//! Reservation manager service
//!
//! Backend-facing side of the booking flow:
//! - Fetch cars and classify them, optionally filtered and paged
//! - List a user's reservations with the state of their pending holds
//! - Serve availability calendars and quotes
//! - Open booking forms for reservable cars
//! - Cancel a car's pending reservation and report the refreshed status

use chrono::{Duration, NaiveDate, NaiveDateTime};
use futures::try_join;
use rental_core::{
    models::{Car, CarId, Reservation, ReservationId},
    traits::{Clock, Pagination, ReservationBackend},
    AppError, AppResult,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::availability::{AvailabilityPolicy, DayAvailability, HoldState};
use crate::booking::{BookingController, BookingRules, Quote};
use crate::catalog::CarFilter;
use crate::constants::CALENDAR_MAX_DAYS;
use crate::eligibility::{pending_reservation, CarStatus};

/// A car together with its derived booking status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSummary {
    #[serde(flatten)]
    pub car: Car,
    pub status: CarStatus,
    pub status_label: &'static str,
    pub can_reserve: bool,
    /// Target of the cancel-pending action, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_reservation_id: Option<ReservationId>,
}

/// One of a user's reservations as shown on their reservations page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReservation {
    #[serde(flatten)]
    pub reservation: Reservation,
    /// Only set for PENDING reservations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<HoldState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_expires_at: Option<NaiveDateTime>,
}

/// Reservation manager
///
/// Stateless between calls: every query fetches a fresh snapshot, so statuses
/// and blocked days always reflect the backend's latest answer.
pub struct ReservationManager<B: ReservationBackend> {
    backend: Arc<B>,
    clock: Arc<dyn Clock>,
    rules: BookingRules,
    calendar_max_days: i64,
}

impl<B: ReservationBackend> ReservationManager<B> {
    /// Create a new reservation manager
    pub fn new(backend: Arc<B>, clock: Arc<dyn Clock>, rules: BookingRules) -> Self {
        Self {
            backend,
            clock,
            rules,
            calendar_max_days: CALENDAR_MAX_DAYS,
        }
    }

    /// Cap the calendar window a caller may request
    pub fn with_calendar_max_days(mut self, days: i64) -> Self {
        self.calendar_max_days = days.max(1);
        self
    }

    /// A manager whose backend calls carry the caller's bearer token
    pub fn authorized(&self, token: Option<&str>) -> Self {
        Self {
            backend: Arc::new(self.backend.authorized(token)),
            clock: Arc::clone(&self.clock),
            rules: self.rules,
            calendar_max_days: self.calendar_max_days,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    pub fn policy(&self) -> &AvailabilityPolicy {
        &self.rules.policy
    }

    pub fn calendar_max_days(&self) -> i64 {
        self.calendar_max_days
    }

    /// Classify an already fetched car
    pub fn summarize(&self, car: Car) -> CarSummary {
        let now = self.clock.now();
        let status = self.rules.policy.classify(&car, now);
        let pending_reservation_id = pending_reservation(&car).map(|r| r.id);

        CarSummary {
            status,
            status_label: status.label(),
            can_reserve: status == CarStatus::Available,
            pending_reservation_id,
            car,
        }
    }

    /// List every car with its status
    #[instrument(skip(self))]
    pub async fn list_cars(&self) -> AppResult<Vec<CarSummary>> {
        let cars = self.backend.fetch_cars().await?;
        debug!("Fetched {} cars", cars.len());
        Ok(cars.into_iter().map(|car| self.summarize(car)).collect())
    }

    /// One page of the cars matching `filter`, plus the total match count
    #[instrument(skip(self))]
    pub async fn search_cars(
        &self,
        filter: &CarFilter,
        pagination: Pagination,
    ) -> AppResult<(Vec<CarSummary>, i64)> {
        let cars = self.list_cars().await?;
        let matching = filter.apply(cars);
        let total = matching.len() as i64;

        debug!(total, page = pagination.page, "Filtered cars");
        Ok((pagination.slice(matching), total))
    }

    /// A user's reservations, newest first
    ///
    /// Pending reservations are tagged with whether their hold is still active.
    #[instrument(skip(self))]
    pub async fn user_reservations(&self, user_id: i64) -> AppResult<Vec<UserReservation>> {
        let mut reservations = self.backend.fetch_user_reservations(user_id).await?;
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let now = self.clock.now();
        let policy = &self.rules.policy;
        Ok(reservations
            .into_iter()
            .map(|reservation| UserReservation {
                hold: policy.hold_state(&reservation, now),
                hold_expires_at: policy.hold_expires_at(&reservation),
                reservation,
            })
            .collect())
    }

    /// Fetch a car and replace its embedded reservations with the car-scoped list
    #[instrument(skip(self))]
    pub async fn load_car(&self, car_id: CarId) -> AppResult<Car> {
        let (mut car, reservations) = try_join!(
            self.backend.fetch_car(car_id),
            self.backend.fetch_reservations(car_id)
        )?;
        car.reservations = reservations;
        Ok(car)
    }

    /// Current reservations of a car
    #[instrument(skip(self))]
    pub async fn reservations(&self, car_id: CarId) -> AppResult<Vec<Reservation>> {
        self.backend.fetch_reservations(car_id).await
    }

    /// Status of a single car
    #[instrument(skip(self))]
    pub async fn car_status(&self, car_id: CarId) -> AppResult<CarSummary> {
        let car = self.load_car(car_id).await?;
        Ok(self.summarize(car))
    }

    /// Disabled-day calendar for a car
    ///
    /// `from` defaults to today in the configured timezone.
    #[instrument(skip(self))]
    pub async fn calendar(
        &self,
        car_id: CarId,
        from: Option<NaiveDate>,
        days: i64,
    ) -> AppResult<Vec<DayAvailability>> {
        if days < 1 || days > self.calendar_max_days {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {}",
                self.calendar_max_days
            )));
        }

        let now = self.clock.now();
        let from = from.unwrap_or_else(|| now.date());
        if from.checked_add_signed(Duration::days(days - 1)).is_none() {
            return Err(AppError::Validation(format!(
                "calendar starting {} runs past the last supported date",
                from
            )));
        }

        let reservations = self.backend.fetch_reservations(car_id).await?;

        Ok(self.rules.policy.calendar(from, days, &reservations, now))
    }

    /// Validate and price a range without opening a form
    #[instrument(skip(self))]
    pub async fn quote(
        &self,
        car_id: CarId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<Quote> {
        let car = self.load_car(car_id).await?;
        let now = self.clock.now();
        self.ensure_reservable(&car, now)?;

        let quote = self.rules.validate(
            Some(start),
            Some(end),
            &car.reservations,
            car.price_per_day,
            now,
        )?;
        Ok(quote)
    }

    /// Open a booking form for `user_id`
    ///
    /// Refused unless the car is currently reservable.
    #[instrument(skip(self))]
    pub async fn open_booking(&self, car_id: CarId, user_id: i64) -> AppResult<BookingController> {
        let car = self.load_car(car_id).await?;
        self.ensure_reservable(&car, self.clock.now())?;

        info!("Opening booking form for car {} and user {}", car_id, user_id);
        Ok(BookingController::for_car(&car, user_id, self.rules))
    }

    /// Cancel the car's most recent pending reservation
    ///
    /// Returns the car's status as refetched after the cancellation.
    #[instrument(skip(self))]
    pub async fn cancel_pending(&self, car_id: CarId) -> AppResult<CarSummary> {
        let car = self.load_car(car_id).await?;

        let reservation_id = match pending_reservation(&car) {
            Some(reservation) => reservation.id,
            None => {
                warn!("Car {} has no pending reservation to cancel", car_id);
                return Err(AppError::ReservationNotFound(format!(
                    "no pending reservation for car {}",
                    car_id
                )));
            }
        };

        self.backend.cancel_reservation(reservation_id).await?;
        info!("Cancelled pending reservation {} of car {}", reservation_id, car_id);

        self.car_status(car_id).await
    }

    fn ensure_reservable(&self, car: &Car, now: NaiveDateTime) -> AppResult<()> {
        let status = self.rules.policy.classify(car, now);
        if status != CarStatus::Available {
            return Err(AppError::Conflict(format!(
                "{} is not available for reservation ({})",
                car.display_name(),
                status.label()
            )));
        }
        Ok(())
    }
}

impl<B: ReservationBackend> Clone for ReservationManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            clock: Arc::clone(&self.clock),
            rules: self.rules,
            calendar_max_days: self.calendar_max_days,
        }
    }
}
