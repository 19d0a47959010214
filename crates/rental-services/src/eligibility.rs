//! Car eligibility classification
//!
//! Derives a car's booking status from its latest fetched reservations. Nothing
//! is cached; the classification is recomputed on every query.

use chrono::NaiveDateTime;
use rental_core::models::{Car, Reservation, ReservationStatus};
use serde::Serialize;
use std::fmt;

use crate::availability::AvailabilityPolicy;

/// Aggregate booking status of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarStatus {
    /// Bookable
    Available,
    /// Has a confirmed reservation
    Reserved,
    /// Has a pending reservation still inside its hold window
    Pending,
    /// Taken out of service by an administrator
    Rented,
}

impl CarStatus {
    /// Label shown on car cards
    pub fn label(&self) -> &'static str {
        match self {
            CarStatus::Available => "Available",
            CarStatus::Reserved => "Reserved",
            CarStatus::Pending => "Reservation Pending",
            CarStatus::Rented => "Currently Rented",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl AvailabilityPolicy {
    /// Classify a car; earlier rules take precedence
    pub fn classify(&self, car: &Car, now: NaiveDateTime) -> CarStatus {
        if !car.is_available {
            return CarStatus::Rented;
        }

        if car.reservations.iter().any(Reservation::is_confirmed) {
            return CarStatus::Reserved;
        }

        if self.active_pending(car, now).is_some() {
            return CarStatus::Pending;
        }

        CarStatus::Available
    }

    /// New reservations may only be created for available cars
    pub fn can_reserve(&self, car: &Car, now: NaiveDateTime) -> bool {
        self.classify(car, now) == CarStatus::Available
    }

    /// A pending reservation that still holds its dates
    pub fn active_pending<'a>(&self, car: &'a Car, now: NaiveDateTime) -> Option<&'a Reservation> {
        car.reservations
            .iter()
            .filter(|r| r.status == ReservationStatus::Pending)
            .find(|r| !self.is_pending_expired(r, now))
    }
}

/// The car's most recent PENDING reservation, expired or not
///
/// This is what the "cancel pending reservation" action targets: a soft-expired
/// hold still exists in the backend until it is cancelled or confirmed.
pub fn pending_reservation(car: &Car) -> Option<&Reservation> {
    car.reservations
        .iter()
        .filter(|r| r.status == ReservationStatus::Pending)
        .max_by_key(|r| r.created_at)
}

/// `AvailabilityPolicy::classify` under the default rules
pub fn classify(car: &Car, now: NaiveDateTime) -> CarStatus {
    AvailabilityPolicy::default().classify(car, now)
}

/// `AvailabilityPolicy::can_reserve` under the default rules
pub fn can_reserve(car: &Car, now: NaiveDateTime) -> bool {
    AvailabilityPolicy::default().can_reserve(car, now)
}
