//! Reservation model
//!
//! Reservations are created by the booking flow and afterwards only observed;
//! status transitions happen in the backend and arrive by re-fetching.

use crate::dates::{end_of_day, start_of_day};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reservation identifier as issued by the backend
pub type ReservationId = i64;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Awaiting payment; holds its dates for a limited window
    #[default]
    Pending,
    /// Paid or approved; holds its dates until cancelled or completed
    Confirmed,
    /// Cancelled by the user or an administrator
    Cancelled,
    /// Rental finished
    Completed,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "PENDING"),
            ReservationStatus::Confirmed => write!(f, "CONFIRMED"),
            ReservationStatus::Cancelled => write!(f, "CANCELLED"),
            ReservationStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(ReservationStatus::Pending),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            "COMPLETED" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }

    /// Whether a reservation in this status can occupy dates at all
    pub fn blocks_dates(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

/// Reservation entity as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,

    #[serde(default)]
    pub car_id: Option<i64>,

    #[serde(default)]
    pub user_id: Option<i64>,

    pub start_date: NaiveDateTime,

    pub end_date: NaiveDateTime,

    #[serde(default)]
    pub total_price: Option<Decimal>,

    pub status: ReservationStatus,

    pub created_at: NaiveDateTime,

    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Reservation {
    /// The occupied interval, widened to whole days
    pub fn interval(&self) -> (NaiveDateTime, NaiveDateTime) {
        (start_of_day(self.start_date), end_of_day(self.end_date))
    }

    /// Whether the calendar date falls inside the occupied interval
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date.date() <= date && date <= self.end_date.date()
    }

    /// Whether the occupied days intersect `[from, to]`
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date.date() <= to && from <= self.end_date.date()
    }

    /// Time elapsed since creation
    pub fn age(&self, now: NaiveDateTime) -> Duration {
        now - self.created_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReservationStatus::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}

/// Create-reservation request sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    pub car_id: i64,
    pub user_id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(start: &str, end: &str) -> Reservation {
        Reservation {
            id: 1,
            car_id: Some(7),
            user_id: Some(3),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            total_price: None,
            status: ReservationStatus::Confirmed,
            created_at: "2024-06-01T09:00:00".parse().unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            ReservationStatus::from_str("pending"),
            Some(ReservationStatus::Pending)
        );
        assert_eq!(
            ReservationStatus::from_str("CONFIRMED"),
            Some(ReservationStatus::Confirmed)
        );
        assert_eq!(ReservationStatus::from_str("active"), None);
        assert_eq!(ReservationStatus::Completed.to_string(), "COMPLETED");
    }

    #[test]
    fn test_only_cancelled_releases_dates() {
        assert!(ReservationStatus::Pending.blocks_dates());
        assert!(ReservationStatus::Confirmed.blocks_dates());
        assert!(ReservationStatus::Completed.blocks_dates());
        assert!(!ReservationStatus::Cancelled.blocks_dates());
    }

    #[test]
    fn test_covers_whole_days() {
        let res = reservation("2024-06-10T15:00:00", "2024-06-15T08:00:00");
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();

        assert!(!res.covers(day(9)));
        assert!(res.covers(day(10)));
        assert!(res.covers(day(15)));
        assert!(!res.covers(day(16)));

        assert!(res.overlaps(day(1), day(10)));
        assert!(res.overlaps(day(12), day(13)));
        assert!(res.overlaps(day(15), day(30)));
        assert!(!res.overlaps(day(16), day(30)));
        assert!(!res.overlaps(day(1), day(9)));

        let (start, end) = res.interval();
        assert_eq!(start.to_string(), "2024-06-10 00:00:00");
        assert_eq!(end.to_string(), "2024-06-15 23:59:59.999");
    }

    #[test]
    fn test_deserialize_backend_dto() {
        let json = r#"{
            "id": 42,
            "carId": 7,
            "carDetails": "Toyota Corolla",
            "userId": 3,
            "userEmail": "a@b.c",
            "startDate": "2024-06-10T00:00:00",
            "endDate": "2024-06-15T23:59:59",
            "totalPrice": 250.00,
            "status": "PENDING",
            "createdAt": "2024-06-01T09:00:00",
            "updatedAt": "2024-06-01T09:00:00"
        }"#;

        let res: Reservation = serde_json::from_str(json).unwrap();
        assert_eq!(res.id, 42);
        assert_eq!(res.car_id, Some(7));
        assert!(res.is_pending());
        assert_eq!(res.total_price, Some(Decimal::new(250, 0)));
    }

    #[test]
    fn test_create_request_is_camel_case() {
        let req = CreateReservation {
            car_id: 7,
            user_id: 3,
            start_date: "2024-06-10T00:00:00".parse().unwrap(),
            end_date: "2024-06-12T23:59:59.999".parse().unwrap(),
            total_price: Decimal::new(100, 0),
        };

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"carId\":7"));
        assert!(json.contains("\"startDate\":\"2024-06-10T00:00:00\""));
        assert!(json.contains("\"totalPrice\":100"));
    }
}
