//! Common traits for the backend and the clock
//!
//! Defines the seams the services depend on, so the availability logic can be
//! exercised against in-memory doubles and a frozen clock. Pagination helpers
//! shared by list endpoints live here too.

use crate::error::AppError;
use crate::models::{Car, CarId, CreateReservation, Reservation, ReservationId};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// The REST backend that owns cars and reservations
///
/// Every rule the backend enforces (pricing, persistence, overlap checks) stays
/// there; implementations only move data.
#[async_trait]
pub trait ReservationBackend: Send + Sync {
    /// List all cars with their reservations
    async fn fetch_cars(&self) -> Result<Vec<Car>, AppError>;

    /// Fetch a single car with its reservations
    async fn fetch_car(&self, car_id: CarId) -> Result<Car, AppError>;

    /// Fetch the reservations scoped to a car
    async fn fetch_reservations(&self, car_id: CarId) -> Result<Vec<Reservation>, AppError>;

    /// Fetch every reservation made by a user
    async fn fetch_user_reservations(&self, user_id: i64) -> Result<Vec<Reservation>, AppError>;

    /// Create a reservation and return its identifier
    ///
    /// Fails with `AppError::Conflict` when the backend independently decides
    /// the range is unavailable.
    async fn create_reservation(
        &self,
        request: &CreateReservation,
    ) -> Result<ReservationId, AppError>;

    /// Cancel a reservation
    async fn cancel_reservation(&self, reservation_id: ReservationId) -> Result<(), AppError>;

    /// A handle acting on behalf of the given bearer token
    fn authorized(&self, token: Option<&str>) -> Self
    where
        Self: Sized;
}

/// Source of the current wall-clock instant
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock read in a fixed IANA timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Pagination parameters (1-indexed pages)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// The slice of `items` on this page
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit()).unwrap_or(0);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 12)
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
