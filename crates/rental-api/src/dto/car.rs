//! Car status, calendar and quote DTOs

use chrono::{NaiveDate, NaiveDateTime};
use rental_core::models::{CarId, TransmissionType};
use rental_core::AppError;
use rental_services::{CarFilter, CarSort, DayAvailability, SortDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::deserialize_day;

/// Catalog filters of `GET /cars`
///
/// Accepts snake_case names and the camelCase ones the web client sends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilterParams {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub transmission: Option<TransmissionType>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<Decimal>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<Decimal>,
    #[serde(alias = "onlyAvailable")]
    pub only_available: Option<bool>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<CarSort>,
    #[serde(alias = "sortDirection")]
    pub sort_direction: Option<SortDirection>,
}

/// Blank text filters match everything
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CarFilterParams {
    pub fn into_filter(self) -> Result<CarFilter, AppError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(AppError::Validation(format!(
                    "min_price {} is above max_price {}",
                    min, max
                )));
            }
        }

        Ok(CarFilter {
            make: non_blank(&self.make),
            model: non_blank(&self.model),
            year: self.year,
            transmission: self.transmission,
            min_price: self.min_price,
            max_price: self.max_price,
            only_available: self.only_available.unwrap_or(false),
            sort_by: self.sort_by.unwrap_or_default(),
            direction: self.sort_direction.unwrap_or_default(),
        })
    }
}

/// Query parameters of the availability calendar
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CalendarQuery {
    /// First day; defaults to today
    pub from: Option<NaiveDate>,

    /// Number of days
    #[serde(default = "default_calendar_days")]
    #[validate(range(min = 1, max = 366, message = "days must be between 1 and 366"))]
    pub days: i64,
}

fn default_calendar_days() -> i64 {
    30
}

/// Availability calendar of a car
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub car_id: CarId,
    pub days: Vec<DayAvailability>,
}

/// Price a date range
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    #[serde(deserialize_with = "deserialize_day")]
    pub start_date: NaiveDateTime,

    #[serde(deserialize_with = "deserialize_day")]
    pub end_date: NaiveDateTime,
}
