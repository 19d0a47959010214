//! Car browsing
//!
//! Filters and orders classified cars for the catalog pages. Filtering runs
//! on the gateway's own classification, so "only available" hides cars with
//! an active pending hold or a current reservation as well as those switched
//! off by an administrator.

use rental_core::models::TransmissionType;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::cmp::Ordering;

use crate::reservation_manager::CarSummary;

/// Field to order cars by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarSort {
    #[default]
    Id,
    Make,
    Year,
    #[serde(alias = "pricePerDay", alias = "price")]
    PricePerDay,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Catalog search criteria; every `None` matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarFilter {
    /// Case-insensitive substring of the make
    pub make: Option<String>,
    /// Case-insensitive substring of the model
    pub model: Option<String>,
    pub year: Option<i32>,
    pub transmission: Option<TransmissionType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Keep only cars that can be reserved right now
    pub only_available: bool,
    pub sort_by: CarSort,
    pub direction: SortDirection,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

impl CarFilter {
    pub fn matches(&self, summary: &CarSummary) -> bool {
        let car = &summary.car;

        if self.only_available && !summary.can_reserve {
            return false;
        }
        if let Some(make) = self.make.as_deref() {
            if !contains_ignore_case(&car.make, make) {
                return false;
            }
        }
        if let Some(model) = self.model.as_deref() {
            if !contains_ignore_case(&car.model, model) {
                return false;
            }
        }
        if self.year.is_some_and(|year| car.year != year) {
            return false;
        }
        if self.transmission.is_some() && car.transmission != self.transmission {
            return false;
        }
        if self.min_price.is_some_and(|min| car.price_per_day < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| car.price_per_day > max) {
            return false;
        }

        true
    }

    /// Order cars in place; ties fall back to the car id
    pub fn sort(&self, cars: &mut [CarSummary]) {
        cars.sort_by(|a, b| {
            let ordering = match self.sort_by {
                CarSort::Id => Ordering::Equal,
                CarSort::Make => a
                    .car
                    .make
                    .to_lowercase()
                    .cmp(&b.car.make.to_lowercase()),
                CarSort::Year => a.car.year.cmp(&b.car.year),
                CarSort::PricePerDay => a.car.price_per_day.cmp(&b.car.price_per_day),
            }
            .then(a.car.id.cmp(&b.car.id));

            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    /// Matching cars in the requested order
    pub fn apply(&self, cars: Vec<CarSummary>) -> Vec<CarSummary> {
        let mut matching: Vec<CarSummary> = cars.into_iter().filter(|c| self.matches(c)).collect();
        self.sort(&mut matching);
        matching
    }
}
