//! Car model
//!
//! Only the fields the booking gateway reads or passes through to clients.

use super::reservation::Reservation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Car identifier as issued by the backend
pub type CarId = i64;

/// Gearbox type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransmissionType {
    Automatic,
    Manual,
}

impl fmt::Display for TransmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmissionType::Automatic => write!(f, "AUTOMATIC"),
            TransmissionType::Manual => write!(f, "MANUAL"),
        }
    }
}

/// Drive train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriveType {
    Fwd,
    Awd,
}

/// Car entity
///
/// `is_available` is an administrator override: when false the car is never
/// bookable, whatever its reservations say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: CarId,

    pub make: String,

    pub model: String,

    pub year: i32,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub transmission: Option<TransmissionType>,

    #[serde(default)]
    pub drive_type: Option<DriveType>,

    #[serde(default)]
    pub fuel_efficiency: Option<i32>,

    pub price_per_day: Decimal,

    #[serde(default)]
    pub image_url: Option<String>,

    pub is_available: bool,

    /// Reservations scoped to this car; order is irrelevant
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl Car {
    /// "Make Model", as shown on cards and reservation lists
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make, self.model).trim().to_string()
    }
}

impl Default for Car {
    fn default() -> Self {
        Self {
            id: 0,
            make: String::new(),
            model: String::new(),
            year: 0,
            color: None,
            transmission: None,
            drive_type: None,
            fuel_efficiency: None,
            price_per_day: Decimal::ZERO,
            image_url: None,
            is_available: true,
            reservations: Vec::new(),
        }
    }
}
