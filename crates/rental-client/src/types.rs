//! Wire types of the REST backend

use rental_core::models::ReservationId;
use serde::Deserialize;

/// Response envelope wrapped around every backend payload
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Error body of a failed request
///
/// The backend answers with an envelope carrying `message`; the framework's own
/// error pages carry `error` instead.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Most specific human-readable message, if any
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|m| !m.trim().is_empty()))
    }
}

/// The part of a created reservation the gateway needs
#[derive(Debug, Deserialize)]
pub struct CreatedReservation {
    pub id: ReservationId,
}
