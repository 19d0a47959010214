//! Unified error handling for the car rental gateway
//!
//! This module provides a single error type covering every failure the gateway
//! can surface, with automatic HTTP response mapping. None of these errors is
//! fatal; each ends up as a visible message for the caller.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Validation Errors ====================
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Booking Flow Errors ====================
    #[error("{0}")]
    Conflict(String),

    #[error("A reservation request is already being submitted")]
    SubmissionInProgress,

    #[error("Invalid booking transition: {0}")]
    InvalidTransition(String),

    // ==================== Resource Errors ====================
    #[error("Car not found: {0}")]
    CarNotFound(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Booking session not found: {0}")]
    SessionNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ==================== Authentication Errors ====================
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // ==================== Backend Errors ====================
    #[error("Backend unavailable: {0}")]
    Backend(String),

    #[error("Backend did not respond within {0}ms")]
    BackendTimeout(u64),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::CarNotFound(_)
            | AppError::ReservationNotFound(_)
            | AppError::SessionNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_)
            | AppError::SubmissionInProgress
            | AppError::InvalidTransition(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            AppError::BackendTimeout(_) => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            AppError::Internal(_) | AppError::Config(_) | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::Conflict(_) => "conflict",
            AppError::SubmissionInProgress => "submission_in_progress",
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::CarNotFound(_) => "car_not_found",
            AppError::ReservationNotFound(_) => "reservation_not_found",
            AppError::SessionNotFound(_) => "session_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Backend(_) => "backend_error",
            AppError::BackendTimeout(_) => "backend_timeout",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the caller may simply retry the same request later
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Backend(_) | AppError::BackendTimeout(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        self.response_with_message(&self.to_string())
    }
}

impl AppError {
    /// Error response keeping this error's status and code but showing `message`
    pub fn response_with_message(&self, message: &str) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }

        let body = json!({
            "error": self.error_code(),
            "message": message,
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Validation("Start date must be at least tomorrow".to_string())
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("Car is already reserved for these dates".to_string())
                .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::SubmissionInProgress.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::CarNotFound("7".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BackendTimeout(5000).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::SubmissionInProgress.error_code(),
            "submission_in_progress"
        );
        assert_eq!(
            AppError::Backend("connection refused".to_string()).error_code(),
            "backend_error"
        );
    }

    #[test]
    fn test_conflict_message_is_verbatim() {
        let err = AppError::Conflict("Car is already reserved for these dates".to_string());
        assert_eq!(err.to_string(), "Car is already reserved for these dates");
        assert!(!err.is_transient());
        assert!(AppError::Backend("reset".to_string()).is_transient());
    }

    #[test]
    fn test_response_with_message_keeps_status() {
        let err = AppError::Backend("connection reset by peer".to_string());
        let resp = err.response_with_message("Failed to create reservation");
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = AppError::BackendTimeout(500).response_with_message("Failed to create reservation");
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
