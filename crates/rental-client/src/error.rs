//! Client errors and their mapping onto `AppError`

use rental_core::AppError;
use thiserror::Error;

/// Fallback shown when the backend rejects a request without a message
pub const REJECTED_FALLBACK: &str = "Request was rejected by the backend";

/// Errors of the REST backend client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: request took longer than {0}ms")]
    Timeout(u64),

    #[error("HTTP error: status {status}")]
    Status { status: u16, message: Option<String> },

    /// 2xx answer whose envelope reports `success: false`
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from backend")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Connection(msg) => AppError::Backend(msg),
            ClientError::Timeout(ms) => AppError::BackendTimeout(ms),
            ClientError::Status { status, message } => match status {
                400 | 409 | 422 => {
                    AppError::Conflict(message.unwrap_or_else(|| REJECTED_FALLBACK.to_string()))
                }
                401 => AppError::Unauthorized(
                    message.unwrap_or_else(|| "Authentication required".to_string()),
                ),
                403 => AppError::Forbidden(message.unwrap_or_else(|| "Access denied".to_string())),
                404 => AppError::NotFound(message.unwrap_or_else(|| "Resource".to_string())),
                _ => AppError::Backend(match message {
                    Some(msg) => format!("status {}: {}", status, msg),
                    None => format!("status {}", status),
                }),
            },
            ClientError::Rejected(msg) => AppError::Conflict(msg),
            ClientError::Parse(msg) => AppError::Backend(format!("unreadable response: {}", msg)),
            ClientError::EmptyResponse => AppError::Backend("empty response".to_string()),
            ClientError::Config(msg) => AppError::Config(msg),
        }
    }
}
