//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use crate::error::AppError;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub booking: BookingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma-separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// REST backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the REST backend
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_ms: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_backend_timeout() -> u64 {
    10_000
}

/// Booking rules applied by the availability core
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// How long a PENDING reservation holds its dates
    #[serde(default = "default_pending_hold")]
    pub pending_hold_minutes: i64,

    /// Minimum full days between today and the first bookable day
    #[serde(default = "default_lead_time")]
    pub lead_time_days: i64,

    /// Minimum rental length in days
    #[serde(default = "default_min_rental")]
    pub min_rental_days: i64,

    /// Longest rental in days
    #[serde(default = "default_max_rental")]
    pub max_rental_days: i64,

    /// Largest calendar window a client may request
    #[serde(default = "default_calendar_max")]
    pub calendar_max_days: i64,

    /// IANA timezone whose wall clock defines "today"
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Booking sessions untouched for this long are dropped
    #[serde(default = "default_session_idle")]
    pub session_idle_minutes: i64,

    /// Where the client continues after a reservation is created; `{id}` is replaced
    #[serde(default = "default_payment_path")]
    pub payment_path: String,
}

fn default_pending_hold() -> i64 {
    30
}

fn default_lead_time() -> i64 {
    1
}

fn default_min_rental() -> i64 {
    1
}

fn default_max_rental() -> i64 {
    90
}

fn default_calendar_max() -> i64 {
    90
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_session_idle() -> i64 {
    30
}

fn default_payment_path() -> String {
    "/payment/{id}".to_string()
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8090)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("backend.base_url", default_backend_url())?
            .set_default("backend.timeout_ms", 10_000)?
            .set_default("booking.pending_hold_minutes", 30)?
            .set_default("booking.lead_time_days", 1)?
            .set_default("booking.min_rental_days", 1)?
            .set_default("booking.max_rental_days", default_max_rental())?
            .set_default("booking.calendar_max_days", 90)?
            .set_default("booking.timezone", "UTC")?
            .set_default("booking.session_idle_minutes", 30)?
            .set_default("booking.payment_path", default_payment_path())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with RENTAL_ prefix
            .add_source(
                Environment::with_prefix("RENTAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("RENTAL").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl BookingConfig {
    /// Parse the configured timezone
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("invalid timezone {}: {}", self.timezone, e)))
    }

    /// Build the payment continuation path for a new reservation
    pub fn payment_path_for(&self, reservation_id: i64) -> String {
        self.payment_path.replace("{id}", &reservation_id.to_string())
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            pending_hold_minutes: 30,
            lead_time_days: 1,
            min_rental_days: 1,
            max_rental_days: default_max_rental(),
            calendar_max_days: 90,
            timezone: "UTC".to_string(),
            session_idle_minutes: 30,
            payment_path: default_payment_path(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_ms: default_backend_timeout(),
        }
    }
}
