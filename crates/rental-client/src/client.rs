//! HTTP client for the rental REST backend
//!
//! Low-level request plumbing plus the `ReservationBackend` implementation.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use rental_core::config::BackendConfig;
use rental_core::models::{Car, CarId, CreateReservation, Reservation, ReservationId};
use rental_core::traits::ReservationBackend;
use rental_core::AppError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::error::{ClientError, REJECTED_FALLBACK};
use crate::types::{ApiEnvelope, CreatedReservation, ErrorBody};

/// Client for the rental REST backend
///
/// Cheap to clone; clones share the connection pool. A clone obtained through
/// `authorized` forwards the caller's bearer token on every request.
#[derive(Debug, Clone)]
pub struct RestBackend {
    http_client: Client,
    base_url: String,
    timeout_ms: u64,
    token: Option<String>,
}

impl RestBackend {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Backend root (ej: "http://localhost:8080")
    /// * `timeout_ms` - Timeout for each request in milliseconds
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, ClientError> {
        if base_url.trim().is_empty() {
            return Err(ClientError::Config("backend base_url is empty".to_string()));
        }

        let http_client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            token: None,
        })
    }

    /// Create a client from the `[backend]` configuration section
    pub fn from_config(config: &BackendConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.timeout_ms)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout_ms)
        } else {
            ClientError::Connection(e.to_string())
        }
    }

    /// Send a request and unwrap the response envelope
    ///
    /// Returns `Ok(None)` when the backend answers successfully without data.
    #[instrument(skip(self, builder), fields(path = %path))]
    async fn send<R>(&self, builder: RequestBuilder, path: &str) -> Result<Option<R>, ClientError>
    where
        R: DeserializeOwned,
    {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);

            if status.is_server_error() {
                error!("Backend error: status={}, message={:?}", status, message);
            } else {
                warn!("Backend rejected request: status={}, message={:?}", status, message);
            }

            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Backend response: status={}, {} bytes", status, body.len());

        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: ApiEnvelope<R> = serde_json::from_str(&body).map_err(|e| {
            ClientError::Parse(format!("Failed to parse JSON: {} - Body: {}", e, body))
        })?;

        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| REJECTED_FALLBACK.to_string()),
            ));
        }

        Ok(envelope.data)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<Option<R>, ClientError> {
        self.send(self.request(Method::GET, path), path).await
    }
}

#[async_trait]
impl ReservationBackend for RestBackend {
    async fn fetch_cars(&self) -> Result<Vec<Car>, AppError> {
        let cars: Option<Vec<Car>> = self.get("/api/cars").await?;
        Ok(cars.unwrap_or_default())
    }

    async fn fetch_car(&self, car_id: CarId) -> Result<Car, AppError> {
        let path = format!("/api/cars/{}", car_id);
        match self.get::<Car>(&path).await {
            Ok(Some(car)) => Ok(car),
            Ok(None) => Err(AppError::CarNotFound(car_id.to_string())),
            Err(e) if e.status() == Some(404) => Err(AppError::CarNotFound(car_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_reservations(&self, car_id: CarId) -> Result<Vec<Reservation>, AppError> {
        let path = format!("/api/reservations/car/{}", car_id);
        match self.get::<Vec<Reservation>>(&path).await {
            Ok(reservations) => Ok(reservations.unwrap_or_default()),
            Err(e) if e.status() == Some(404) => Err(AppError::CarNotFound(car_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_user_reservations(&self, user_id: i64) -> Result<Vec<Reservation>, AppError> {
        let path = format!("/api/reservations/user/{}", user_id);
        let reservations: Option<Vec<Reservation>> = self.get(&path).await?;
        Ok(reservations.unwrap_or_default())
    }

    async fn create_reservation(
        &self,
        request: &CreateReservation,
    ) -> Result<ReservationId, AppError> {
        let path = "/api/reservations";
        let builder = self.request(Method::POST, path).json(request);

        let created: CreatedReservation = self
            .send(builder, path)
            .await?
            .ok_or(ClientError::EmptyResponse)?;

        Ok(created.id)
    }

    async fn cancel_reservation(&self, reservation_id: ReservationId) -> Result<(), AppError> {
        let path = format!("/api/reservations/{}/cancel", reservation_id);
        let builder = self.request(Method::PATCH, &path);

        match self.send::<serde_json::Value>(builder, &path).await {
            Ok(_) => Ok(()),
            Err(e) if e.status() == Some(404) => {
                Err(AppError::ReservationNotFound(reservation_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn authorized(&self, token: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            ..self.clone()
        }
    }
}
