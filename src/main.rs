//! Car rental booking gateway
//!
//! Serves car availability, quotes and server-held booking forms on top of
//! the rental REST backend.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use rental_api::{configure_routes, AppState};
use rental_client::RestBackend;
use rental_core::traits::SystemClock;
use rental_core::AppConfig;
use rental_services::{BookingRules, ReservationManager};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often idle booking sessions are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "car_rental={lvl},rental_api={lvl},rental_services={lvl},rental_client={lvl},actix_web=info",
            lvl = log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Reject malformed bodies and query strings with the usual error shape
fn bad_request(kind: &'static str, err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": kind,
        "message": err.to_string(),
        "status": 400,
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!(
        "Starting car rental gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load().context("failed to load configuration")?;
    let tz = config.booking.tz()?;

    let backend = RestBackend::from_config(&config.backend)?;
    info!(
        "REST backend at {} ({} ms timeout)",
        backend.base_url(),
        config.backend.timeout_ms
    );

    let clock = Arc::new(SystemClock::new(tz));
    let manager = ReservationManager::new(
        Arc::new(backend),
        clock.clone(),
        BookingRules::from(&config.booking),
    )
    .with_calendar_max_days(config.booking.calendar_max_days);

    let state = web::Data::new(AppState::new(manager, clock, config.booking.clone()));

    info!(
        timezone = %tz,
        pending_hold_minutes = config.booking.pending_hold_minutes,
        lead_time_days = config.booking.lead_time_days,
        "Booking rules loaded"
    );

    // Drop booking forms nobody has touched for a while
    let sweeper_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper_state
                .sessions
                .expire_idle(sweeper_state.session_idle());
        }
    });

    let bind_addr = config.server_addr();
    let workers = config.server.workers.max(1);
    let cors_origins = config.server.cors_origins.clone();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let response = bad_request("invalid_body", &err);
                actix_web::error::InternalError::from_response(err, response).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let response = bad_request("invalid_query", &err);
                actix_web::error::InternalError::from_response(err, response).into()
            }))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes::<RestBackend>)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
