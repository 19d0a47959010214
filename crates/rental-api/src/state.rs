//! Shared application state and the booking-session store

use parking_lot::Mutex;
use rental_core::config::BookingConfig;
use rental_core::traits::{Clock, ReservationBackend};
use rental_core::{AppError, AppResult};
use rental_services::{BookingController, ReservationManager};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::extract::BackendToken;

/// One open booking form
struct Session {
    controller: BookingController,
    touched_at: Instant,
}

/// Server-held booking forms keyed by session id
///
/// The lock is only ever held for synchronous controller calls, never across
/// a backend request.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new form and return its id
    pub fn insert(&self, controller: BookingController) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.lock().insert(
            id,
            Session {
                controller,
                touched_at: Instant::now(),
            },
        );
        debug!(session_id = %id, "Booking session opened");
        id
    }

    /// Run `f` against a session's controller
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut BookingController) -> R,
    ) -> AppResult<R> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;

        session.touched_at = Instant::now();
        Ok(f(&mut session.controller))
    }

    /// Drop a session; false if it did not exist
    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Drop sessions untouched for at least `max_idle`
    ///
    /// Sessions with a submission in flight are kept so the in-flight request
    /// can still report back.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| {
            s.controller.is_submitting() || s.touched_at.elapsed() < max_idle
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!("Expired {} idle booking sessions", removed);
        }
        removed
    }
}

/// State shared by every handler
pub struct AppState<B: ReservationBackend> {
    manager: ReservationManager<B>,
    clock: Arc<dyn Clock>,
    booking: BookingConfig,
    pub sessions: SessionStore,
}

impl<B: ReservationBackend> AppState<B> {
    pub fn new(manager: ReservationManager<B>, clock: Arc<dyn Clock>, booking: BookingConfig) -> Self {
        Self {
            manager,
            clock,
            booking,
            sessions: SessionStore::new(),
        }
    }

    /// Manager acting on behalf of the request's caller
    pub fn manager(&self, token: &BackendToken) -> ReservationManager<B> {
        self.manager.authorized(token.as_deref())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn booking(&self) -> &BookingConfig {
        &self.booking
    }

    /// How long a booking session may sit untouched
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.booking.session_idle_minutes.max(1) as u64 * 60)
    }
}
