//! Session arbiter — create, inspect, and terminate the single session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use lexdrift_core::errors::{DriftError, Result};
use lexdrift_core::ids::SessionId;
use lexdrift_core::types::WipeCounts;

/// Time source, injectable so tests control expiry.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Teardown hook the arbiter invokes when a session ends.
///
/// Implementations cancel any in-flight training job and drop all
/// session-scoped state (corpus, models, jobs, topics), reporting what was
/// removed.
pub trait Teardown: Send + Sync {
    /// Cancel in-flight work and wipe session-scoped data.
    fn wipe(&self) -> WipeCounts;
}

/// The one active session.
#[derive(Clone, Debug)]
pub struct Session {
    /// Session identifier handed to the client.
    pub id: SessionId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Hard expiry; the session behaves as terminated from this instant.
    pub expires_at: DateTime<Utc>,
}

/// Whether a new session can be created right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// No active session; `create` will succeed.
    Available,
    /// A session is active; `create` will conflict.
    Occupied,
}

/// Remaining lifetime of the caller's session.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SessionInfo {
    /// Seconds until expiry (never negative).
    pub time_remaining_secs: u64,
}

/// Outcome of a successful `create`.
#[derive(Clone, Debug, Serialize)]
pub struct CreatedSession {
    /// The new session id.
    pub session_id: SessionId,
    /// Fixed time-to-live in seconds.
    pub expires_in_secs: u64,
    /// Residual state removed before the session started.
    pub wiped: WipeCounts,
}

/// Enforces the single-active-session invariant.
pub struct SessionArbiter {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    teardown: Arc<dyn Teardown>,
    current: Mutex<Option<Session>>,
}

impl SessionArbiter {
    /// Create an arbiter with the system clock.
    #[must_use]
    pub fn new(ttl: Duration, teardown: Arc<dyn Teardown>) -> Self {
        Self::with_clock(ttl, teardown, Arc::new(SystemClock))
    }

    /// Create an arbiter with an injected clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, teardown: Arc<dyn Teardown>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            teardown,
            current: Mutex::new(None),
        }
    }

    /// Create a new session.
    ///
    /// Fails with `Conflict` while an unexpired session exists. Any
    /// residual state from a prior (expired or terminated) session is wiped
    /// before the new session starts, so it begins with a clean slate.
    pub fn create(&self) -> Result<CreatedSession> {
        let mut current = self.current.lock();
        let now = self.clock.now();

        if let Some(session) = current.as_ref() {
            if now < session.expires_at {
                warn!("session creation blocked: another session is active");
                return Err(DriftError::Conflict(
                    "another session is currently active; wait for it to expire".into(),
                ));
            }
            info!(session_id = %session.id, "active session expired, replacing");
        }

        // Clean slate: wipe whatever a prior session left behind.
        let wiped = self.teardown.wipe();

        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::seconds(0));
        let session = Session {
            id: SessionId::new(),
            created_at: now,
            expires_at: now + ttl,
        };
        info!(session_id = %session.id, expires_at = %session.expires_at, "session created");
        let id = session.id.clone();
        *current = Some(session);

        Ok(CreatedSession {
            session_id: id,
            expires_in_secs: self.ttl.as_secs(),
            wiped,
        })
    }

    /// Whether the system can accept a new session.
    ///
    /// Never exposes the active session's id.
    pub fn status(&self) -> SystemStatus {
        let mut current = self.current.lock();
        self.expire_if_due(&mut current);
        if current.is_some() {
            SystemStatus::Occupied
        } else {
            SystemStatus::Available
        }
    }

    /// Remaining lifetime for the caller's session.
    ///
    /// Fails with `Unauthorized` when the id does not match the active
    /// session or the session has expired.
    pub fn info(&self, session_id: &SessionId) -> Result<SessionInfo> {
        let mut current = self.current.lock();
        self.expire_if_due(&mut current);
        let session = current
            .as_ref()
            .filter(|s| &s.id == session_id)
            .ok_or_else(|| {
                DriftError::Unauthorized("session expired or id does not match".into())
            })?;

        let remaining = (session.expires_at - self.clock.now()).num_seconds().max(0);
        Ok(SessionInfo {
            time_remaining_secs: u64::try_from(remaining).unwrap_or(0),
        })
    }

    /// Validate a session id for use by other operations.
    pub fn validate(&self, session_id: &SessionId) -> Result<()> {
        self.info(session_id).map(|_| ())
    }

    /// Terminate the caller's session, cancelling in-flight work and wiping
    /// all session-scoped state.
    ///
    /// Idempotent on an already-expired or already-terminated session: the
    /// second call succeeds and reports zero wiped entities.
    pub fn terminate(&self, session_id: &SessionId) -> Result<WipeCounts> {
        let mut current = self.current.lock();
        // An expired session behaves as already terminated: wipe it lazily
        // here so the caller's id falls through to the idempotent path.
        self.expire_if_due(&mut current);

        match current.as_ref() {
            Some(session) if &session.id == session_id => {
                info!(session_id = %session.id, "session terminated");
                *current = None;
                Ok(self.teardown.wipe())
            }
            Some(_) => Err(DriftError::Unauthorized(
                "session id does not match the active session".into(),
            )),
            None => Ok(WipeCounts::default()),
        }
    }

    /// Lazy expiry: drop and wipe the session once its deadline passed.
    fn expire_if_due(&self, current: &mut Option<Session>) {
        let now = self.clock.now();
        if let Some(session) = current.as_ref() {
            if now >= session.expires_at {
                info!(session_id = %session.id, "session expired, wiping data");
                *current = None;
                let _ = self.teardown.wipe();
            }
        }
    }
}
