//! Session inactivity timeout.
//!
//! One [`InactivityTimer`] per signed-in session. Any operator activity
//! calls [`InactivityTimer::reset`]; if nothing happens for the configured
//! limit the logout callback runs, exactly once, and the timer is spent.
//! The timer runs on the ambient tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Idle time after which a session is logged out.
pub const DEFAULT_INACTIVITY_LIMIT: Duration = Duration::from_secs(15 * 60);

type Callback = Arc<dyn Fn() + Send + Sync>;

pub struct InactivityTimer {
    limit: Duration,
    on_expire: Callback,
    expired: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InactivityTimer {
    /// Timer with [`DEFAULT_INACTIVITY_LIMIT`]. Not armed until `start`.
    pub fn new<F>(on_expire: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_limit(DEFAULT_INACTIVITY_LIMIT, on_expire)
    }

    pub fn with_limit<F>(limit: Duration, on_expire: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            limit,
            on_expire: Arc::new(on_expire),
            expired: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Arm the timer. Restarts the countdown if already armed.
    ///
    /// Returns `false` once the timer has expired; a new session needs a new
    /// timer.
    pub fn start(&self) -> bool {
        if self.is_expired() {
            return false;
        }
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let limit = self.limit;
        let expired = Arc::clone(&self.expired);
        let on_expire = Arc::clone(&self.on_expire);
        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            if !expired.swap(true, Ordering::SeqCst) {
                info!(idle_secs = limit.as_secs(), "session expired after inactivity");
                on_expire();
            }
        }));
        true
    }

    /// Record operator activity. Has no effect unless the timer is armed.
    pub fn reset(&self) -> bool {
        if !self.is_armed() {
            return false;
        }
        debug!("session activity, inactivity countdown restarted");
        self.start()
    }

    /// Disarm without firing, e.g. on explicit logout.
    pub fn cancel(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
            debug!("inactivity timer cancelled");
        }
    }

    pub fn is_armed(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().is_some_and(|t| !t.is_finished()) && !self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        if let Some(handle) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
