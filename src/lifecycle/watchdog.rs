//! Liveness watchdog.
//!
//! # States
//! ```text
//! Idle ──start()──▶ Armed ──deadline passes without kick()──▶ Tripped
//!  ▲                  │                                          │
//!  └─────stop()───────┴─────────────────stop()───────────────────┘
//! ```
//!
//! # Design Decisions
//! - The timer runs on its own task and only observes the time since the
//!   last kick; it knows nothing about health outcomes
//! - The deadline and state live behind one mutex. The timer re-reads the
//!   deadline under that lock before tripping, so a kick racing the expiry
//!   check is never lost, and `stop()` flips the state under the same lock,
//!   so no trip can begin after it returns
//! - The callback runs at most once per arming

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Callback fired when the watchdog trips.
pub type TripCallback = Arc<dyn Fn() + Send + Sync>;

/// Watchdog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    Idle,
    Armed,
    Tripped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    #[error("watchdog is already armed")]
    AlreadyArmed,
}

struct Inner {
    state: WatchdogState,
    deadline: Instant,
}

/// Fires a callback unless [`kick`](Watchdog::kick) is called at least once
/// every `timeout`.
pub struct Watchdog {
    timeout: Duration,
    callback: TripCallback,
    inner: Arc<Mutex<Inner>>,
    task: Option<JoinHandle<()>>,
}

impl Watchdog {
    pub fn new(timeout: Duration, callback: TripCallback) -> Self {
        Self {
            timeout,
            callback,
            inner: Arc::new(Mutex::new(Inner {
                state: WatchdogState::Idle,
                deadline: Instant::now(),
            })),
            task: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> WatchdogState {
        lock(&self.inner).state
    }

    /// Arm the watchdog. Must be called from within a Tokio runtime.
    ///
    /// A tripped watchdog can be re-armed; an armed one cannot.
    pub fn start(&mut self) -> Result<(), WatchdogError> {
        {
            let mut inner = lock(&self.inner);
            if inner.state == WatchdogState::Armed {
                return Err(WatchdogError::AlreadyArmed);
            }
            inner.state = WatchdogState::Armed;
            inner.deadline = deadline_after(self.timeout);
        }

        if let Some(previous) = self.task.take() {
            previous.abort();
        }

        let inner = Arc::clone(&self.inner);
        let callback = Arc::clone(&self.callback);
        self.task = Some(tokio::spawn(watch(inner, callback)));

        tracing::debug!(timeout_secs = self.timeout.as_secs_f64(), "Watchdog armed");
        Ok(())
    }

    /// Push the deadline out by one timeout. Ignored unless armed.
    pub fn kick(&self) {
        let mut inner = lock(&self.inner);
        if inner.state == WatchdogState::Armed {
            inner.deadline = deadline_after(self.timeout);
        }
    }

    /// Disarm the watchdog.
    ///
    /// Once this returns the callback will not be invoked again. A callback
    /// already running on the timer task is allowed to finish.
    pub fn stop(&mut self) {
        lock(&self.inner).state = WatchdogState::Idle;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Watchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watchdog")
            .field("timeout", &self.timeout)
            .field("state", &self.state())
            .finish()
    }
}

async fn watch(inner: Arc<Mutex<Inner>>, callback: TripCallback) {
    loop {
        let deadline = {
            let guard = lock(&inner);
            if guard.state != WatchdogState::Armed {
                return;
            }
            guard.deadline
        };

        time::sleep_until(deadline).await;

        {
            let mut guard = lock(&inner);
            if guard.state != WatchdogState::Armed {
                return;
            }
            // Kicked while we slept.
            if Instant::now() < guard.deadline {
                continue;
            }
            guard.state = WatchdogState::Tripped;
        }

        tracing::error!("Watchdog deadline missed");
        callback();
        return;
    }
}

/// Timeouts too large for the clock are clamped to roughly thirty years.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

/// The guarded data stays consistent across a panic, so poisoning is ignored.
fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
