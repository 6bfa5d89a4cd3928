//! Per-client admission control.
//!
//! Flow Overview: each client key owns a fixed window `{started_at, count}`.
//! A request inside the window increments the count until the threshold is
//! reached; once exceeded the caller gets a retry-after estimate pointing at
//! the end of the window. All state lives behind a single mutex, so counts
//! are exact under concurrency and a key can never overshoot its threshold.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Stale keys are swept once the map grows past this many entries.
const SWEEP_WATERMARK: usize = 10_000;

/// Time source for window arithmetic. Injected so tests can drive windows
/// deterministically.
pub trait Clock: Send + Sync {
    /// Time elapsed since the unix epoch.
    fn now(&self) -> Duration;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AdmissionSettings {
    pub enabled: bool,
    pub window: Duration,
    pub threshold: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub permitted: bool,
    pub retry_after: Duration,
}

impl AdmissionDecision {
    const fn permit() -> Self {
        Self {
            permitted: true,
            retry_after: Duration::ZERO,
        }
    }

    const fn deny(retry_after: Duration) -> Self {
        Self {
            permitted: false,
            retry_after,
        }
    }
}

#[derive(Debug)]
struct WindowState {
    started_at: Duration,
    count: u32,
}

pub struct AdmissionGate {
    settings: AdmissionSettings,
    clock: Box<dyn Clock>,
    windows: Mutex<HashMap<String, WindowState>>,
}

impl AdmissionGate {
    #[must_use]
    pub fn new(settings: AdmissionSettings) -> Self {
        Self::with_clock(settings, Box::new(SystemClock))
    }

    /// Build a gate with an explicit time source.
    #[must_use]
    pub fn with_clock(settings: AdmissionSettings, clock: Box<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether a request from `client_key` may proceed.
    ///
    /// Keys never share counters. A denied caller receives the time until
    /// the current window ends; past windows never change a prior decision.
    pub fn allow(&self, client_key: &str) -> AdmissionDecision {
        if !self.settings.enabled {
            return AdmissionDecision::permit();
        }

        let now = self.clock.now();
        let window = self.settings.window;
        let mut windows = self.windows.lock();

        if windows.len() > SWEEP_WATERMARK {
            windows.retain(|_, state| elapsed_since(now, state.started_at) < window);
        }

        let state = windows.entry(client_key.to_string()).or_insert(WindowState {
            started_at: now,
            count: 0,
        });

        if elapsed_since(now, state.started_at) >= window {
            state.started_at = now;
            state.count = 0;
        }

        if state.count < self.settings.threshold {
            state.count += 1;
            AdmissionDecision::permit()
        } else {
            let remaining = window.saturating_sub(elapsed_since(now, state.started_at));
            AdmissionDecision::deny(remaining.max(Duration::from_millis(1)))
        }
    }
}

// Wall clock may step backwards; saturate instead of un-expiring windows.
fn elapsed_since(now: Duration, started_at: Duration) -> Duration {
    now.checked_sub(started_at).unwrap_or_default()
}
