use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Per-key "one invocation per window" gate, checked before a command runs.
/// Entries older than `retention` are dropped on each acquire.
#[derive(Debug)]
pub struct Cooldowns {
    retention: Duration,
    last_run: Mutex<HashMap<String, Instant>>,
}

impl Cooldowns {
    /// `retention` must be at least the longest window passed to `try_acquire`.
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            last_run: Mutex::new(HashMap::new()),
        }
    }

    /// `Ok` and records the run when the key is free, otherwise the time left.
    pub fn try_acquire(&self, key: &str, window: Duration, now: Instant) -> Result<(), Duration> {
        let mut guard = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
        let retention = self.retention.max(window);
        guard.retain(|_, last| now.saturating_duration_since(*last) < retention);
        if let Some(last) = guard.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < window {
                return Err(window - elapsed);
            }
        }
        guard.insert(key.to_string(), now);
        Ok(())
    }
}
