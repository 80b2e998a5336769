use std::sync::Mutex;

use tracing::warn;

use crate::error::FetchError;

/// Dual-sink failure reporting: one notice for whoever issued the command,
/// one diagnostic for the maintainer contact.
pub trait FailureReporter: Send + Sync {
    fn notify_user(&self, notice: &str);
    fn notify_maintainer(&self, diagnostic: &str);
}

/// Reports a transport failure exactly once on each sink.
pub fn report_fetch_failure<R: FailureReporter + ?Sized>(reporter: &R, err: &FetchError) {
    warn!(category = %err.category(), "sheet fetch failed: {err}");
    reporter.notify_user(&err.category().user_notice());
    reporter.notify_maintainer(&err.diagnostic());
}

/// Keeps every message in memory for tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    user: Mutex<Vec<String>>,
    maintainer: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_notices(&self) -> Vec<String> {
        self.user.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn maintainer_messages(&self) -> Vec<String> {
        self.maintainer.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl FailureReporter for RecordingReporter {
    fn notify_user(&self, notice: &str) {
        if let Ok(mut guard) = self.user.lock() {
            guard.push(notice.to_string());
        }
    }

    fn notify_maintainer(&self, diagnostic: &str) {
        if let Ok(mut guard) = self.maintainer.lock() {
            guard.push(diagnostic.to_string());
        }
    }
}
