//! Metrics registration for observability

use metrics::{describe_counter, histogram};
use std::time::Instant;

/// Initialize metrics with descriptions
pub fn init_metrics() {
    // Space manager metrics
    describe_counter!(
        "space_manager.ensure.hits",
        "Space lookups satisfied from the local store"
    );
    describe_counter!(
        "space_manager.spaces.created",
        "Spaces derived on the network and persisted"
    );
    describe_counter!(
        "space_manager.acl.grants",
        "Credential-gated ACL grants applied"
    );
    describe_counter!(
        "space_manager.reinitializations",
        "Sync client replacements after network reinitialization"
    );
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let duration = self.start.elapsed();
        histogram!(self.name).record(duration.as_secs_f64() * 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_init() {
        init_metrics();
        // Metrics are initialized globally, just ensure it doesn't panic
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new("test.operation");
        std::thread::sleep(std::time::Duration::from_millis(10));
        timer.stop();
    }
}
