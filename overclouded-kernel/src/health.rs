use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastAcquisition {
    pub subscription_id: String,
    pub duration_ms: u64,
    pub finished_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KernelHealth {
    pub uptime_seconds: u64,
    pub acquisitions_served: u64,
    pub acquisitions_rejected: u64,
    pub synthetic_served: u64,
    pub memory_usage_mb: f32,
    pub last_acquisition: Option<LastAcquisition>,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    served: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    synthetic: Arc<AtomicU64>,
    last: Arc<Mutex<Option<LastAcquisition>>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            served: Arc::new(AtomicU64::new(0)),
            rejected: Arc::new(AtomicU64::new(0)),
            synthetic: Arc::new(AtomicU64::new(0)),
            last: Arc::new(Mutex::new(None)),
        }
    }

    pub fn record_acquisition(&self, subscription_id: &str, elapsed: Duration) {
        self.served.fetch_add(1, Ordering::Relaxed);
        let finished_at = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        *self.last.lock() = Some(LastAcquisition {
            subscription_id: subscription_id.to_string(),
            duration_ms: elapsed.as_millis() as u64,
            finished_at,
        });
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_synthetic(&self) {
        self.synthetic.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_health(&self) -> KernelHealth {
        KernelHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            acquisitions_served: self.served.load(Ordering::Relaxed),
            acquisitions_rejected: self.rejected.load(Ordering::Relaxed),
            synthetic_served: self.synthetic.load(Ordering::Relaxed),
            memory_usage_mb: get_memory_usage_mb(),
            last_acquisition: self.last.lock().clone(),
        }
    }
}

/// Resident set size from /proc; 0 where unavailable.
fn get_memory_usage_mb() -> f32 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok());
            if let Some(kb) = rss_kb {
                return kb as f32 / 1024.0;
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_last_acquisition() {
        let tracker = HealthTracker::new();
        let shared = tracker.clone();
        shared.record_acquisition("sub-a", Duration::from_millis(1250));
        shared.record_rejection();
        shared.record_synthetic();
        shared.record_synthetic();

        let health = tracker.get_health();
        assert_eq!(health.acquisitions_served, 1);
        assert_eq!(health.acquisitions_rejected, 1);
        assert_eq!(health.synthetic_served, 2);
        let last = health.last_acquisition.unwrap();
        assert_eq!(last.subscription_id, "sub-a");
        assert_eq!(last.duration_ms, 1250);
        assert!(OffsetDateTime::parse(&last.finished_at, &Rfc3339).is_ok());
    }

    #[test]
    fn test_fresh_tracker_has_no_last_acquisition() {
        let health = HealthTracker::new().get_health();
        assert!(health.last_acquisition.is_none());
        assert!(health.memory_usage_mb >= 0.0);
    }
}
