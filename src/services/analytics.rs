use crate::models::GateStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-local counters for gate decisions.
pub struct GateAnalytics {
    allowed: AtomicU64,
    challenged: AtomicU64,
    missing_receipt: AtomicU64,
    verification_failed: AtomicU64,
    replay_rejected: AtomicU64,
    start_time: Instant,
}

impl GateAnalytics {
    pub fn new() -> Self {
        Self {
            allowed: AtomicU64::new(0),
            challenged: AtomicU64::new(0),
            missing_receipt: AtomicU64::new(0),
            verification_failed: AtomicU64::new(0),
            replay_rejected: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_receipt(&self) {
        self.missing_receipt.fetch_add(1, Ordering::Relaxed);
        self.challenged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verification_failed(&self) {
        self.verification_failed.fetch_add(1, Ordering::Relaxed);
        self.challenged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay_rejected(&self) {
        self.replay_rejected.fetch_add(1, Ordering::Relaxed);
        self.challenged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> GateStats {
        GateStats {
            allowed: self.allowed.load(Ordering::Relaxed),
            challenged: self.challenged.load(Ordering::Relaxed),
            missing_receipt: self.missing_receipt.load(Ordering::Relaxed),
            verification_failed: self.verification_failed.load(Ordering::Relaxed),
            replay_rejected: self.replay_rejected.load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for GateAnalytics {
    fn default() -> Self {
        Self::new()
    }
}
