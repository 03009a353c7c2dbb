//! Token-bucket rate limiting for checkout-session creation.
//!
//! Best-effort and in-memory only: one bucket per identifier, decayed by
//! wall-clock elapsed time, reset on process restart. This exists for abuse
//! mitigation, not correctness, so losing state on restart is acceptable.

use dashmap::DashMap;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct CheckoutLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl CheckoutLimiter {
    pub fn new(capacity: u32, refill_per_minute: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: capacity.max(1) as f64,
            refill_per_sec: refill_per_minute.max(0.0) / 60.0,
        }
    }

    /// Takes one token for `key` if available.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        let elapsed = now.saturating_duration_since(entry.last_refill).as_secs_f64();
        entry.tokens = (entry.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        entry.last_refill = now;
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
