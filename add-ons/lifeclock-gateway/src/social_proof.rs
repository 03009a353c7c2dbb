//! Social-proof count: a read-through cache over the persisted payment count.
//!
//! The count is display-only ("N people unlocked their report"), so serving a
//! value up to five minutes stale is fine. The source is injectable so the cache
//! can back onto a distributed store in a multi-instance deployment without
//! behavior change.

use crate::store::{ReportStore, TrackedEvent};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::warn;

/// Default staleness window.
pub const SOCIAL_PROOF_TTL: Duration = Duration::from_secs(300);

/// Source of truth for the count.
pub trait SocialProofSource: Send + Sync {
    fn count(&self) -> Result<u64, String>;
}

impl SocialProofSource for Arc<ReportStore> {
    fn count(&self) -> Result<u64, String> {
        self.count_events(TrackedEvent::PaymentComplete)
            .map_err(|e| e.to_string())
    }
}

pub struct CachedSocialProof {
    source: Box<dyn SocialProofSource>,
    ttl: Duration,
    slot: RwLock<Option<(Instant, u64)>>,
}

impl CachedSocialProof {
    pub fn new(source: Box<dyn SocialProofSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Possibly-stale count. Within the TTL the cached value is served without
    /// touching the source; on refresh failure the last known value (or 0) is
    /// served and the failure is logged.
    pub fn get(&self) -> u64 {
        if let Some((at, value)) = *self.slot.read().unwrap() {
            if at.elapsed() < self.ttl {
                return value;
            }
        }
        match self.source.count() {
            Ok(value) => {
                *self.slot.write().unwrap() = Some((Instant::now(), value));
                value
            }
            Err(e) => {
                warn!("social proof refresh failed: {}", e);
                self.slot.read().unwrap().map(|(_, value)| value).unwrap_or(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingSource {
        calls: Arc<AtomicU64>,
        fail_after: u64,
    }

    impl SocialProofSource for CountingSource {
        fn count(&self) -> Result<u64, String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call > self.fail_after {
                Err("backing store offline".to_string())
            } else {
                Ok(call * 10)
            }
        }
    }

    #[test]
    fn within_ttl_the_source_is_not_touched() {
        let calls = Arc::new(AtomicU64::new(0));
        let cache = CachedSocialProof::new(
            Box::new(CountingSource {
                calls: calls.clone(),
                fail_after: u64::MAX,
            }),
            Duration::from_secs(300),
        );
        assert_eq!(cache.get(), 10);
        assert_eq!(cache.get(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_ttl_refreshes() {
        let calls = Arc::new(AtomicU64::new(0));
        let cache = CachedSocialProof::new(
            Box::new(CountingSource {
                calls: calls.clone(),
                fail_after: u64::MAX,
            }),
            Duration::ZERO,
        );
        assert_eq!(cache.get(), 10);
        assert_eq!(cache.get(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn refresh_failure_serves_last_known_value() {
        let calls = Arc::new(AtomicU64::new(0));
        let cache = CachedSocialProof::new(
            Box::new(CountingSource {
                calls,
                fail_after: 1,
            }),
            Duration::ZERO,
        );
        assert_eq!(cache.get(), 10);
        // Source now fails; the stale value keeps being served.
        assert_eq!(cache.get(), 10);
        assert_eq!(cache.get(), 10);
    }

    #[test]
    fn failure_with_no_history_serves_zero() {
        let cache = CachedSocialProof::new(
            Box::new(CountingSource {
                calls: Arc::new(AtomicU64::new(0)),
                fail_after: 0,
            }),
            Duration::ZERO,
        );
        assert_eq!(cache.get(), 0);
    }
}
