//! # Sliding-Window Rate Limiter
//!
//! Per-IP request ceiling, counted from the audit log itself.
//!
//! ## Window Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               ceiling = 10, window = 60s                                │
//! │                                                                         │
//! │  now - 60s                                        now                   │
//! │     │   x  x   x x  x    x  x   x  x         x     │                    │
//! │     └──────────────── 10 completed ────────────────┘                    │
//! │                                                                         │
//! │  11th request: prior count (10) >= ceiling → rejected, and no log row  │
//! │  is written for it, so rejected requests never extend the window.      │
//! │                                                                         │
//! │  Counter lookup fails → request is ALLOWED (warn). Availability over   │
//! │  strictness: a broken limiter must not take the calculator down.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use relist_core::RequesterIdentity;
use relist_db::{Database, DbResult};

use crate::error::{EngineError, EngineResult};

/// Default window length.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Default per-IP ceiling inside the window.
pub const DEFAULT_CEILING: u32 = 10;

// =============================================================================
// Request Counter
// =============================================================================

/// Counts completed calculations per IP since a cutoff.
#[async_trait]
pub trait RequestCounter: Send + Sync {
    async fn count_since(&self, ip: &str, cutoff: DateTime<Utc>) -> DbResult<u32>;
}

/// The production counter: rows in `calculation_logs`.
#[derive(Debug, Clone)]
pub struct LogBackedCounter {
    db: Database,
}

impl LogBackedCounter {
    pub fn new(db: Database) -> Self {
        LogBackedCounter { db }
    }
}

#[async_trait]
impl RequestCounter for LogBackedCounter {
    async fn count_since(&self, ip: &str, cutoff: DateTime<Utc>) -> DbResult<u32> {
        self.db.calc_logs().count_for_ip_since(ip, cutoff).await
    }
}

// =============================================================================
// Rate Limiter
// =============================================================================

/// Per-IP sliding-window limiter.
pub struct RateLimiter {
    counter: Arc<dyn RequestCounter>,
    window_secs: u64,
    ceiling: u32,
}

impl RateLimiter {
    pub fn new(counter: Arc<dyn RequestCounter>, window_secs: u64, ceiling: u32) -> Self {
        RateLimiter {
            counter,
            window_secs,
            ceiling,
        }
    }

    /// Admits or rejects a request before any policy work happens.
    ///
    /// Rejects when the requester already completed `ceiling` calculations
    /// inside the window.
    pub async fn check(&self, identity: &RequesterIdentity) -> EngineResult<()> {
        let cutoff = Utc::now() - Duration::seconds(self.window_secs as i64);

        match self.counter.count_since(&identity.ip, cutoff).await {
            Ok(count) if count >= self.ceiling => {
                debug!(ip = %identity.ip, count = count, "Rate limit ceiling reached");
                Err(EngineError::RateLimitExceeded {
                    ceiling: self.ceiling,
                    window_secs: self.window_secs,
                })
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(ip = %identity.ip, error = %e, "Rate-limit counter failed, allowing request");
                Ok(())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use relist_db::DbError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedCounter(u32);

    #[async_trait]
    impl RequestCounter for FixedCounter {
        async fn count_since(&self, _ip: &str, _cutoff: DateTime<Utc>) -> DbResult<u32> {
            Ok(self.0)
        }
    }

    struct FailingCounter(AtomicU32);

    #[async_trait]
    impl RequestCounter for FailingCounter {
        async fn count_since(&self, _ip: &str, _cutoff: DateTime<Utc>) -> DbResult<u32> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(DbError::QueryFailed("boom".to_string()))
        }
    }

    fn identity() -> RequesterIdentity {
        RequesterIdentity {
            ip: "1.2.3.4".to_string(),
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn test_under_ceiling_allowed() {
        let limiter = RateLimiter::new(Arc::new(FixedCounter(9)), 60, 10);
        assert!(limiter.check(&identity()).await.is_ok());
    }

    #[tokio::test]
    async fn test_at_ceiling_rejected() {
        let limiter = RateLimiter::new(Arc::new(FixedCounter(10)), 60, 10);
        let err = limiter.check(&identity()).await.unwrap_err();
        assert!(matches!(err, EngineError::RateLimitExceeded { .. }));
        assert_eq!(err.http_status(), 429);
    }

    #[tokio::test]
    async fn test_counter_failure_allows_request() {
        let counter = Arc::new(FailingCounter(AtomicU32::new(0)));
        let limiter = RateLimiter::new(counter.clone(), 60, 10);

        assert!(limiter.check(&identity()).await.is_ok());
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
