//! # Result Persistence
//!
//! Writes the audit log row and the linked result snapshot, and reads
//! snapshots back for shared result links.
//!
//! Persistence is best-effort from the requester's point of view: the
//! calculation already succeeded, so a storage failure degrades the response
//! (no shareable ID) instead of failing it. The engine owns that decision;
//! this module just does the writes in order.

use async_trait::async_trait;

use relist_core::{CalculationLog, CalculationResult};
use relist_db::{Database, DbResult};

// =============================================================================
// Persistence Gateway
// =============================================================================

/// Storage seam for audit logs and snapshots.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Writes the log row, then the snapshot referencing it.
    /// Returns the snapshot ID (the shareable result reference).
    async fn record(&self, log: &CalculationLog, result: &CalculationResult) -> DbResult<String>;

    /// Fetches a persisted snapshot by ID.
    async fn fetch_snapshot(&self, id: &str) -> DbResult<Option<CalculationResult>>;
}

/// The production gateway over the SQLite log repository.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    db: Database,
}

impl SqliteGateway {
    pub fn new(db: Database) -> Self {
        SqliteGateway { db }
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn record(&self, log: &CalculationLog, result: &CalculationResult) -> DbResult<String> {
        let repo = self.db.calc_logs();

        // Log first: even if the snapshot write fails, the request is
        // counted against the rate-limit window.
        let log_id = repo.insert_log(log).await?;
        repo.insert_snapshot(&log_id, result).await
    }

    async fn fetch_snapshot(&self, id: &str) -> DbResult<Option<CalculationResult>> {
        self.db.calc_logs().get_snapshot(id).await
    }
}
