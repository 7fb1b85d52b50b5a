//! Storage traits for persistence

use crate::Result;
use async_trait::async_trait;
use whistle_types::Report;

/// Report store
///
/// Implementations own persistence and concurrent access control. Reports
/// are write-once: there is no update or delete.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a report, replacing any existing report with the same ID
    async fn add(&self, report: Report) -> Result<()>;

    /// Snapshot of every stored report, in no particular order
    async fn get_all(&self) -> Result<Vec<Report>>;

    /// Look up a report. A missing ID is `Ok(None)`, not an error.
    async fn get_by_id(&self, id: &str) -> Result<Option<Report>>;

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}
