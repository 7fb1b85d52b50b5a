//! In-memory report store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use whistle_core::{Report, ReportStore, Result};

/// Report map behind a single exclusive lock.
///
/// Every operation holds the lock for its whole duration, so reads and
/// writes are fully serialized. Contents are lost on restart.
pub struct MemoryReportStore {
    reports: Mutex<HashMap<String, Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn add(&self, report: Report) -> Result<()> {
        let mut reports = self.reports.lock().await;
        reports.insert(report.id.clone(), report);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Report>> {
        let reports = self.reports.lock().await;
        Ok(reports.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Report>> {
        let reports = self.reports.lock().await;
        Ok(reports.get(id).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
