//! Storage layer
//!
//! Reports live either in an in-memory map or in a SQL `reports` table.
//! PostgreSQL is the production database; SQLite serves embedded setups.

pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use memory::MemoryReportStore;
pub use postgres::PgReportStore;
pub use sqlite::SqliteReportStore;

use crate::config::{ServerConfig, StoreKind};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use whistle_core::{Report, ReportStore, Role, WhistleError};

/// Open the backend selected by `config` and register seed companies
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn ReportStore>> {
    let companies = config.seed_companies();

    let store: Arc<dyn ReportStore> = match config.store_kind() {
        StoreKind::Memory => {
            if !companies.is_empty() {
                warn!("SEED_COMPANIES ignored: the memory store has no company table");
            }
            Arc::new(MemoryReportStore::new())
        }
        StoreKind::Postgres => {
            let store = PgReportStore::connect(config.database_url()?, config.database_ssl).await?;
            for name in companies {
                let company = store.ensure_company(name).await?;
                info!("Company registered: {} (id={})", company.name, company.id);
            }
            Arc::new(store)
        }
        StoreKind::Sqlite => {
            let store = SqliteReportStore::connect(config.database_url()?).await?;
            for name in companies {
                let company = store.ensure_company(name).await?;
                info!("Company registered: {} (id={})", company.name, company.id);
            }
            Arc::new(store)
        }
    };
    Ok(store)
}

/// `CHECK` clause listing the accepted user roles
fn role_check() -> String {
    let roles = Role::ALL
        .iter()
        .map(|r| format!("'{}'", r))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CHECK (role IN ({}))", roles)
}

/// Map an insert failure, recognizing a dangling `company_id`
fn insert_error(e: sqlx::Error, company_id: Option<i64>) -> WhistleError {
    let fk_violation = e
        .as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false);

    match company_id {
        Some(id) if fk_violation => WhistleError::UnknownCompany(id),
        _ => WhistleError::Database(e.to_string()),
    }
}

fn db_error(e: sqlx::Error) -> WhistleError {
    WhistleError::Database(e.to_string())
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    company_id: Option<i64>,
    encrypted_data: String,
    blockchain_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(r: ReportRow) -> Self {
        Report {
            id: r.id,
            description: r.encrypted_data,
            timestamp: r.created_at,
            company_id: r.company_id,
            blockchain_hash: r.blockchain_hash,
        }
    }
}
