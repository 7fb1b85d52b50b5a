//! SQLite report store (embedded, no external dependencies)

use super::{db_error, insert_error, role_check, ReportRow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use whistle_core::{Company, Report, ReportStore};

pub struct SqliteReportStore {
    pool: SqlitePool,
}

impl SqliteReportStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        info!(in_memory, "Opening SQLite report store");

        let mut options = SqliteConnectOptions::from_str(url)
            .context("Invalid SQLite database URL")?
            .create_if_missing(true);
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // An in-memory database exists per connection, so keep exactly one alive
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        Self::ensure_schema(&pool)
            .await
            .context("Failed to create database tables")?;
        info!("SQLite report store ready");

        Ok(Self { pool })
    }

    async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER REFERENCES companies(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                role TEXT NOT NULL {},
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            role_check()
        ))
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                company_id INTEGER REFERENCES companies(id) ON DELETE CASCADE,
                encrypted_data TEXT NOT NULL,
                blockchain_hash TEXT,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Register an organization by name, returning the existing row if present
    pub async fn ensure_company(&self, name: &str) -> whistle_core::Result<Company> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO companies (name, created_at) VALUES (?1, ?2)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING id, created_at
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Company {
            id,
            name: name.to_string(),
            created_at,
        })
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn add(&self, report: Report) -> whistle_core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, company_id, encrypted_data, blockchain_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                company_id = excluded.company_id,
                encrypted_data = excluded.encrypted_data,
                blockchain_hash = excluded.blockchain_hash,
                created_at = excluded.created_at
            "#,
        )
        .bind(&report.id)
        .bind(report.company_id)
        .bind(&report.description)
        .bind(&report.blockchain_hash)
        .bind(report.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, report.company_id))?;

        Ok(())
    }

    async fn get_all(&self) -> whistle_core::Result<Vec<Report>> {
        let rows: Vec<ReportRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, encrypted_data, blockchain_hash, created_at
            FROM reports ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_by_id(&self, id: &str) -> whistle_core::Result<Option<Report>> {
        let row: Option<ReportRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, encrypted_data, blockchain_hash, created_at
            FROM reports WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| r.into()))
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whistle_core::WhistleError;

    async fn store() -> SqliteReportStore {
        SqliteReportStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let store = store().await;
        let report = Report::new("leak").with_fingerprint("abc".to_string());
        store.add(report.clone()).await.unwrap();

        let found = store.get_by_id(&report.id).await.unwrap().unwrap();
        assert_eq!(found.id, report.id);
        assert_eq!(found.description, "leak");
        assert_eq!(found.blockchain_hash.as_deref(), Some("abc"));
        assert_eq!(found.company_id, None);
    }

    #[tokio::test]
    async fn test_missing_id() {
        let store = store().await;
        assert!(store.get_by_id("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_and_overwrite() {
        let store = store().await;
        let first = Report::new("first");
        let second = Report::new("second");
        store.add(first.clone()).await.unwrap();
        store.add(second.clone()).await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 2);

        let mut replacement = Report::new("replaced");
        replacement.id = first.id.clone();
        store.add(replacement).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        let found = store.get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(found.description, "replaced");
    }

    #[tokio::test]
    async fn test_company_reference() {
        let store = store().await;
        let company = store.ensure_company("Acme Corp").await.unwrap();

        let report = Report::new("leak").with_company(Some(company.id));
        store.add(report.clone()).await.unwrap();
        let found = store.get_by_id(&report.id).await.unwrap().unwrap();
        assert_eq!(found.company_id, Some(company.id));

        let orphan = Report::new("leak").with_company(Some(company.id + 100));
        let err = store.add(orphan).await.unwrap_err();
        assert!(matches!(err, WhistleError::UnknownCompany(id) if id == company.id + 100));
    }

    #[tokio::test]
    async fn test_ensure_company_is_idempotent() {
        let store = store().await;
        let first = store.ensure_company("Acme Corp").await.unwrap();
        let again = store.ensure_company("Acme Corp").await.unwrap();
        let other = store.ensure_company("Globex").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);
    }
}
