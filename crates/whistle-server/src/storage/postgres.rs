//! PostgreSQL report store

use super::{db_error, insert_error, role_check, ReportRow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use tracing::info;
use whistle_core::{Company, Report, ReportStore};

pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    /// Connect and create missing tables.
    ///
    /// With `require_ssl`, TLS is enforced unless the URL already carries an
    /// `sslmode` parameter.
    pub async fn connect(url: &str, require_ssl: bool) -> Result<Self> {
        let mut options =
            PgConnectOptions::from_str(url).context("Invalid PostgreSQL database URL")?;
        if forces_ssl(url, require_ssl) {
            options = options.ssl_mode(PgSslMode::Require);
        }

        info!("Connecting to PostgreSQL (ssl required: {})...", require_ssl);
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("Failed to connect to PostgreSQL")?;
        info!("Connected to PostgreSQL");

        Self::ensure_schema(&pool)
            .await
            .context("Failed to create database tables")?;
        info!("Tables ensured to exist");

        Ok(Self { pool })
    }

    async fn ensure_schema(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                company_id BIGINT REFERENCES companies(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                role TEXT NOT NULL {},
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
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
                company_id BIGINT REFERENCES companies(id) ON DELETE CASCADE,
                encrypted_data TEXT NOT NULL,
                blockchain_hash TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
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
            INSERT INTO companies (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, created_at
            "#,
        )
        .bind(name)
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

/// Whether TLS must be forced on top of what the URL asks for
fn forces_ssl(url: &str, require_ssl: bool) -> bool {
    if !require_ssl {
        return false;
    }
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
    !query
        .split('&')
        .any(|pair| pair.split('=').next() == Some("sslmode"))
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn add(&self, report: Report) -> whistle_core::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, company_id, encrypted_data, blockchain_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                company_id = EXCLUDED.company_id,
                encrypted_data = EXCLUDED.encrypted_data,
                blockchain_hash = EXCLUDED.blockchain_hash,
                created_at = EXCLUDED.created_at
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
            FROM reports WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| r.into()))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whistle_core::WhistleError;

    #[test]
    fn test_forces_ssl_without_sslmode() {
        assert!(forces_ssl("postgres://user:pw@db:5432/whistle", true));
        assert!(forces_ssl("postgres://user:pw@db:5432/whistle?application_name=api", true));
        assert!(!forces_ssl("postgres://user:pw@db:5432/whistle", false));
    }

    #[test]
    fn test_url_sslmode_wins() {
        assert!(!forces_ssl("postgres://db/whistle?sslmode=disable", true));
        assert!(!forces_ssl("postgres://db/whistle?connect_timeout=5&sslmode=prefer", true));
    }

    #[test]
    fn test_sslmode_outside_query_is_ignored() {
        assert!(forces_ssl("postgres://user:sslmode=x@db/whistle", true));
        assert!(forces_ssl("postgres://db/whistle?xsslmode=disable", true));
    }

    // Run against a scratch database with
    // `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
    async fn store() -> Option<PgReportStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        Some(PgReportStore::connect(&url, false).await.unwrap())
    }

    #[tokio::test]
    #[ignore]
    async fn test_pg_add_then_get() {
        let Some(store) = store().await else { return };
        let report = Report::new("leak").with_fingerprint("abc".to_string());
        store.add(report.clone()).await.unwrap();

        let found = store.get_by_id(&report.id).await.unwrap().unwrap();
        assert_eq!(found.description, "leak");
        assert_eq!(found.blockchain_hash.as_deref(), Some("abc"));
        assert!(store.get_by_id("does-not-exist").await.unwrap().is_none());
        assert!(store.get_all().await.unwrap().iter().any(|r| r.id == report.id));
    }

    #[tokio::test]
    #[ignore]
    async fn test_pg_overwrite_by_id() {
        let Some(store) = store().await else { return };
        let first = Report::new("first");
        store.add(first.clone()).await.unwrap();

        let mut replacement = Report::new("replaced");
        replacement.id = first.id.clone();
        store.add(replacement).await.unwrap();

        let found = store.get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(found.description, "replaced");
        let copies = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.id == first.id)
            .count();
        assert_eq!(copies, 1);
    }

    #[tokio::test]
    #[ignore]
    async fn test_pg_company_reference() {
        let Some(store) = store().await else { return };
        let name = format!("Acme {}", Report::new("").id);
        let company = store.ensure_company(&name).await.unwrap();
        assert_eq!(store.ensure_company(&name).await.unwrap().id, company.id);

        let report = Report::new("leak").with_company(Some(company.id));
        store.add(report.clone()).await.unwrap();
        let found = store.get_by_id(&report.id).await.unwrap().unwrap();
        assert_eq!(found.company_id, Some(company.id));

        let orphan = Report::new("leak").with_company(Some(i64::MAX));
        let err = store.add(orphan).await.unwrap_err();
        assert!(matches!(err, WhistleError::UnknownCompany(id) if id == i64::MAX));
    }
}
