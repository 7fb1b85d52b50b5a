//! Server configuration loaded from the process environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::info;

/// Storage backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Postgres,
    Sqlite,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Memory => write!(f, "memory"),
            StoreKind::Postgres => write!(f, "postgres"),
            StoreKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Explicit backend; inferred from `database_url` when absent
    #[serde(default)]
    pub store: Option<StoreKind>,
    #[serde(default)]
    pub database_url: Option<String>,
    /// Require TLS for PostgreSQL unless the URL picks an sslmode itself
    #[serde(default = "default_true")]
    pub database_ssl: bool,
    #[serde(default = "default_true")]
    pub fingerprint_reports: bool,
    /// Comma-separated organization names registered at startup
    #[serde(default)]
    pub seed_companies: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

impl ServerConfig {
    /// Load from `PORT`, `HOST`, `STORE`, `DATABASE_URL`, `DATABASE_SSL`,
    /// `FINGERPRINT_REPORTS` and `SEED_COMPANIES`
    pub fn load() -> Result<Self> {
        info!("Loading configuration from environment...");
        Self::from_env(::config::Environment::default())
    }

    fn from_env(env: ::config::Environment) -> Result<Self> {
        let config: ServerConfig = ::config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read environment")?
            .try_deserialize()
            .context("Invalid server configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.store_kind() {
            StoreKind::Memory => Ok(()),
            kind => self
                .database_url()
                .map(|_| ())
                .with_context(|| format!("The {} store needs a database", kind)),
        }
    }

    pub fn store_kind(&self) -> StoreKind {
        match (&self.store, &self.database_url) {
            (Some(kind), _) => *kind,
            (None, Some(url)) if url.starts_with("sqlite:") => StoreKind::Sqlite,
            (None, Some(_)) => StoreKind::Postgres,
            (None, None) => StoreKind::Memory,
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .context("DATABASE_URL not set")
    }

    pub fn seed_companies(&self) -> Vec<&str> {
        self.seed_companies
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Resolve `host:port`; `host` may be an IP literal or a hostname
    pub async fn bind_address(&self) -> Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("Failed to resolve bind address {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("No address found for {}:{}", self.host, self.port))
    }
}
