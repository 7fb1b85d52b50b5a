//! Organization types backing the `companies` and `users` tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Organization that reports can be filed against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Role of a staff account in the `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Journalist,
    Reader,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Journalist, Role::Reader];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Journalist => write!(f, "journalist"),
            Role::Reader => write!(f, "reader"),
        }
    }
}

#[derive(Error, Debug)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "journalist" => Ok(Role::Journalist),
            "reader" => Ok(Role::Reader),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
