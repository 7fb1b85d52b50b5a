//! Report types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single submitted disclosure.
///
/// Reports are created once on submission and never modified afterwards.
/// `description` is opaque to the service: it may be plaintext or a sealed
/// payload produced on the reporter's machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
    /// Hex SHA-256 of `description` taken at submission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_hash: Option<String>,
}

impl Report {
    /// Create a new report with a fresh random ID
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            timestamp: Utc::now(),
            company_id: None,
            blockchain_hash: None,
        }
    }

    pub fn with_company(mut self, company_id: Option<i64>) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn with_fingerprint(mut self, hash: String) -> Self {
        self.blockchain_hash = Some(hash);
        self
    }
}

/// Body of `POST /report`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    #[serde(alias = "encryptedDescription")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<i64>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("description must not be empty")]
    EmptyDescription,
}

impl ReportSubmission {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            company_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.description.trim().is_empty() {
            return Err(SubmissionError::EmptyDescription);
        }
        Ok(())
    }

    /// Turn the submission into a stored report, assigning its ID
    pub fn into_report(self) -> Report {
        Report::new(self.description).with_company(self.company_id)
    }
}

/// Response of a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub message: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reports_get_distinct_ids() {
        let a = Report::new("first");
        let b = Report::new("second");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.blockchain_hash.is_none());
    }

    #[test]
    fn test_submission_accepts_encrypted_alias() {
        let body = r#"{"company_id": 7, "encryptedDescription": "c2VhbGVk"}"#;
        let submission: ReportSubmission = serde_json::from_str(body).unwrap();
        assert_eq!(submission.description, "c2VhbGVk");
        assert_eq!(submission.company_id, Some(7));

        let plain: ReportSubmission = serde_json::from_str(r#"{"description": "leak"}"#).unwrap();
        assert_eq!(plain.description, "leak");
        assert_eq!(plain.company_id, None);
    }

    #[test]
    fn test_blank_submission_is_rejected() {
        assert_eq!(
            ReportSubmission::new("   ").validate(),
            Err(SubmissionError::EmptyDescription)
        );
        assert!(ReportSubmission::new("leak").validate().is_ok());
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let report = Report::new("leak");
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("company_id").is_none());
        assert!(json.get("blockchain_hash").is_none());

        let report = report.with_company(Some(3)).with_fingerprint("ab".to_string());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["company_id"], 3);
        assert_eq!(json["blockchain_hash"], "ab");
    }
}
