//! API error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use whistle_core::{SubmissionError, WhistleError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed request body: {0}")]
    MalformedPayload(String),

    #[error("Invalid report: {0}")]
    InvalidSubmission(#[from] SubmissionError),

    #[error("Unknown company: {0}")]
    UnknownCompany(i64),

    #[error("Report not found")]
    NotFound,

    /// Storage failure; carries only the public message
    #[error("{0}")]
    Storage(&'static str),
}

impl ApiError {
    /// Log a store error and hide its details from the caller
    pub fn storage(message: &'static str, err: WhistleError) -> Self {
        match err {
            WhistleError::UnknownCompany(id) => ApiError::UnknownCompany(id),
            other => {
                error!("{}: {}", message, other);
                ApiError::Storage(message)
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_)
            | ApiError::InvalidSubmission(_)
            | ApiError::UnknownCompany(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::MalformedPayload("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::storage("Failed to store report", WhistleError::Database("boom".into()))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_error_hides_details() {
        let err = ApiError::storage(
            "Failed to load reports",
            WhistleError::Database("connection refused to 10.0.0.5".into()),
        );
        assert_eq!(err.to_string(), "Failed to load reports");
    }

    #[test]
    fn test_unknown_company_is_a_client_error() {
        let err = ApiError::storage("Failed to store report", WhistleError::UnknownCompany(42));
        assert!(matches!(err, ApiError::UnknownCompany(42)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
