//! Report handlers

use crate::{error::ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::{debug, info};
use whistle_core::{fingerprint, Report, ReportSubmission, SubmissionReceipt};

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ReportSubmission>, JsonRejection>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let Json(submission) = payload?;
    submission.validate()?;

    let mut report = submission.into_report();
    if state.fingerprint_reports {
        let hash = fingerprint::hash(&report.description);
        report = report.with_fingerprint(hash);
    }

    let receipt = SubmissionReceipt {
        message: "Report submitted successfully".to_string(),
        id: report.id.clone(),
        hash: report.blockchain_hash.clone(),
    };

    state
        .store
        .add(report)
        .await
        .map_err(|e| ApiError::storage("Failed to store report", e))?;

    info!(id = %receipt.id, backend = state.store.backend(), "Report submitted");
    Ok(Json(receipt))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = state
        .store
        .get_all()
        .await
        .map_err(|e| ApiError::storage("Failed to load reports", e))?;

    debug!("Listing {} reports", reports.len());
    Ok(Json(reports))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    match state.store.get_by_id(&id).await {
        Ok(Some(report)) => Ok(Json(report)),
        Ok(None) => {
            debug!("Report {} not found", id);
            Err(ApiError::NotFound)
        }
        Err(e) => Err(ApiError::storage("Failed to load report", e)),
    }
}
