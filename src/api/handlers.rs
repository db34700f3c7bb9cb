use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{AppState, CALLER_HEADER};
use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::LedgerError;
use crate::verification::{ReportSubmission, RiskReport, SubmissionOutcome};

#[derive(Debug, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner: String,
}

fn caller(headers: &HeaderMap) -> Result<&str, LedgerError> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LedgerError::Unauthorized(format!("missing {} header", CALLER_HEADER)))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "risk-ledger",
        "timestamp": chrono::Utc::now()
    }))
}

pub async fn record_count(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "count": state.ledger.count().await }))
}

pub async fn add_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(record): Json<NewAuditRecord>,
) -> Result<(StatusCode, Json<Value>), LedgerError> {
    let caller = caller(&headers)?;
    let record_id = state.ledger.add_record(caller, record).await?;
    Ok((StatusCode::CREATED, Json(json!({ "record_id": record_id }))))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<AuditRecord>, LedgerError> {
    let record_id: u64 = record_id.parse().map_err(|_| {
        LedgerError::Validation(format!("record id '{}' is not a non-negative integer", record_id))
    })?;
    Ok(Json(state.ledger.get_record(record_id).await?))
}

pub async fn get_owner(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "owner": state.ledger.owner().await }))
}

pub async fn transfer_ownership(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TransferOwnershipRequest>,
) -> Result<Json<Value>, LedgerError> {
    let caller = caller(&headers)?;
    state
        .ledger
        .transfer_ownership(caller, &request.new_owner)
        .await?;
    Ok(Json(json!({ "owner": request.new_owner })))
}

pub async fn renounce_ownership(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, LedgerError> {
    let caller = caller(&headers)?;
    state.ledger.renounce_ownership(caller).await?;
    Ok(Json(json!({ "owner": Value::Null })))
}

pub async fn submit_report(
    State(state): State<AppState>,
    Json(submission): Json<ReportSubmission>,
) -> Result<(StatusCode, Json<Value>), LedgerError> {
    let request_id = state
        .registry
        .submit_report(&submission.key, &submission.risk_digest)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "key": submission.key, "request_id": request_id })),
    ))
}

pub async fn submit_batch(
    State(state): State<AppState>,
    Json(submissions): Json<Vec<ReportSubmission>>,
) -> Json<Vec<SubmissionOutcome>> {
    Json(state.registry.submit_batch(&submissions).await)
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RiskReport>, LedgerError> {
    Ok(Json(state.registry.get_report(&key).await?))
}

pub async fn confirm_verification(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RiskReport>, LedgerError> {
    state.registry.confirm_verification(&key).await?;
    Ok(Json(state.registry.get_report(&key).await?))
}
