//! HTTP API
//!
//! JSON endpoints over the audit ledger and verification registry. The
//! calling identity is taken from the `x-caller-id` header.

pub mod handlers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::audit::AuditLedger;
use crate::error::LedgerError;
use crate::verification::VerificationRegistry;

pub const CALLER_HEADER: &str = "x-caller-id";

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<AuditLedger>,
    pub registry: Arc<VerificationRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/records",
            get(handlers::record_count).post(handlers::add_record),
        )
        .route("/records/:record_id", get(handlers::get_record))
        .route("/ledger/owner", get(handlers::get_owner))
        .route("/ledger/owner/transfer", post(handlers::transfer_ownership))
        .route("/ledger/owner/renounce", post(handlers::renounce_ownership))
        .route("/reports", post(handlers::submit_report))
        .route("/reports/batch", post(handlers::submit_batch))
        .route("/reports/:key", get(handlers::get_report))
        .route("/reports/:key/confirm", post(handlers::confirm_verification))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Unauthorized(_) => StatusCode::FORBIDDEN,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::ExternalUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::DatabaseError(_) | LedgerError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
