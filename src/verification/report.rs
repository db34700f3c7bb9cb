use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Hash-keyed risk report awaiting (or holding) external confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub key: String,
    pub risk_digest: String,
    /// Handle issued by the verification authority at submission time.
    pub request_id: String,
    pub recorded_at: DateTime<Utc>,
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Verified,
}

impl RiskReport {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("report_key")?,
            risk_digest: row.try_get("risk_digest")?,
            request_id: row.try_get("request_id")?,
            recorded_at: row.try_get("recorded_at")?,
            verified: row.try_get("verified")?,
        })
    }

    pub fn status(&self) -> ReportStatus {
        if self.verified {
            ReportStatus::Verified
        } else {
            ReportStatus::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub key: String,
    pub risk_digest: String,
}

impl ReportSubmission {
    pub fn new(key: impl Into<String>, risk_digest: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            risk_digest: risk_digest.into(),
        }
    }
}

/// Per-entry result of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub key: String,
    #[serde(flatten)]
    pub result: SubmissionResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    Submitted { request_id: String },
    Failed { kind: String, error: String },
}

impl SubmissionOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self.result, SubmissionResult::Submitted { .. })
    }
}
