//! Verification Registry
//!
//! Hash-keyed risk reports with a two-state lifecycle per key:
//!
//! ```text
//! [no report] --submit_report--> Pending --confirm_verification--> Verified
//! ```
//!
//! Submission first asks the external authority to open a verification
//! request; the report is only stored once that call succeeds.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::database::Database;
use crate::error::LedgerError;
use crate::events::{AuditEvent, EventBus};
use crate::verification::authority::{AuthorityError, VerificationAuthority};
use crate::verification::report::{
    ReportSubmission, RiskReport, SubmissionOutcome, SubmissionResult,
};

pub struct VerificationRegistry {
    pool: SqlitePool,
    authority: Arc<dyn VerificationAuthority>,
    events: EventBus,
    request_timeout: Duration,
    write_lock: Mutex<()>,
}

impl VerificationRegistry {
    pub fn new(
        database: &Database,
        authority: Arc<dyn VerificationAuthority>,
        events: EventBus,
        request_timeout: Duration,
    ) -> Self {
        Self {
            pool: database.pool().clone(),
            authority,
            events,
            request_timeout,
            write_lock: Mutex::new(()),
        }
    }

    /// Submit a report for `key` and open a verification request for it.
    ///
    /// Rejected with `Conflict` if `key` already has a report, whatever its
    /// state. If the authority cannot be reached nothing is stored and the
    /// caller may resubmit.
    pub async fn submit_report(&self, key: &str, risk_digest: &str) -> Result<String, LedgerError> {
        if key.trim().is_empty() {
            return Err(LedgerError::Validation("report key must not be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;

        if self.find_report(key).await?.is_some() {
            warn!("Rejected duplicate report submission for {}", key);
            return Err(LedgerError::duplicate_report(key));
        }

        let request_id = self.request_verification(key).await?;

        let recorded_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO risk_reports (report_key, risk_digest, request_id, recorded_at, verified)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(key)
        .bind(risk_digest)
        .bind(&request_id)
        .bind(recorded_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // Another writer on the same database stored the key first.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                warn!("Report {} was stored concurrently by another writer", key);
                LedgerError::duplicate_report(key)
            }
            other => LedgerError::from(other),
        })?;

        info!("Stored risk report {} (verification request {})", key, request_id);

        self.events.publish(AuditEvent::VerificationRequested {
            key: key.to_string(),
            request_id: request_id.clone(),
        });
        self.events.publish(AuditEvent::ReportStored {
            key: key.to_string(),
            risk_digest: risk_digest.to_string(),
            recorded_at,
            verified: false,
        });

        Ok(request_id)
    }

    /// Mark the report for `key` as verified.
    ///
    /// Any caller may confirm. Confirming an already verified report leaves
    /// it unchanged.
    pub async fn confirm_verification(&self, key: &str) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;

        let report = self
            .find_report(key)
            .await?
            .ok_or_else(|| LedgerError::report_not_found(key))?;

        if report.verified {
            debug!("Report {} already verified", key);
            return Ok(());
        }

        sqlx::query("UPDATE risk_reports SET verified = 1 WHERE report_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        info!("Risk report {} verified", key);
        self.events.publish(AuditEvent::ReportVerified {
            key: key.to_string(),
        });
        Ok(())
    }

    pub async fn get_report(&self, key: &str) -> Result<RiskReport, LedgerError> {
        self.find_report(key)
            .await?
            .ok_or_else(|| LedgerError::report_not_found(key))
    }

    /// Submit several reports in order. A failed entry does not stop the rest.
    pub async fn submit_batch(&self, submissions: &[ReportSubmission]) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let result = match self.submit_report(&submission.key, &submission.risk_digest).await {
                Ok(request_id) => SubmissionResult::Submitted { request_id },
                Err(e) => {
                    warn!("Batch submission of {} failed: {}", submission.key, e);
                    SubmissionResult::Failed {
                        kind: e.kind().to_string(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(SubmissionOutcome {
                key: submission.key.clone(),
                result,
            });
        }

        let submitted = outcomes.iter().filter(|o| o.is_submitted()).count();
        info!("Batch submission: {}/{} reports submitted", submitted, outcomes.len());
        outcomes
    }

    async fn request_verification(&self, key: &str) -> Result<String, LedgerError> {
        let outcome =
            tokio::time::timeout(self.request_timeout, self.authority.request_verification(key))
                .await
                .unwrap_or(Err(AuthorityError::Timeout(self.request_timeout)));

        outcome.map_err(|e| {
            error!(
                "Verification authority {} failed for {}: {}",
                self.authority.describe(),
                key,
                e
            );
            LedgerError::ExternalUnavailable(e.to_string())
        })
    }

    async fn find_report(&self, key: &str) -> Result<Option<RiskReport>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT report_key, risk_digest, request_id, recorded_at, verified
            FROM risk_reports
            WHERE report_key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(RiskReport::from_row).transpose()?)
    }
}
