//! Audit Record
//!
//! One immutable entry of the audit ledger: the outcome of an automated risk
//! judgment over a token pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Audit ledger entry, identified by its zero-based insertion index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub record_id: u64,
    pub token0: String,
    pub token1: String,
    /// Scaled price/volume change; negative values are drops.
    pub change_percentage: i64,
    pub analysis: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    pub token0: String,
    pub token1: String,
    pub change_percentage: i64,
    pub analysis: String,
}

impl NewAuditRecord {
    pub fn new(
        token0: impl Into<String>,
        token1: impl Into<String>,
        change_percentage: i64,
        analysis: impl Into<String>,
    ) -> Self {
        Self {
            token0: token0.into(),
            token1: token1.into(),
            change_percentage,
            analysis: analysis.into(),
        }
    }
}

impl AuditRecord {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let record_id: i64 = row.try_get("record_id")?;
        Ok(Self {
            record_id: record_id as u64,
            token0: row.try_get("token0")?,
            token1: row.try_get("token1")?,
            change_percentage: row.try_get("change_percentage")?,
            analysis: row.try_get("analysis")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn pair(&self) -> String {
        format!("{}/{}", self.token0, self.token1)
    }

    pub fn summary(&self) -> String {
        format!(
            "#{} {} ({:+}): {}",
            self.record_id,
            self.pair(),
            self.change_percentage,
            self.analysis
        )
    }
}
