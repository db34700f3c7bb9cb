//! Audit Ledger
//!
//! Owner-gated, append-only store of audit records. Records are addressed by
//! their zero-based insertion index and are never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::audit::ownership::Ownership;
use crate::audit::record::{AuditRecord, NewAuditRecord};
use crate::database::Database;
use crate::error::LedgerError;
use crate::events::{AuditEvent, EventBus};

pub struct AuditLedger {
    pool: SqlitePool,
    events: EventBus,
    state: Mutex<LedgerState>,
}

struct LedgerState {
    ownership: Ownership,
    count: u64,
    last_created_at: Option<DateTime<Utc>>,
}

impl AuditLedger {
    /// Open the ledger stored in `database` for writing.
    ///
    /// `initial_owner` only applies to a fresh database; once an owner row
    /// exists (including a renounced one) the stored value is authoritative.
    pub async fn open(
        database: &Database,
        events: EventBus,
        initial_owner: &str,
    ) -> Result<Self, LedgerError> {
        let pool = database.pool().clone();

        let ownership = match Self::stored_ownership(&pool).await? {
            Some(ownership) => ownership,
            None => {
                if initial_owner.trim().is_empty() {
                    return Err(LedgerError::Validation(
                        "initial ledger owner must not be empty".to_string(),
                    ));
                }
                sqlx::query("INSERT INTO ledger_owner (id, owner) VALUES (1, ?)")
                    .bind(initial_owner)
                    .execute(&pool)
                    .await?;
                Ownership::new(initial_owner)
            }
        };

        Self::load(pool, events, ownership).await
    }

    /// Open the ledger for inspection without claiming ownership.
    ///
    /// A fresh database is left unowned so a later `open` can still seed the
    /// configured owner. No caller is authorized to write through this handle
    /// until an owner has been stored.
    pub async fn open_read_only(
        database: &Database,
        events: EventBus,
    ) -> Result<Self, LedgerError> {
        let pool = database.pool().clone();
        let ownership = Self::stored_ownership(&pool)
            .await?
            .unwrap_or_else(|| Ownership::from_stored(None));
        Self::load(pool, events, ownership).await
    }

    async fn stored_ownership(pool: &SqlitePool) -> Result<Option<Ownership>, LedgerError> {
        let stored: Option<Option<String>> =
            sqlx::query_scalar("SELECT owner FROM ledger_owner WHERE id = 1")
                .fetch_optional(pool)
                .await?;
        Ok(stored.map(Ownership::from_stored))
    }

    async fn load(
        pool: SqlitePool,
        events: EventBus,
        ownership: Ownership,
    ) -> Result<Self, LedgerError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_records")
            .fetch_one(&pool)
            .await?;

        let last_created_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT created_at FROM audit_records ORDER BY record_id DESC LIMIT 1",
        )
        .fetch_optional(&pool)
        .await?;

        if ownership.is_renounced() {
            info!("Opened audit ledger with {} records (no owner, read-only)", count);
        } else {
            info!(
                "Opened audit ledger with {} records (owner: {})",
                count,
                ownership.owner().unwrap_or_default()
            );
        }

        Ok(Self {
            pool,
            events,
            state: Mutex::new(LedgerState {
                ownership,
                count: count as u64,
                last_created_at,
            }),
        })
    }

    /// Append a record. Only the current owner may write.
    pub async fn add_record(
        &self,
        caller: &str,
        record: NewAuditRecord,
    ) -> Result<u64, LedgerError> {
        let mut state = self.state.lock().await;

        if let Err(e) = state.ownership.authorize(caller) {
            warn!("Rejected audit record from {}: not the owner", caller);
            return Err(e);
        }

        let record_id = state.count;
        // Keep timestamps non-decreasing even if the wall clock steps back.
        let now = Utc::now();
        let created_at = match state.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };

        sqlx::query(
            r#"
            INSERT INTO audit_records
            (record_id, token0, token1, change_percentage, analysis, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record_id as i64)
        .bind(&record.token0)
        .bind(&record.token1)
        .bind(record.change_percentage)
        .bind(&record.analysis)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        state.count += 1;
        state.last_created_at = Some(created_at);

        info!(
            "Recorded audit #{} for {}/{} ({:+})",
            record_id, record.token0, record.token1, record.change_percentage
        );

        self.events.publish(AuditEvent::RecordAdded {
            record_id,
            token0: record.token0,
            token1: record.token1,
            change_percentage: record.change_percentage,
            created_at,
        });

        Ok(record_id)
    }

    pub async fn get_record(&self, record_id: u64) -> Result<AuditRecord, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT record_id, token0, token1, change_percentage, analysis, created_at
            FROM audit_records
            WHERE record_id = ?
            "#,
        )
        .bind(record_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let record = AuditRecord::from_row(&row)?;
                debug!("Read audit record {}", record.summary());
                Ok(record)
            }
            None => Err(LedgerError::record_not_found(record_id, self.count().await)),
        }
    }

    pub async fn count(&self) -> u64 {
        self.state.lock().await.count
    }

    pub async fn owner(&self) -> Option<String> {
        self.state.lock().await.ownership.owner().map(str::to_string)
    }

    pub async fn transfer_ownership(
        &self,
        caller: &str,
        new_owner: &str,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;

        let mut next = state.ownership.clone();
        let previous_owner = next.transfer(caller, new_owner)?;
        self.store_owner(&next).await?;
        state.ownership = next;

        info!("Ledger ownership transferred from {} to {}", previous_owner, new_owner);
        self.events.publish(AuditEvent::OwnershipTransferred {
            previous_owner,
            new_owner: Some(new_owner.to_string()),
        });
        Ok(())
    }

    /// Give up write privilege. After this no caller can append records.
    pub async fn renounce_ownership(&self, caller: &str) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;

        let mut next = state.ownership.clone();
        let previous_owner = next.renounce(caller)?;
        self.store_owner(&next).await?;
        state.ownership = next;

        warn!("Ledger ownership renounced by {}", previous_owner);
        self.events.publish(AuditEvent::OwnershipTransferred {
            previous_owner,
            new_owner: None,
        });
        Ok(())
    }

    async fn store_owner(&self, ownership: &Ownership) -> Result<(), LedgerError> {
        sqlx::query("UPDATE ledger_owner SET owner = ? WHERE id = 1")
            .bind(ownership.owner())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
