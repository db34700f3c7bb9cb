use thiserror::Error;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::DatabaseError(format!("JSON serialization error: {}", err))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(format!("Database error: {}", err))
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Verification authority unavailable: {0}")]
    ExternalUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LedgerError {
    pub fn not_owner(caller: &str) -> Self {
        Self::Unauthorized(format!("caller '{}' is not the ledger owner", caller))
    }

    pub fn record_not_found(record_id: u64, count: u64) -> Self {
        Self::NotFound(format!(
            "record {} does not exist (ledger holds {} records)",
            record_id, count
        ))
    }

    pub fn report_not_found(key: &str) -> Self {
        Self::NotFound(format!("no risk report for key '{}'", key))
    }

    pub fn duplicate_report(key: &str) -> Self {
        Self::Conflict(format!("a risk report already exists for key '{}'", key))
    }

    /// Short machine-readable kind, used in API responses and batch outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::ExternalUnavailable(_) => "external_unavailable",
            Self::Validation(_) => "validation",
            Self::DatabaseError(_) => "database",
            Self::ConfigError(_) => "config",
        }
    }
}
