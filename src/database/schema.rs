// SQL schema for the ledger and registry tables.
// Statements are idempotent so migrations can run on every startup.

pub const AUDIT_RECORDS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS audit_records (
    record_id INTEGER PRIMARY KEY,
    token0 TEXT NOT NULL,
    token1 TEXT NOT NULL,
    change_percentage INTEGER NOT NULL,
    analysis TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

pub const LEDGER_OWNER_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_owner (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    owner TEXT
)
"#;

pub const RISK_REPORTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS risk_reports (
    report_key TEXT PRIMARY KEY NOT NULL,
    risk_digest TEXT NOT NULL,
    request_id TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    verified INTEGER NOT NULL DEFAULT 0
)
"#;

pub const ALL: &[&str] = &[
    AUDIT_RECORDS_SCHEMA,
    LEDGER_OWNER_SCHEMA,
    RISK_REPORTS_SCHEMA,
];
