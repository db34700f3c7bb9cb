//! Audit Ledger
//!
//! Append-only, owner-gated record of automated risk judgments over token
//! pairs.

pub mod ledger;
pub mod ownership;
pub mod record;

pub use ledger::AuditLedger;
pub use ownership::Ownership;
pub use record::{AuditRecord, NewAuditRecord};
