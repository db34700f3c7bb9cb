#![allow(dead_code)]

use async_trait::async_trait;
use risk_ledger::audit::AuditLedger;
use risk_ledger::database::Database;
use risk_ledger::events::{AuditEvent, EventBus};
use risk_ledger::verification::{AuthorityError, VerificationAuthority, VerificationRegistry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const OWNER: &str = "auditor";

/// Deterministic authority for tests: numbered request ids, switchable failure.
#[derive(Default)]
pub struct ScriptedAuthority {
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationAuthority for ScriptedAuthority {
    async fn request_verification(&self, _key: &str) -> Result<String, AuthorityError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthorityError::Status {
                status: 502,
                body: "authority offline".to_string(),
            });
        }
        Ok(format!("req-{}", n))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub async fn setup_ledger() -> (AuditLedger, mpsc::UnboundedReceiver<AuditEvent>) {
    let db = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    let events = EventBus::new();
    let rx = events.subscribe();
    let ledger = AuditLedger::open(&db, events, OWNER)
        .await
        .expect("Failed to open ledger");
    (ledger, rx)
}

pub async fn setup_registry(
    authority: Arc<ScriptedAuthority>,
    timeout: Duration,
) -> (VerificationRegistry, mpsc::UnboundedReceiver<AuditEvent>) {
    let db = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    let events = EventBus::new();
    let rx = events.subscribe();
    let registry = VerificationRegistry::new(&db, authority, events, timeout);
    (registry, rx)
}

/// Everything published so far, without waiting.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<AuditEvent>) -> Vec<AuditEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
