//! Event Logger
//!
//! Subscribes to the event bus and writes every notification to the log.
//! Large adverse moves are logged at warn level so they stand out as alerts.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{AuditEvent, EventBus};

/// Absolute change at or above which a recorded audit is logged as an alert.
pub const ALERT_CHANGE_THRESHOLD: i64 = 2000;

pub fn spawn_event_logger(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_event(&event);
        }
    })
}

pub fn is_alert(event: &AuditEvent) -> bool {
    matches!(
        event,
        AuditEvent::RecordAdded { change_percentage, .. }
            if change_percentage.abs() >= ALERT_CHANGE_THRESHOLD
    )
}

fn log_event(event: &AuditEvent) {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event));
    if is_alert(event) {
        warn!(event = event.name(), "Risk alert: {}", payload);
    } else {
        info!(event = event.name(), "{}", payload);
    }
}
