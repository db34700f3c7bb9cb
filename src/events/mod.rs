//! Change Notifications
//!
//! Every committed mutation of the ledger or registry is announced on the
//! event bus. Events are published after the write commits, in the order the
//! operation performs them. Each subscriber gets its own unbounded queue, so a
//! slow subscriber never loses events.

pub mod logger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

pub use logger::spawn_event_logger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AuditEvent {
    RecordAdded {
        record_id: u64,
        token0: String,
        token1: String,
        change_percentage: i64,
        created_at: DateTime<Utc>,
    },
    /// `new_owner` is `None` once ownership has been renounced.
    OwnershipTransferred {
        previous_owner: String,
        new_owner: Option<String>,
    },
    VerificationRequested {
        key: String,
        request_id: String,
    },
    ReportStored {
        key: String,
        risk_digest: String,
        recorded_at: DateTime<Utc>,
        verified: bool,
    },
    ReportVerified {
        key: String,
    },
}

impl AuditEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::RecordAdded { .. } => "RecordAdded",
            AuditEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
            AuditEvent::VerificationRequested { .. } => "VerificationRequested",
            AuditEvent::ReportStored { .. } => "ReportStored",
            AuditEvent::ReportVerified { .. } => "ReportVerified",
        }
    }
}

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<AuditEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AuditEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock_subscribers().push(sender);
        receiver
    }

    /// Publish an event to every live subscriber. Having none is not an error.
    pub fn publish(&self, event: AuditEvent) {
        self.lock_subscribers()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<AuditEvent>>> {
        // A poisoned list is still a valid list of senders.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(AuditEvent::ReportVerified { key: "0xabc".to_string() });
    }

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(AuditEvent::VerificationRequested {
            key: "0xabc".to_string(),
            request_id: "req-1".to_string(),
        });
        bus.publish(AuditEvent::ReportVerified { key: "0xabc".to_string() });

        assert_eq!(rx.recv().await.unwrap().name(), "VerificationRequested");
        assert_eq!(rx.recv().await.unwrap().name(), "ReportVerified");
    }

    #[test]
    fn test_slow_subscriber_receives_every_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        for i in 0..5000u64 {
            bus.publish(AuditEvent::RecordAdded {
                record_id: i,
                token0: "WETH".to_string(),
                token1: "USDC".to_string(),
                change_percentage: -2000,
                created_at: Utc::now(),
            });
        }

        for expected in 0..5000u64 {
            match rx.try_recv().unwrap() {
                AuditEvent::RecordAdded { record_id, .. } => assert_eq!(record_id, expected),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let _kept = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        bus.publish(AuditEvent::ReportVerified { key: "0xabc".to_string() });
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AuditEvent::ReportVerified { key: "0xabc".to_string() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ReportVerified");
        assert_eq!(json["data"]["key"], "0xabc");
    }
}
