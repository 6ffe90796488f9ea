//! Domain events and the sinks that receive them
//!
//! Events are published only after a change set has been committed, so a
//! sink never observes an operation that was rolled back. Sinks cannot fail
//! the operation; they log their own trouble.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{CustodianId, LedgerContext, LotId, LotStatus, SeedLevel, TransferRecord};
use uuid::Uuid;

/// Lifecycle notification emitted by the ledger engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: Uuid,
    pub lot_id: LotId,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    LotCreated {
        level: SeedLevel,
        parent_lot_id: Option<LotId>,
        quantity: Decimal,
        custodian_id: CustodianId,
    },
    LotTransferred {
        transfer: TransferRecord,
    },
    StatusChanged {
        from: LotStatus,
        to: LotStatus,
        notes: Option<String>,
    },
    MetadataUpdated {
        fields: Vec<String>,
    },
    LotDeleted {
        parent_lot_id: Option<LotId>,
        quantity_returned: Decimal,
    },
}

impl EventPayload {
    pub fn name(&self) -> &'static str {
        match self {
            EventPayload::LotCreated { .. } => "lot_created",
            EventPayload::LotTransferred { .. } => "lot_transferred",
            EventPayload::StatusChanged { .. } => "status_changed",
            EventPayload::MetadataUpdated { .. } => "metadata_updated",
            EventPayload::LotDeleted { .. } => "lot_deleted",
        }
    }
}

impl LedgerEvent {
    pub fn new(lot_id: LotId, ctx: &LedgerContext, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            lot_id,
            actor: ctx.actor.clone(),
            occurred_at: ctx.now,
            payload,
        }
    }
}

/// Receiver of ledger lifecycle notifications
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &LedgerEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn publish(&self, event: &LedgerEvent) {
        (**self).publish(event)
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &LedgerEvent) {}
}

/// Writes every event to the `tracing` pipeline
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &LedgerEvent) {
        tracing::info!(
            target: "seed_lot_ledger::events",
            event_id = %event.id,
            event = event.payload.name(),
            lot_id = %event.lot_id,
            actor = %event.actor,
            "ledger event"
        );
    }
}

/// Forwards each event to several sinks in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn publish(&self, event: &LedgerEvent) {
        for sink in &self.sinks {
            sink.publish(event);
        }
    }
}

// ============================================================================
// Audit trail
// ============================================================================

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub lot_id: LotId,
    pub at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub detail: serde_json::Value,
}

/// Append-only audit trail keyed by lot id and timestamp
#[derive(Debug, Default)]
pub struct AuditLog {
    // (lot, timestamp, append sequence) keeps same-instant entries in order
    entries: Mutex<BTreeMap<(LotId, DateTime<Utc>, u64), AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of one lot ordered by timestamp, oldest first; entries sharing
    /// an instant keep the order they were published in
    pub fn entries_for(&self, lot_id: &LotId) -> Vec<AuditEntry> {
        match self.entries.lock() {
            Ok(entries) => entries
                .iter()
                .filter(|((id, _, _), _)| id == lot_id)
                .map(|(_, entry)| entry.clone())
                .collect(),
            Err(_) => {
                tracing::error!("Audit log lock poisoned; returning no entries");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for AuditLog {
    fn publish(&self, event: &LedgerEvent) {
        let detail = match serde_json::to_value(&event.payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize audit detail for {}: {}", event.lot_id, e);
                serde_json::Value::Null
            }
        };
        let entry = AuditEntry {
            lot_id: event.lot_id.clone(),
            at: event.occurred_at,
            actor: event.actor.clone(),
            action: event.payload.name().to_string(),
            detail,
        };

        match self.entries.lock() {
            Ok(mut entries) => {
                let seq = entries.len() as u64;
                entries.insert((entry.lot_id.clone(), entry.at, seq), entry);
            }
            Err(_) => tracing::error!("Audit log lock poisoned; dropping {}", event.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx(hour: u32) -> LedgerContext {
        LedgerContext::new("auditor", Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0).unwrap())
    }

    fn status_event(lot: &str, hour: u32, to: LotStatus) -> LedgerEvent {
        LedgerEvent::new(
            LotId::from(lot),
            &ctx(hour),
            EventPayload::StatusChanged {
                from: LotStatus::Pending,
                to,
                notes: None,
            },
        )
    }

    #[test]
    fn test_audit_log_groups_by_lot_in_time_order() {
        let log = AuditLog::new();
        log.publish(&status_event("LOT-B", 9, LotStatus::Certified));
        log.publish(&status_event("LOT-A", 10, LotStatus::Rejected));
        log.publish(&status_event("LOT-A", 8, LotStatus::Certified));

        let entries = log.entries_for(&LotId::from("LOT-A"));
        assert_eq!(entries.len(), 2);
        assert!(entries[0].at < entries[1].at);
        assert_eq!(entries[0].action, "status_changed");
        assert_eq!(entries[1].detail["to"], "REJECTED");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_same_instant_entries_are_all_kept() {
        let log = AuditLog::new();
        log.publish(&status_event("LOT-A", 8, LotStatus::Certified));
        log.publish(&status_event("LOT-A", 8, LotStatus::Active));
        let entries = log.entries_for(&LotId::from("LOT-A"));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].detail["to"], "CERTIFIED");
        assert_eq!(entries[1].detail["to"], "ACTIVE");
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = Arc::new(AuditLog::new());
        let second = Arc::new(AuditLog::new());
        let fanout = FanoutSink::new()
            .with(first.clone())
            .with(second.clone())
            .with(Arc::new(NullSink));
        fanout.publish(&status_event("LOT-A", 8, LotStatus::Certified));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(fanout.len(), 3);
    }

    #[test]
    fn test_payload_serializes_with_type_tag() {
        let event = status_event("LOT-A", 8, LotStatus::Certified);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["payload"]["type"], "status_changed");
        assert_eq!(json["lot_id"], "LOT-A");
    }
}
