//! Custody transfer records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{CustodianId, LotId};

/// How a transfer was materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferKind {
    /// The whole available quantity moved; the lot itself changed custodian
    Relocation,
    /// Part of the available quantity shipped out; the lot stayed put
    Split,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Relocation => "RELOCATION",
            TransferKind::Split => "SPLIT",
        }
    }
}

/// A shipment of seed from one custodian to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub lot_id: LotId,
    pub kind: TransferKind,
    pub from_custodian: CustodianId,
    pub to_custodian: CustodianId,
    pub quantity: Decimal,
    pub notes: Option<String>,
    pub transferred_at: DateTime<Utc>,
    pub transferred_by: String,
}

impl TransferRecord {
    /// Quantity this record holds outside its source lot
    pub fn quantity_outside_source(&self) -> Decimal {
        match self.kind {
            TransferKind::Split => self.quantity,
            TransferKind::Relocation => Decimal::ZERO,
        }
    }
}
