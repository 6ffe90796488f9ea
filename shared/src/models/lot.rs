//! Lot record and lineage helpers

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LotStatus, SeedLevel};
use crate::types::{CustodianId, LotId, VarietyId};

/// A seed lot tracked through the certification generations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub variety_id: VarietyId,
    pub level: SeedLevel,
    /// Quantity recorded when the lot was produced (kg)
    pub quantity_total: Decimal,
    /// Quantity not yet consumed by derivations or split transfers (kg)
    pub quantity_available: Decimal,
    pub status: LotStatus,
    pub parent_lot_id: Option<LotId>,
    pub custodian_id: CustodianId,
    pub production_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
    /// Optimistic concurrency counter, bumped on every committed write
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

impl Lot {
    pub fn is_root(&self) -> bool {
        self.parent_lot_id.is_none()
    }

    /// Quantity already consumed by children or shipped out
    pub fn quantity_consumed(&self) -> Decimal {
        self.quantity_total - self.quantity_available
    }

    /// Structural invariants every committed lot must satisfy
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if self.quantity_available < Decimal::ZERO {
            return Err("Available quantity cannot be negative");
        }
        if self.quantity_available > self.quantity_total {
            return Err("Available quantity cannot exceed total quantity");
        }
        if self.level.is_root() != self.parent_lot_id.is_none() {
            return Err("Only GO lots may be without a parent");
        }
        if let Some(expiry) = self.expiry_date {
            if expiry <= self.production_date {
                return Err("Expiry date must be after production date");
            }
        }
        Ok(())
    }
}

/// Filter for listing lots; every `Some` field must match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotFilter {
    pub variety_id: Option<VarietyId>,
    pub level: Option<SeedLevel>,
    pub status: Option<LotStatus>,
    pub custodian_id: Option<CustodianId>,
    pub parent_lot_id: Option<LotId>,
}

impl LotFilter {
    /// Direct children of `parent`
    pub fn children_of(parent: &LotId) -> Self {
        Self {
            parent_lot_id: Some(parent.clone()),
            ..Self::default()
        }
    }

    pub fn matches(&self, lot: &Lot) -> bool {
        self.variety_id.as_ref().map_or(true, |v| *v == lot.variety_id)
            && self.level.map_or(true, |l| l == lot.level)
            && self.status.map_or(true, |s| s == lot.status)
            && self
                .custodian_id
                .as_ref()
                .map_or(true, |c| *c == lot.custodian_id)
            && self
                .parent_lot_id
                .as_ref()
                .map_or(true, |p| lot.parent_lot_id.as_ref() == Some(p))
    }
}

/// Generate a lot code: PREFIX-YYYY-VARIETY-LEVEL-NNNN
pub fn generate_lot_code(
    prefix: &str,
    year: i32,
    variety_code: &str,
    level: SeedLevel,
    sequence: u32,
) -> LotId {
    LotId::new(format!(
        "{}-{}-{}-{}-{:04}",
        prefix.to_uppercase(),
        year,
        variety_code.to_uppercase(),
        level,
        sequence
    ))
}
