//! Ledger engine: lot creation, derivation, transfer and status changes
//!
//! This is the only code that mutates a lot's quantity, lineage, custodian
//! or status. Every operation follows the same shape: validate the input,
//! read current state, check business rules, build one [`ChangeSet`], commit
//! it atomically, then publish events. A failure at any step leaves the store
//! untouched.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    has_sufficient_quantity, validate_expiry_date, validate_lot_code, validate_production_date,
    validate_quantity, validate_reference, CustodianId, LedgerContext, Lot, LotFilter, LotId,
    LotStatus, SeedLevel, TransferKind, TransferRecord, VarietyId,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::LedgerSettings;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventPayload, EventSink, LedgerEvent};
use crate::services::genealogy::GenealogyService;
use crate::store::{ChangeSet, LotStore};

/// Ledger service owning every quantity-, lineage- and status-affecting write
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LotStore>,
    events: Arc<dyn EventSink>,
    settings: LedgerSettings,
}

/// Input for registering a new origin (GO) lot
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRootLotInput {
    pub lot_id: LotId,
    pub variety_id: VarietyId,
    pub quantity: Decimal,
    pub custodian_id: CustodianId,
    pub production_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub batch_number: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Input for deriving the next generation from a parent lot
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDerivedLotInput {
    pub lot_id: LotId,
    pub parent_lot_id: LotId,
    pub level: SeedLevel,
    pub quantity: Decimal,
    pub custodian_id: CustodianId,
    pub production_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub batch_number: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Input for shipping some or all of a lot to another custodian
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransferInput {
    pub lot_id: LotId,
    pub target_custodian: CustodianId,
    pub quantity: Decimal,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Input for moving a lot along the certification status machine
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeStatusInput {
    pub lot_id: LotId,
    pub status: LotStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Input for editing metadata; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLotMetadataInput {
    pub lot_id: LotId,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub batch_number: Option<String>,
}

/// Result of a transfer: the source lot after the move and the record written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    pub lot: Lot,
    pub transfer: TransferRecord,
}

/// Where a lot's recorded quantity currently sits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityBalance {
    pub lot_id: LotId,
    pub quantity_total: Decimal,
    pub quantity_available: Decimal,
    /// Sum of `quantity_total` of surviving direct children
    pub derived_to_children: Decimal,
    /// Sum of split shipments sent to other custodians
    pub shipped_out: Decimal,
}

impl QuantityBalance {
    /// Total equals what is left plus what went to children and shipments
    pub fn is_conserved(&self) -> bool {
        self.quantity_total == self.quantity_available + self.derived_to_children + self.shipped_out
    }
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(
        store: Arc<dyn LotStore>,
        events: Arc<dyn EventSink>,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            store,
            events,
            settings,
        }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Genealogy resolver over the same store
    pub fn genealogy(&self) -> GenealogyService {
        GenealogyService::new(self.store.clone())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get a lot by its code
    pub fn get_lot(&self, lot_id: &LotId) -> LedgerResult<Lot> {
        self.load(lot_id)
    }

    /// List lots matching a filter
    pub fn list_lots(&self, filter: &LotFilter) -> LedgerResult<Vec<Lot>> {
        Ok(self.store.query(filter)?)
    }

    /// Transfer records of a lot, oldest first
    pub fn transfers_of(&self, lot_id: &LotId) -> LedgerResult<Vec<TransferRecord>> {
        self.load(lot_id)?;
        Ok(self.store.transfers_of(lot_id)?)
    }

    /// Account for every kilogram recorded on a lot
    pub fn balance_of(&self, lot_id: &LotId) -> LedgerResult<QuantityBalance> {
        let lot = self.load(lot_id)?;
        let derived_to_children = self
            .store
            .query(&LotFilter::children_of(lot_id))?
            .iter()
            .map(|child| child.quantity_total)
            .sum();
        let shipped_out = self
            .store
            .transfers_of(lot_id)?
            .iter()
            .map(TransferRecord::quantity_outside_source)
            .sum();

        Ok(QuantityBalance {
            lot_id: lot.id,
            quantity_total: lot.quantity_total,
            quantity_available: lot.quantity_available,
            derived_to_children,
            shipped_out,
        })
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Register a new origin lot (level GO, no parent, PENDING)
    pub fn create_root_lot(&self, input: CreateRootLotInput, ctx: &LedgerContext) -> LedgerResult<Lot> {
        finish("create_root_lot", self.apply_create_root(input, ctx))
    }

    fn apply_create_root(&self, input: CreateRootLotInput, ctx: &LedgerContext) -> LedgerResult<Lot> {
        input.validate()?;
        self.check_identity(&input.lot_id)?;
        validate_reference(input.variety_id.as_str())
            .map_err(|m| LedgerError::validation("variety_id", m))?;
        validate_reference(input.custodian_id.as_str())
            .map_err(|m| LedgerError::validation("custodian_id", m))?;
        self.check_quantity("quantity", input.quantity)?;
        check_dates(input.production_date, input.expiry_date, ctx)?;

        self.ensure_absent(&input.lot_id)?;

        let lot = Lot {
            id: input.lot_id,
            variety_id: input.variety_id,
            level: SeedLevel::Go,
            quantity_total: input.quantity,
            quantity_available: input.quantity,
            status: LotStatus::Pending,
            parent_lot_id: None,
            custodian_id: input.custodian_id,
            production_date: input.production_date,
            expiry_date: input.expiry_date,
            batch_number: input.batch_number,
            notes: input.notes,
            version: 1,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by: ctx.actor.clone(),
            updated_by: ctx.actor.clone(),
        };

        self.store.commit(ChangeSet::new().insert(lot.clone()))?;

        tracing::info!(
            lot_id = %lot.id,
            variety_id = %lot.variety_id,
            quantity = %lot.quantity_total,
            actor = %ctx.actor,
            "Root lot created"
        );
        self.publish(LedgerEvent::new(
            lot.id.clone(),
            ctx,
            EventPayload::LotCreated {
                level: lot.level,
                parent_lot_id: None,
                quantity: lot.quantity_total,
                custodian_id: lot.custodian_id.clone(),
            },
        ));

        Ok(lot)
    }

    /// Derive the next generation from a certified parent, debiting the parent
    pub fn create_derived_lot(
        &self,
        input: CreateDerivedLotInput,
        ctx: &LedgerContext,
    ) -> LedgerResult<Lot> {
        finish("create_derived_lot", self.apply_create_derived(input, ctx))
    }

    fn apply_create_derived(
        &self,
        input: CreateDerivedLotInput,
        ctx: &LedgerContext,
    ) -> LedgerResult<Lot> {
        input.validate()?;
        self.check_identity(&input.lot_id)?;
        validate_reference(input.custodian_id.as_str())
            .map_err(|m| LedgerError::validation("custodian_id", m))?;
        if input.level.is_root() {
            return Err(LedgerError::validation(
                "level",
                "GO lots are created as roots, not derived",
            ));
        }
        self.check_quantity("quantity", input.quantity)?;
        check_dates(input.production_date, input.expiry_date, ctx)?;

        let parent = self.load(&input.parent_lot_id)?;

        if !parent.status.can_seed_derivation() {
            return Err(LedgerError::ParentNotEligible {
                parent_id: parent.id,
                status: parent.status,
            });
        }
        if parent.level.successor() != Some(input.level) {
            return Err(LedgerError::InvalidLevelSequence {
                parent_level: parent.level,
                requested: input.level,
            });
        }
        if !has_sufficient_quantity(input.quantity, parent.quantity_available) {
            return Err(LedgerError::InsufficientQuantity {
                lot_id: parent.id,
                requested: input.quantity,
                available: parent.quantity_available,
            });
        }
        self.ensure_absent(&input.lot_id)?;

        let parent_version = parent.version;
        let mut debited_parent = parent;
        debited_parent.quantity_available -= input.quantity;
        touch(&mut debited_parent, ctx);

        let child = Lot {
            id: input.lot_id,
            variety_id: debited_parent.variety_id.clone(),
            level: input.level,
            quantity_total: input.quantity,
            quantity_available: input.quantity,
            status: LotStatus::Pending,
            parent_lot_id: Some(debited_parent.id.clone()),
            custodian_id: input.custodian_id,
            production_date: input.production_date,
            expiry_date: input.expiry_date,
            batch_number: input.batch_number,
            notes: input.notes,
            version: 1,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by: ctx.actor.clone(),
            updated_by: ctx.actor.clone(),
        };

        // Parent debit and child insert land together or not at all
        self.store.commit(
            ChangeSet::new()
                .update(debited_parent.clone(), parent_version)
                .insert(child.clone()),
        )?;

        tracing::info!(
            lot_id = %child.id,
            parent_lot_id = %debited_parent.id,
            level = %child.level,
            quantity = %child.quantity_total,
            parent_available = %debited_parent.quantity_available,
            actor = %ctx.actor,
            "Derived lot created"
        );
        self.publish(LedgerEvent::new(
            child.id.clone(),
            ctx,
            EventPayload::LotCreated {
                level: child.level,
                parent_lot_id: child.parent_lot_id.clone(),
                quantity: child.quantity_total,
                custodian_id: child.custodian_id.clone(),
            },
        ));

        Ok(child)
    }

    // ========================================================================
    // Transfer
    // ========================================================================

    /// Ship `quantity` of a lot to another custodian.
    ///
    /// Shipping everything that is available relocates the lot itself.
    /// Shipping less leaves the lot with the origin custodian, debits its
    /// availability and records a split shipment carrying the difference.
    pub fn transfer(&self, input: TransferInput, ctx: &LedgerContext) -> LedgerResult<TransferReceipt> {
        finish("transfer", self.apply_transfer(input, ctx))
    }

    fn apply_transfer(&self, input: TransferInput, ctx: &LedgerContext) -> LedgerResult<TransferReceipt> {
        input.validate()?;
        validate_reference(input.target_custodian.as_str())
            .map_err(|m| LedgerError::validation("target_custodian", m))?;
        self.check_quantity("quantity", input.quantity)?;

        let lot = self.load(&input.lot_id)?;

        if lot.status.is_terminal() {
            return Err(LedgerError::LotClosed {
                lot_id: lot.id,
                status: lot.status,
            });
        }
        if lot.custodian_id == input.target_custodian {
            return Err(LedgerError::NoOpTransfer {
                lot_id: lot.id,
                custodian: input.target_custodian.to_string(),
            });
        }
        if !has_sufficient_quantity(input.quantity, lot.quantity_available) {
            return Err(LedgerError::InsufficientQuantity {
                lot_id: lot.id,
                requested: input.quantity,
                available: lot.quantity_available,
            });
        }

        let expected_version = lot.version;
        let from_custodian = lot.custodian_id.clone();
        let mut moved = lot;
        let kind = if input.quantity == moved.quantity_available {
            moved.custodian_id = input.target_custodian.clone();
            TransferKind::Relocation
        } else {
            moved.quantity_available -= input.quantity;
            TransferKind::Split
        };
        touch(&mut moved, ctx);

        let transfer = TransferRecord {
            id: Uuid::new_v4(),
            lot_id: moved.id.clone(),
            kind,
            from_custodian,
            to_custodian: input.target_custodian,
            quantity: input.quantity,
            notes: input.notes,
            transferred_at: ctx.now,
            transferred_by: ctx.actor.clone(),
        };

        self.store.commit(
            ChangeSet::new()
                .update(moved.clone(), expected_version)
                .record_transfer(transfer.clone()),
        )?;

        tracing::info!(
            lot_id = %moved.id,
            kind = transfer.kind.as_str(),
            from = %transfer.from_custodian,
            to = %transfer.to_custodian,
            quantity = %transfer.quantity,
            remaining = %moved.quantity_available,
            actor = %ctx.actor,
            "Lot transferred"
        );
        self.publish(LedgerEvent::new(
            moved.id.clone(),
            ctx,
            EventPayload::LotTransferred {
                transfer: transfer.clone(),
            },
        ));

        Ok(TransferReceipt {
            lot: moved,
            transfer,
        })
    }

    // ========================================================================
    // Status and metadata
    // ========================================================================

    /// Move a lot along the certification status machine
    pub fn change_status(&self, input: ChangeStatusInput, ctx: &LedgerContext) -> LedgerResult<Lot> {
        finish("change_status", self.apply_change_status(input, ctx))
    }

    fn apply_change_status(&self, input: ChangeStatusInput, ctx: &LedgerContext) -> LedgerResult<Lot> {
        input.validate()?;
        let lot = self.load(&input.lot_id)?;

        let from = lot.status;
        if !from.can_transition_to(input.status) {
            return Err(LedgerError::InvalidStatusTransition {
                from,
                to: input.status,
            });
        }

        let expected_version = lot.version;
        let mut updated = lot;
        updated.status = input.status;
        touch(&mut updated, ctx);

        self.store
            .commit(ChangeSet::new().update(updated.clone(), expected_version))?;

        tracing::info!(
            lot_id = %updated.id,
            from = %from,
            to = %updated.status,
            actor = %ctx.actor,
            "Lot status changed"
        );
        self.publish(LedgerEvent::new(
            updated.id.clone(),
            ctx,
            EventPayload::StatusChanged {
                from,
                to: updated.status,
                notes: input.notes,
            },
        ));

        Ok(updated)
    }

    /// Edit notes, expiry date or batch number; legal in every status
    pub fn update_metadata(
        &self,
        input: UpdateLotMetadataInput,
        ctx: &LedgerContext,
    ) -> LedgerResult<Lot> {
        finish("update_metadata", self.apply_update_metadata(input, ctx))
    }

    fn apply_update_metadata(
        &self,
        input: UpdateLotMetadataInput,
        ctx: &LedgerContext,
    ) -> LedgerResult<Lot> {
        input.validate()?;
        if input.notes.is_none() && input.expiry_date.is_none() && input.batch_number.is_none() {
            return Err(LedgerError::validation("input", "no metadata fields to update"));
        }

        let lot = self.load(&input.lot_id)?;
        validate_expiry_date(lot.production_date, input.expiry_date.or(lot.expiry_date))
            .map_err(|m| LedgerError::date("expiry_date", m))?;

        let expected_version = lot.version;
        let mut updated = lot;
        let mut fields = Vec::new();
        if let Some(notes) = input.notes {
            updated.notes = Some(notes);
            fields.push("notes".to_string());
        }
        if let Some(expiry) = input.expiry_date {
            updated.expiry_date = Some(expiry);
            fields.push("expiry_date".to_string());
        }
        if let Some(batch) = input.batch_number {
            updated.batch_number = Some(batch);
            fields.push("batch_number".to_string());
        }
        touch(&mut updated, ctx);

        self.store
            .commit(ChangeSet::new().update(updated.clone(), expected_version))?;

        tracing::info!(lot_id = %updated.id, fields = ?fields, actor = %ctx.actor, "Lot metadata updated");
        self.publish(LedgerEvent::new(
            updated.id.clone(),
            ctx,
            EventPayload::MetadataUpdated { fields },
        ));

        Ok(updated)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete a pending leaf lot, returning its quantity to the parent.
    ///
    /// Lots with children or any recorded shipment are never deleted, and
    /// a closed parent cannot take quantity back.
    pub fn delete_lot(&self, lot_id: &LotId, ctx: &LedgerContext) -> LedgerResult<Lot> {
        finish("delete_lot", self.apply_delete(lot_id, ctx))
    }

    fn apply_delete(&self, lot_id: &LotId, ctx: &LedgerContext) -> LedgerResult<Lot> {
        let lot = self.load(lot_id)?;

        if lot.status != LotStatus::Pending {
            return Err(LedgerError::NotDeletable {
                lot_id: lot.id,
                status: lot.status,
            });
        }

        // Any shipment, relocations included, pins the lot so its transfer
        // history never outlives it.
        let children = self.store.query(&LotFilter::children_of(lot_id))?;
        let shipments = self.store.transfers_of(lot_id)?.len();
        if !children.is_empty() || shipments > 0 {
            return Err(LedgerError::HasDescendants {
                lot_id: lot.id,
                dependents: children.len() + shipments,
            });
        }

        let mut changes = ChangeSet::new().delete(lot.id.clone(), lot.version);
        let mut quantity_returned = Decimal::ZERO;

        if let Some(parent_id) = &lot.parent_lot_id {
            let parent = self
                .store
                .get(parent_id)?
                .ok_or_else(|| LedgerError::BrokenLineage {
                    lot_id: lot.id.clone(),
                    reason: format!("parent {} does not exist", parent_id),
                })?;

            if parent.status.is_terminal() {
                return Err(LedgerError::LotClosed {
                    lot_id: parent.id,
                    status: parent.status,
                });
            }

            let parent_version = parent.version;
            let mut credited = parent;
            credited.quantity_available += lot.quantity_total;
            if credited.quantity_available > credited.quantity_total {
                return Err(LedgerError::BrokenLineage {
                    lot_id: lot.id.clone(),
                    reason: format!(
                        "returning {} would exceed the recorded total of {}",
                        lot.quantity_total, credited.id
                    ),
                });
            }
            touch(&mut credited, ctx);
            quantity_returned = lot.quantity_total;
            changes = changes.update(credited, parent_version);
        }

        self.store.commit(changes)?;

        tracing::info!(
            lot_id = %lot.id,
            quantity_returned = %quantity_returned,
            actor = %ctx.actor,
            "Lot deleted"
        );
        self.publish(LedgerEvent::new(
            lot.id.clone(),
            ctx,
            EventPayload::LotDeleted {
                parent_lot_id: lot.parent_lot_id.clone(),
                quantity_returned,
            },
        ));

        Ok(lot)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn load(&self, lot_id: &LotId) -> LedgerResult<Lot> {
        self.store
            .get(lot_id)?
            .ok_or_else(|| LedgerError::LotNotFound(lot_id.clone()))
    }

    fn ensure_absent(&self, lot_id: &LotId) -> LedgerResult<()> {
        if self.store.get(lot_id)?.is_some() {
            return Err(LedgerError::DuplicateLot(lot_id.clone()));
        }
        Ok(())
    }

    fn check_identity(&self, lot_id: &LotId) -> LedgerResult<()> {
        validate_lot_code(lot_id.as_str()).map_err(|m| LedgerError::validation("lot_id", m))
    }

    fn check_quantity(&self, field: &str, quantity: Decimal) -> LedgerResult<()> {
        validate_quantity(quantity, self.settings.quantity_scale)
            .map_err(|m| LedgerError::quantity(field, m))
    }

    fn publish(&self, event: LedgerEvent) {
        self.events.publish(&event);
    }
}

fn check_dates(
    production: NaiveDate,
    expiry: Option<NaiveDate>,
    ctx: &LedgerContext,
) -> LedgerResult<()> {
    validate_production_date(production, ctx.today())
        .map_err(|m| LedgerError::date("production_date", m))?;
    validate_expiry_date(production, expiry).map_err(|m| LedgerError::date("expiry_date", m))
}

/// Stamp a write with the operation context and bump its version
fn touch(lot: &mut Lot, ctx: &LedgerContext) {
    lot.version += 1;
    lot.updated_at = ctx.now;
    lot.updated_by = ctx.actor.clone();
}

fn finish<T>(operation: &'static str, result: LedgerResult<T>) -> LedgerResult<T> {
    if let Err(err) = &result {
        tracing::warn!(operation, code = err.code(), "Ledger operation rejected: {}", err);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::store::InMemoryLotStore;
    use chrono::{TimeZone, Utc};

    fn service() -> LedgerService {
        LedgerService::new(
            Arc::new(InMemoryLotStore::new()),
            Arc::new(NullSink),
            LedgerSettings::default(),
        )
    }

    fn ctx() -> LedgerContext {
        LedgerContext::new("inspector", Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
    }

    fn root_input(id: &str, quantity: i64) -> CreateRootLotInput {
        CreateRootLotInput {
            lot_id: LotId::from(id),
            variety_id: VarietyId::from("IR64"),
            quantity: Decimal::from(quantity),
            custodian_id: CustodianId::from("station-north"),
            production_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            expiry_date: None,
            batch_number: None,
            notes: None,
        }
    }

    #[test]
    fn test_root_lot_starts_pending_and_full() {
        let lot = service().create_root_lot(root_input("LOT-ROOT", 500), &ctx()).unwrap();
        assert_eq!(lot.level, SeedLevel::Go);
        assert_eq!(lot.status, LotStatus::Pending);
        assert_eq!(lot.quantity_available, lot.quantity_total);
        assert_eq!(lot.version, 1);
        assert_eq!(lot.created_by, "inspector");
    }

    #[test]
    fn test_future_production_date_rejected() {
        let mut input = root_input("LOT-ROOT", 500);
        input.production_date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let err = service().create_root_lot(input, &ctx()).unwrap_err();
        assert_eq!(err.code(), "INVALID_DATE");
    }

    #[test]
    fn test_long_batch_number_rejected_by_validator() {
        let mut input = root_input("LOT-ROOT", 500);
        input.batch_number = Some("B".repeat(65));
        let err = service().create_root_lot(input, &ctx()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { ref field, .. } if field == "batch_number"));
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let service = service();
        service.create_root_lot(root_input("LOT-ROOT", 500), &ctx()).unwrap();
        let err = service
            .create_root_lot(root_input("LOT-ROOT", 10), &ctx())
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateLot(_)));
    }

    #[test]
    fn test_metadata_requires_a_field() {
        let service = service();
        service.create_root_lot(root_input("LOT-ROOT", 500), &ctx()).unwrap();
        let err = service
            .update_metadata(
                UpdateLotMetadataInput {
                    lot_id: LotId::from("LOT-ROOT"),
                    ..Default::default()
                },
                &ctx(),
            )
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_balance_of_fresh_root_is_conserved() {
        let service = service();
        service.create_root_lot(root_input("LOT-ROOT", 500), &ctx()).unwrap();
        let balance = service.balance_of(&LotId::from("LOT-ROOT")).unwrap();
        assert!(balance.is_conserved());
        assert_eq!(balance.derived_to_children, Decimal::ZERO);
    }
}
