//! In-memory arena implementation of the persistence port

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use shared::{Lot, LotFilter, LotId, TransferRecord};

use super::{ChangeSet, LotStore, LotWrite, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Arena {
    lots: BTreeMap<LotId, Lot>,
    transfers: Vec<TransferRecord>,
}

/// Lots kept in a map keyed by lot code; lineage is resolved by id lookup
#[derive(Debug, Default)]
pub struct InMemoryLotStore {
    arena: RwLock<Arena>,
}

impl InMemoryLotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a lot without version or lineage checks.
    ///
    /// Meant for importing existing records and for repair tooling; ledger
    /// operations never call it.
    pub fn put_unchecked(&self, lot: Lot) -> StoreResult<()> {
        self.write()?.lots.insert(lot.id.clone(), lot);
        Ok(())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.lots.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Every stored lot, ordered by lot code
    pub fn snapshot(&self) -> StoreResult<Vec<Lot>> {
        Ok(self.read()?.lots.values().cloned().collect())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Arena>> {
        self.arena
            .read()
            .map_err(|_| StoreError::Unavailable("lot arena lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Arena>> {
        self.arena
            .write()
            .map_err(|_| StoreError::Unavailable("lot arena lock poisoned".to_string()))
    }
}

fn check_version(arena: &Arena, id: &LotId, expected: u64) -> StoreResult<()> {
    let stored = arena
        .lots
        .get(id)
        .ok_or_else(|| StoreError::Missing(id.clone()))?;
    if stored.version != expected {
        return Err(StoreError::VersionConflict {
            lot_id: id.clone(),
            expected,
            actual: stored.version,
        });
    }
    Ok(())
}

impl LotStore for InMemoryLotStore {
    fn get(&self, id: &LotId) -> StoreResult<Option<Lot>> {
        Ok(self.read()?.lots.get(id).cloned())
    }

    fn query(&self, filter: &LotFilter) -> StoreResult<Vec<Lot>> {
        Ok(self
            .read()?
            .lots
            .values()
            .filter(|lot| filter.matches(lot))
            .cloned()
            .collect())
    }

    fn transfers_of(&self, lot_id: &LotId) -> StoreResult<Vec<TransferRecord>> {
        Ok(self
            .read()?
            .transfers
            .iter()
            .filter(|t| &t.lot_id == lot_id)
            .cloned()
            .collect())
    }

    fn commit(&self, changes: ChangeSet) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut arena = self.write()?;

        // Check everything under the write lock before touching the arena
        for write in &changes.lots {
            if let LotWrite::Insert(lot) | LotWrite::Update { lot, .. } = write {
                lot.check_invariants()
                    .map_err(|reason| StoreError::InvariantViolation {
                        lot_id: write.lot_id().clone(),
                        reason: reason.to_string(),
                    })?;
            }
            match write {
                LotWrite::Insert(lot) => {
                    if arena.lots.contains_key(&lot.id) {
                        return Err(StoreError::AlreadyExists(lot.id.clone()));
                    }
                }
                LotWrite::Update {
                    lot,
                    expected_version,
                } => check_version(&arena, &lot.id, *expected_version)?,
                LotWrite::Delete {
                    id,
                    expected_version,
                } => check_version(&arena, id, *expected_version)?,
            }
        }

        for write in changes.lots {
            match write {
                LotWrite::Insert(lot) | LotWrite::Update { lot, .. } => {
                    arena.lots.insert(lot.id.clone(), lot);
                }
                LotWrite::Delete { id, .. } => {
                    arena.lots.remove(&id);
                }
            }
        }
        arena.transfers.extend(changes.transfers);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::{CustodianId, LotStatus, SeedLevel, VarietyId};

    fn lot(id: &str, version: u64) -> Lot {
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        Lot {
            id: LotId::from(id),
            variety_id: VarietyId::from("IR64"),
            level: SeedLevel::Go,
            quantity_total: Decimal::from(10),
            quantity_available: Decimal::from(10),
            status: LotStatus::Pending,
            parent_lot_id: None,
            custodian_id: CustodianId::from("station"),
            production_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            expiry_date: None,
            batch_number: None,
            notes: None,
            version,
            created_at: at,
            updated_at: at,
            created_by: "test".to_string(),
            updated_by: "test".to_string(),
        }
    }

    #[test]
    fn test_insert_then_get() {
        let store = InMemoryLotStore::new();
        store.commit(ChangeSet::new().insert(lot("LOT-A", 1))).unwrap();
        assert_eq!(store.get(&LotId::from("LOT-A")).unwrap().unwrap().version, 1);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let store = InMemoryLotStore::new();
        store.commit(ChangeSet::new().insert(lot("LOT-A", 1))).unwrap();
        let err = store
            .commit(ChangeSet::new().insert(lot("LOT-A", 1)))
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(LotId::from("LOT-A")));
    }

    #[test]
    fn test_stale_update_leaves_everything_untouched() {
        let store = InMemoryLotStore::new();
        store.commit(ChangeSet::new().insert(lot("LOT-A", 1))).unwrap();

        // Second write in the same change set is stale, so the insert must not land either
        let changes = ChangeSet::new()
            .insert(lot("LOT-B", 1))
            .update(lot("LOT-A", 3), 2);
        let err = store.commit(changes).unwrap_err();

        assert!(matches!(err, StoreError::VersionConflict { actual: 1, .. }));
        assert!(store.get(&LotId::from("LOT-B")).unwrap().is_none());
        assert_eq!(store.get(&LotId::from("LOT-A")).unwrap().unwrap().version, 1);
    }

    #[test]
    fn test_delete_checks_version() {
        let store = InMemoryLotStore::new();
        store.commit(ChangeSet::new().insert(lot("LOT-A", 1))).unwrap();
        assert!(store
            .commit(ChangeSet::new().delete(LotId::from("LOT-A"), 7))
            .is_err());
        store
            .commit(ChangeSet::new().delete(LotId::from("LOT-A"), 1))
            .unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_write_breaking_lot_invariants_is_refused() {
        let store = InMemoryLotStore::new();
        store.commit(ChangeSet::new().insert(lot("LOT-A", 1))).unwrap();

        let mut inflated = lot("LOT-A", 2);
        inflated.quantity_available = Decimal::from(11);
        let changes = ChangeSet::new()
            .insert(lot("LOT-B", 1))
            .update(inflated, 1);
        let err = store.commit(changes).unwrap_err();

        assert!(matches!(err, StoreError::InvariantViolation { ref lot_id, .. } if lot_id.as_str() == "LOT-A"));
        assert!(store.get(&LotId::from("LOT-B")).unwrap().is_none());
        assert_eq!(
            store.get(&LotId::from("LOT-A")).unwrap().unwrap().quantity_available,
            Decimal::from(10)
        );

        let mut rootless = lot("LOT-C", 1);
        rootless.level = SeedLevel::G1;
        assert!(matches!(
            store.commit(ChangeSet::new().insert(rootless)),
            Err(StoreError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_empty_change_set_is_a_no_op() {
        let store = InMemoryLotStore::new();
        let changes = ChangeSet::new();
        assert!(changes.is_empty());
        store.commit(changes).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(store.transfers_of(&LotId::from("LOT-A")).unwrap().is_empty());
    }

    #[test]
    fn test_query_by_parent() {
        let store = InMemoryLotStore::new();
        let mut child = lot("LOT-B", 1);
        child.level = SeedLevel::G1;
        child.parent_lot_id = Some(LotId::from("LOT-A"));
        store
            .commit(ChangeSet::new().insert(lot("LOT-A", 1)).insert(child))
            .unwrap();

        let children = store
            .query(&LotFilter::children_of(&LotId::from("LOT-A")))
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id.as_str(), "LOT-B");
    }
}
