//! Persistence port for lot and transfer records
//!
//! The ledger reads through [`LotStore::get`] / [`LotStore::query`] and writes
//! exclusively through [`LotStore::commit`], which applies a whole
//! [`ChangeSet`] atomically. Each update carries the version the engine read;
//! a store must reject the change set when any stored version moved on.

mod memory;

pub use memory::InMemoryLotStore;

use shared::{Lot, LotFilter, LotId, TransferRecord};
use thiserror::Error;

/// Persistence errors surfaced by a store implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Version conflict on lot {lot_id}: expected {expected}, found {actual}")]
    VersionConflict {
        lot_id: LotId,
        expected: u64,
        actual: u64,
    },

    #[error("Lot {0} already exists")]
    AlreadyExists(LotId),

    #[error("Lot {lot_id} rejected: {reason}")]
    InvariantViolation { lot_id: LotId, reason: String },

    #[error("Lot {0} is missing from the store")]
    Missing(LotId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A single lot write inside a change set
#[derive(Debug, Clone, PartialEq)]
pub enum LotWrite {
    /// Create a lot that must not exist yet
    Insert(Lot),
    /// Replace a lot whose stored version equals `expected_version`
    Update { lot: Lot, expected_version: u64 },
    /// Remove a lot whose stored version equals `expected_version`
    Delete { id: LotId, expected_version: u64 },
}

impl LotWrite {
    pub fn lot_id(&self) -> &LotId {
        match self {
            LotWrite::Insert(lot) | LotWrite::Update { lot, .. } => &lot.id,
            LotWrite::Delete { id, .. } => id,
        }
    }
}

/// Writes that must become visible together or not at all
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub lots: Vec<LotWrite>,
    pub transfers: Vec<TransferRecord>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, lot: Lot) -> Self {
        self.lots.push(LotWrite::Insert(lot));
        self
    }

    pub fn update(mut self, lot: Lot, expected_version: u64) -> Self {
        self.lots.push(LotWrite::Update {
            lot,
            expected_version,
        });
        self
    }

    pub fn delete(mut self, id: LotId, expected_version: u64) -> Self {
        self.lots.push(LotWrite::Delete {
            id,
            expected_version,
        });
        self
    }

    pub fn record_transfer(mut self, transfer: TransferRecord) -> Self {
        self.transfers.push(transfer);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty() && self.transfers.is_empty()
    }
}

/// Generic persistent-entity store supplied by the host application
pub trait LotStore: Send + Sync {
    fn get(&self, id: &LotId) -> StoreResult<Option<Lot>>;

    /// All lots matching `filter`, in a stable order
    fn query(&self, filter: &LotFilter) -> StoreResult<Vec<Lot>>;

    /// Transfer records of a lot in the order they were committed
    fn transfers_of(&self, lot_id: &LotId) -> StoreResult<Vec<TransferRecord>>;

    /// Apply every write in `changes` atomically.
    ///
    /// Fails with [`StoreError::VersionConflict`] if an update or delete was
    /// built from a stale read, with [`StoreError::AlreadyExists`] if an
    /// insert collides, and with [`StoreError::InvariantViolation`] if a
    /// written lot fails [`Lot::check_invariants`]. Nothing is written on
    /// failure.
    fn commit(&self, changes: ChangeSet) -> StoreResult<()>;
}

impl<S: LotStore + ?Sized> LotStore for std::sync::Arc<S> {
    fn get(&self, id: &LotId) -> StoreResult<Option<Lot>> {
        (**self).get(id)
    }

    fn query(&self, filter: &LotFilter) -> StoreResult<Vec<Lot>> {
        (**self).query(filter)
    }

    fn transfers_of(&self, lot_id: &LotId) -> StoreResult<Vec<TransferRecord>> {
        (**self).transfers_of(lot_id)
    }

    fn commit(&self, changes: ChangeSet) -> StoreResult<()> {
        (**self).commit(changes)
    }
}
