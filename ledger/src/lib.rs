//! Seed-lot lineage and inventory ledger
//!
//! Tracks certified seed lots through the generation chain
//! GO → G1 → G2 → G3 → G4 → R1 → R2. Each lot records its quantity, its
//! custodian, its certification status and the lot it was derived from.
//! [`LedgerService`] is the only writer; [`GenealogyService`] answers lineage
//! queries; [`commands`] converts loosely-typed payloads at the boundary.

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod services;
pub mod store;

pub use commands::{
    CommandEnvelope, CommandError, CommandOutcome, LedgerCommand, LotCodeSequence,
};
pub use config::{Config, LedgerSettings};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use events::{
    AuditEntry, AuditLog, EventPayload, EventSink, FanoutSink, LedgerEvent, NullSink,
    TracingEventSink,
};
pub use services::*;
pub use store::{ChangeSet, InMemoryLotStore, LotStore, LotWrite, StoreError, StoreResult};
