//! Fixtures shared by the ledger integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use seed_lot_ledger::{
    AuditLog, ChangeStatusInput, CreateDerivedLotInput, CreateRootLotInput, FanoutSink,
    InMemoryLotStore, LedgerService, LedgerSettings, LotStore, TransferInput,
};
use shared::{CustodianId, LedgerContext, Lot, LotId, LotStatus, SeedLevel, VarietyId};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn ctx() -> LedgerContext {
    LedgerContext::new("inspector", Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
}

pub fn production_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

/// A ledger over a fresh in-memory store with an audit trail attached
pub struct Fixture {
    pub ledger: LedgerService,
    pub store: Arc<InMemoryLotStore>,
    pub audit: Arc<AuditLog>,
}

impl Fixture {
    pub fn new() -> Self {
        seed_lot_ledger::logging::init_test();
        let store = Arc::new(InMemoryLotStore::new());
        let audit = Arc::new(AuditLog::new());
        let sinks = FanoutSink::new().with(audit.clone());
        let ledger = LedgerService::new(store.clone(), Arc::new(sinks), LedgerSettings::default());
        Self {
            ledger,
            store,
            audit,
        }
    }

    /// Ledger over an arbitrary store, without an audit trail
    pub fn with_store(store: Arc<dyn LotStore>) -> LedgerService {
        seed_lot_ledger::logging::init_test();
        LedgerService::new(
            store,
            Arc::new(seed_lot_ledger::NullSink),
            LedgerSettings::default(),
        )
    }

    pub fn lot(&self, id: &str) -> Lot {
        self.ledger.get_lot(&LotId::from(id)).unwrap()
    }

    pub fn root(&self, id: &str, quantity: &str) -> Lot {
        self.ledger
            .create_root_lot(root_input(id, quantity), &ctx())
            .unwrap()
    }

    pub fn derive(&self, id: &str, parent: &str, level: SeedLevel, quantity: &str) -> Lot {
        self.ledger
            .create_derived_lot(derived_input(id, parent, level, quantity), &ctx())
            .unwrap()
    }

    pub fn set_status(&self, id: &str, status: LotStatus) -> Lot {
        self.ledger
            .change_status(status_input(id, status), &ctx())
            .unwrap()
    }

    pub fn certify(&self, id: &str) -> Lot {
        self.set_status(id, LotStatus::Certified)
    }
}

pub fn root_input(id: &str, quantity: &str) -> CreateRootLotInput {
    CreateRootLotInput {
        lot_id: LotId::from(id),
        variety_id: VarietyId::from("IR64"),
        quantity: dec(quantity),
        custodian_id: CustodianId::from("station-north"),
        production_date: production_date(),
        expiry_date: None,
        batch_number: None,
        notes: None,
    }
}

pub fn derived_input(
    id: &str,
    parent: &str,
    level: SeedLevel,
    quantity: &str,
) -> CreateDerivedLotInput {
    CreateDerivedLotInput {
        lot_id: LotId::from(id),
        parent_lot_id: LotId::from(parent),
        level,
        quantity: dec(quantity),
        custodian_id: CustodianId::from("multiplier-east"),
        production_date: production_date(),
        expiry_date: None,
        batch_number: None,
        notes: None,
    }
}

pub fn transfer_input(id: &str, to: &str, quantity: &str) -> TransferInput {
    TransferInput {
        lot_id: LotId::from(id),
        target_custodian: CustodianId::from(to),
        quantity: dec(quantity),
        notes: None,
    }
}

pub fn status_input(id: &str, status: LotStatus) -> ChangeStatusInput {
    ChangeStatusInput {
        lot_id: LotId::from(id),
        status,
        notes: None,
    }
}
