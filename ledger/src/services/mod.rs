//! Business logic services for the seed-lot ledger

pub mod genealogy;
pub mod ledger;

pub use genealogy::{Descendant, Descendants, Genealogy, GenealogyService, LotTree};
pub use ledger::{
    ChangeStatusInput, CreateDerivedLotInput, CreateRootLotInput, LedgerService, QuantityBalance,
    TransferInput, TransferReceipt, UpdateLotMetadataInput,
};
