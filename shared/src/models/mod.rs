//! Domain models for the seed-lot ledger

mod level;
mod lot;
mod status;
mod transfer;

pub use level::*;
pub use lot::*;
pub use status::*;
pub use transfer::*;
