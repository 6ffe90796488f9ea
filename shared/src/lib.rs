//! Shared types and models for the seed-lot lineage ledger
//!
//! This crate holds the pure domain vocabulary: generation levels and their
//! ordering, the certification status machine, the lot and transfer records,
//! and input validation. It has no I/O and no notion of storage.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
