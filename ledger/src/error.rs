//! Error handling for the seed-lot ledger
//!
//! Every rejected operation returns one of these and leaves stored state
//! unchanged. Messages are for logs; callers branch on [`LedgerError::kind`]
//! and [`LedgerError::code`].

use rust_decimal::Decimal;
use shared::{LevelParseError, LotId, LotStatus, SeedLevel, StatusParseError};
use thiserror::Error;

use crate::store::StoreError;

/// Ledger error types
#[derive(Error, Debug)]
pub enum LedgerError {
    // Validation errors
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Invalid quantity for {field}: {message}")]
    InvalidQuantity { field: String, message: String },

    #[error("Invalid date for {field}: {message}")]
    InvalidDate { field: String, message: String },

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    // Business rule errors
    #[error("Parent lot {parent_id} is {status} and cannot seed a new generation")]
    ParentNotEligible { parent_id: LotId, status: LotStatus },

    #[error("A {requested} lot cannot be derived from a {parent_level} parent")]
    InvalidLevelSequence {
        parent_level: SeedLevel,
        requested: SeedLevel,
    },

    #[error("Insufficient quantity on lot {lot_id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        lot_id: LotId,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: LotStatus, to: LotStatus },

    #[error("Lot {lot_id} is already held by {custodian}")]
    NoOpTransfer { lot_id: LotId, custodian: String },

    #[error("Lot {lot_id} is {status}; quantity can no longer change")]
    LotClosed { lot_id: LotId, status: LotStatus },

    #[error("Lot {0} already exists")]
    DuplicateLot(LotId),

    #[error("Lot {lot_id} still has {dependents} dependent record(s)")]
    HasDescendants { lot_id: LotId, dependents: usize },

    #[error("Lot {lot_id} is {status}; only pending lots can be deleted")]
    NotDeletable { lot_id: LotId, status: LotStatus },

    #[error("Lot not found: {0}")]
    LotNotFound(LotId),

    // Consistency errors
    #[error("Broken lineage at lot {lot_id}: {reason}")]
    BrokenLineage { lot_id: LotId, reason: String },

    #[error("Lot {lot_id} would violate a stored invariant: {reason}")]
    InvariantViolation { lot_id: LotId, reason: String },

    #[error("Lot {lot_id} was modified concurrently; re-read and retry")]
    ConcurrentModification { lot_id: LotId },

    // Store errors
    #[error("Store error: {0}")]
    Store(StoreError),
}

/// Coarse classification used by the boundary layer to pick a client signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before reading state
    Validation,
    /// Input conflicts with current state, rejected before writing
    BusinessRule,
    NotFound,
    /// Stored state contradicts ledger assumptions, or a race was detected
    Consistency,
    Infrastructure,
}

impl ErrorKind {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::Validation | ErrorKind::BusinessRule | ErrorKind::NotFound
        )
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidLevel(_)
            | LedgerError::InvalidQuantity { .. }
            | LedgerError::InvalidDate { .. }
            | LedgerError::Validation { .. } => ErrorKind::Validation,
            LedgerError::ParentNotEligible { .. }
            | LedgerError::InvalidLevelSequence { .. }
            | LedgerError::InsufficientQuantity { .. }
            | LedgerError::InvalidStatusTransition { .. }
            | LedgerError::NoOpTransfer { .. }
            | LedgerError::LotClosed { .. }
            | LedgerError::DuplicateLot(_)
            | LedgerError::HasDescendants { .. }
            | LedgerError::NotDeletable { .. } => ErrorKind::BusinessRule,
            LedgerError::LotNotFound(_) => ErrorKind::NotFound,
            LedgerError::BrokenLineage { .. }
            | LedgerError::InvariantViolation { .. }
            | LedgerError::ConcurrentModification { .. } => ErrorKind::Consistency,
            LedgerError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidLevel(_) => "INVALID_LEVEL",
            LedgerError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            LedgerError::InvalidDate { .. } => "INVALID_DATE",
            LedgerError::Validation { .. } => "VALIDATION_ERROR",
            LedgerError::ParentNotEligible { .. } => "PARENT_NOT_ELIGIBLE",
            LedgerError::InvalidLevelSequence { .. } => "INVALID_LEVEL_SEQUENCE",
            LedgerError::InsufficientQuantity { .. } => "INSUFFICIENT_QUANTITY",
            LedgerError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            LedgerError::NoOpTransfer { .. } => "NO_OP_TRANSFER",
            LedgerError::LotClosed { .. } => "LOT_CLOSED",
            LedgerError::DuplicateLot(_) => "DUPLICATE_LOT",
            LedgerError::HasDescendants { .. } => "HAS_DESCENDANTS",
            LedgerError::NotDeletable { .. } => "NOT_DELETABLE",
            LedgerError::LotNotFound(_) => "NOT_FOUND",
            LedgerError::BrokenLineage { .. } => "BROKEN_LINEAGE",
            LedgerError::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            LedgerError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            LedgerError::Store(_) => "STORE_ERROR",
        }
    }

    /// Only races are worth retrying without operator involvement
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::ConcurrentModification { .. })
    }

    pub(crate) fn quantity(field: &str, message: &str) -> Self {
        LedgerError::InvalidQuantity {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn date(field: &str, message: &str) -> Self {
        LedgerError::InvalidDate {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn validation(field: &str, message: &str) -> Self {
        LedgerError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { lot_id, .. } => {
                LedgerError::ConcurrentModification { lot_id }
            }
            StoreError::AlreadyExists(lot_id) => LedgerError::DuplicateLot(lot_id),
            StoreError::InvariantViolation { lot_id, reason } => {
                LedgerError::InvariantViolation { lot_id, reason }
            }
            other => LedgerError::Store(other),
        }
    }
}

impl From<LevelParseError> for LedgerError {
    fn from(err: LevelParseError) -> Self {
        LedgerError::InvalidLevel(err.0)
    }
}

impl From<StatusParseError> for LedgerError {
    fn from(err: StatusParseError) -> Self {
        LedgerError::validation("status", &format!("unknown status {}", err.0))
    }
}

impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| e.code.to_string())
                    .unwrap_or_else(|| "invalid".to_string());
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("input".to_string(), "invalid".to_string()));
        LedgerError::Validation { field, message }
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LedgerError::InvalidLevel("G9".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::NoOpTransfer {
                lot_id: LotId::from("LOT-1"),
                custodian: "station".into()
            }
            .kind(),
            ErrorKind::BusinessRule
        );
        assert_eq!(
            LedgerError::LotNotFound(LotId::from("LOT-1")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::BrokenLineage {
                lot_id: LotId::from("LOT-1"),
                reason: "missing parent".into()
            }
            .kind(),
            ErrorKind::Consistency
        );
    }

    #[test]
    fn test_consistency_errors_are_server_side() {
        let conflict = LedgerError::ConcurrentModification {
            lot_id: LotId::from("LOT-1"),
        };
        assert!(!conflict.kind().is_client_error());
        assert!(conflict.is_retryable());
        assert_eq!(conflict.code(), "CONCURRENT_MODIFICATION");
    }

    #[test]
    fn test_version_conflict_maps_to_concurrent_modification() {
        let err: LedgerError = StoreError::VersionConflict {
            lot_id: LotId::from("LOT-1"),
            expected: 2,
            actual: 3,
        }
        .into();
        assert!(matches!(err, LedgerError::ConcurrentModification { .. }));
    }

    #[test]
    fn test_rejected_write_maps_to_consistency_error() {
        let err: LedgerError = StoreError::InvariantViolation {
            lot_id: LotId::from("LOT-1"),
            reason: "Available quantity cannot exceed total quantity".into(),
        }
        .into();
        assert_eq!(err.code(), "INVARIANT_VIOLATION");
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_level_parse_maps_to_invalid_level() {
        let err: LedgerError = "G7".parse::<SeedLevel>().unwrap_err().into();
        assert_eq!(err.code(), "INVALID_LEVEL");
    }
}
