//! Validation utilities for the seed-lot ledger
//!
//! Input checks that need no stored state. Every check rejects; none of them
//! rounds or clamps a value into range.

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate a lot or transfer quantity in kilograms.
///
/// `max_scale` is the number of decimal places the ledger records; a value
/// with finer precision is rejected rather than rounded.
pub fn validate_quantity(quantity: Decimal, max_scale: u32) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    if quantity.normalize().scale() > max_scale {
        return Err("Quantity has more decimal places than the ledger records");
    }
    Ok(())
}

/// Check that `requested` can be taken out of `available`
pub fn has_sufficient_quantity(requested: Decimal, available: Decimal) -> bool {
    requested <= available
}

// ============================================================================
// Date Validations
// ============================================================================

/// Production date may not lie in the future
pub fn validate_production_date(production: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if production > today {
        return Err("Production date cannot be in the future");
    }
    Ok(())
}

/// Expiry date, when present, must be strictly after the production date
pub fn validate_expiry_date(
    production: NaiveDate,
    expiry: Option<NaiveDate>,
) -> Result<(), &'static str> {
    match expiry {
        Some(expiry) if expiry <= production => Err("Expiry date must be after production date"),
        _ => Ok(()),
    }
}

// ============================================================================
// Identifier Validations
// ============================================================================

/// Validate lot code format (3-48 chars, uppercase alphanumeric, '-' or '_')
pub fn validate_lot_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Lot code must be at least 3 characters");
    }
    if code.len() > 48 {
        return Err("Lot code must be at most 48 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err("Lot code must be uppercase alphanumeric, '-' or '_'");
    }
    if code.starts_with('-') || code.ends_with('-') {
        return Err("Lot code cannot start or end with '-'");
    }
    Ok(())
}

/// Custodian and variety references must be non-blank and already trimmed,
/// so that two spellings never name the same holder
pub fn validate_reference(value: &str) -> Result<(), &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("Reference cannot be empty");
    }
    if trimmed.len() != value.len() {
        return Err("Reference cannot have leading or trailing whitespace");
    }
    Ok(())
}
