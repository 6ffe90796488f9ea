//! Boundary conversion from loosely-typed payloads to ledger inputs
//!
//! Transport layers hand over JSON whose shape is only loosely known:
//! quantities as numbers or strings, levels and statuses as free text, dates
//! as strings. Everything is parsed here into the strict input types before
//! the engine sees it.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    generate_lot_code, CustodianId, LedgerContext, LevelParseError, Lot, LotId, LotStatus,
    SeedLevel, StatusParseError, VarietyId,
};
use thiserror::Error;

use crate::error::{LedgerError, LedgerResult};
use crate::services::ledger::{
    ChangeStatusInput, CreateDerivedLotInput, CreateRootLotInput, LedgerService, TransferInput,
    TransferReceipt, UpdateLotMetadataInput,
};

/// Errors raised while converting a raw payload
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Malformed command: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid {field}: {message}")]
    Field { field: String, message: String },

    #[error(transparent)]
    Level(#[from] LevelParseError),

    #[error(transparent)]
    Status(#[from] StatusParseError),
}

impl CommandError {
    fn field(field: &str, message: impl Into<String>) -> Self {
        CommandError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<CommandError> for LedgerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Level(e) => e.into(),
            CommandError::Status(e) => e.into(),
            CommandError::Field { field, message } => LedgerError::Validation { field, message },
            CommandError::Malformed(e) => LedgerError::validation("command", &e.to_string()),
        }
    }
}

// ============================================================================
// Raw payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawCreateRoot {
    pub lot_id: Option<String>,
    pub variety_id: String,
    pub quantity: Value,
    pub custodian_id: String,
    pub production_date: String,
    pub expiry_date: Option<String>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCreateDerived {
    pub lot_id: Option<String>,
    pub parent_lot_id: String,
    pub level: String,
    pub quantity: Value,
    pub custodian_id: String,
    pub production_date: String,
    pub expiry_date: Option<String>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransfer {
    pub lot_id: String,
    pub target_custodian: String,
    pub quantity: Value,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawChangeStatus {
    pub lot_id: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUpdateMetadata {
    pub lot_id: String,
    pub notes: Option<String>,
    pub expiry_date: Option<String>,
    pub batch_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDelete {
    pub lot_id: String,
}

/// One ledger operation as received from a transport layer
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerCommand {
    CreateRoot(RawCreateRoot),
    CreateDerived(RawCreateDerived),
    Transfer(RawTransfer),
    ChangeStatus(RawChangeStatus),
    UpdateMetadata(RawUpdateMetadata),
    Delete(RawDelete),
}

/// Optional actor/time stamped on a command by its sender
#[derive(Debug, Clone, Default, Deserialize)]
struct CommandMeta {
    actor: Option<String>,
    at: Option<DateTime<Utc>>,
}

/// A command together with who issued it and when
#[derive(Debug, Clone)]
pub struct CommandEnvelope {
    pub actor: Option<String>,
    pub at: Option<DateTime<Utc>>,
    pub command: LedgerCommand,
}

impl CommandEnvelope {
    /// Parse `{"op": ..., "actor": ..., "at": ..., <payload fields>}`
    pub fn from_value(value: Value) -> Result<Self, CommandError> {
        let meta: CommandMeta = serde_json::from_value(value.clone())?;
        let command: LedgerCommand = serde_json::from_value(value)?;
        Ok(Self {
            actor: meta.actor,
            at: meta.at,
            command,
        })
    }

    /// Operation context, falling back to `default_actor` and the system clock
    pub fn context(&self, default_actor: &str) -> LedgerContext {
        LedgerContext::new(
            self.actor.clone().unwrap_or_else(|| default_actor.to_string()),
            self.at.unwrap_or_else(Utc::now),
        )
    }
}

/// Allocates lot codes for commands that do not carry one.
///
/// The sequence is owned by the caller and passed in explicitly.
#[derive(Debug, Clone)]
pub struct LotCodeSequence {
    prefix: String,
    next: u32,
}

impl LotCodeSequence {
    pub fn new(prefix: impl Into<String>, start: u32) -> Self {
        Self {
            prefix: prefix.into(),
            next: start,
        }
    }

    /// Fails once the counter is exhausted rather than reissuing a code
    pub fn next_code(
        &mut self,
        year: i32,
        variety_id: &VarietyId,
        level: SeedLevel,
    ) -> Result<LotId, CommandError> {
        let following = self
            .next
            .checked_add(1)
            .ok_or_else(|| CommandError::field("lot_id", "lot code sequence exhausted"))?;
        let code = generate_lot_code(&self.prefix, year, variety_id.as_str(), level, self.next);
        self.next = following;
        Ok(code)
    }
}

/// What a successfully applied command produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Lot(Lot),
    Transfer(TransferReceipt),
    Deleted(Lot),
}

impl CommandOutcome {
    pub fn lot(&self) -> &Lot {
        match self {
            CommandOutcome::Lot(lot) | CommandOutcome::Deleted(lot) => lot,
            CommandOutcome::Transfer(receipt) => &receipt.lot,
        }
    }
}

// ============================================================================
// Field parsing
// ============================================================================

/// Accept `1000`, `12.5` or `"12.500"`; floats go through their decimal text
pub fn parse_quantity(field: &str, value: &Value) -> Result<Decimal, CommandError> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(CommandError::field(
                field,
                format!("expected a number or numeric string, got {}", other),
            ))
        }
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| CommandError::field(field, format!("not a decimal quantity: {}", text)))
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CommandError::field(field, format!("expected YYYY-MM-DD, got {}", value)))
}

fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, CommandError> {
    value.map(|v| parse_date(field, v)).transpose()
}

// ============================================================================
// Conversions
// ============================================================================

impl RawCreateRoot {
    pub fn into_input(
        self,
        ctx: &LedgerContext,
        codes: &mut LotCodeSequence,
    ) -> Result<CreateRootLotInput, CommandError> {
        let variety_id = VarietyId::new(self.variety_id.trim());
        let lot_id = match self.lot_id {
            Some(id) => LotId::new(id.trim()),
            None => codes.next_code(ctx.now.year(), &variety_id, SeedLevel::Go)?,
        };
        Ok(CreateRootLotInput {
            lot_id,
            variety_id,
            quantity: parse_quantity("quantity", &self.quantity)?,
            custodian_id: CustodianId::new(self.custodian_id.trim()),
            production_date: parse_date("production_date", &self.production_date)?,
            expiry_date: parse_optional_date("expiry_date", self.expiry_date.as_deref())?,
            batch_number: self.batch_number,
            notes: self.notes,
        })
    }
}

impl RawCreateDerived {
    /// `parent_variety` is only consulted when a lot code must be generated
    pub fn into_input(
        self,
        ctx: &LedgerContext,
        codes: &mut LotCodeSequence,
        parent_variety: Option<&VarietyId>,
    ) -> Result<CreateDerivedLotInput, CommandError> {
        let level: SeedLevel = self.level.parse()?;
        let lot_id = match (self.lot_id, parent_variety) {
            (Some(id), _) => LotId::new(id.trim()),
            (None, Some(variety)) => codes.next_code(ctx.now.year(), variety, level)?,
            (None, None) => {
                return Err(CommandError::field(
                    "lot_id",
                    "required when the parent lot is unknown",
                ))
            }
        };
        Ok(CreateDerivedLotInput {
            lot_id,
            parent_lot_id: LotId::new(self.parent_lot_id.trim()),
            level,
            quantity: parse_quantity("quantity", &self.quantity)?,
            custodian_id: CustodianId::new(self.custodian_id.trim()),
            production_date: parse_date("production_date", &self.production_date)?,
            expiry_date: parse_optional_date("expiry_date", self.expiry_date.as_deref())?,
            batch_number: self.batch_number,
            notes: self.notes,
        })
    }
}

impl TryFrom<RawTransfer> for TransferInput {
    type Error = CommandError;

    fn try_from(raw: RawTransfer) -> Result<Self, Self::Error> {
        Ok(TransferInput {
            lot_id: LotId::new(raw.lot_id.trim()),
            target_custodian: CustodianId::new(raw.target_custodian.trim()),
            quantity: parse_quantity("quantity", &raw.quantity)?,
            notes: raw.notes,
        })
    }
}

impl TryFrom<RawChangeStatus> for ChangeStatusInput {
    type Error = CommandError;

    fn try_from(raw: RawChangeStatus) -> Result<Self, Self::Error> {
        let status: LotStatus = raw.status.parse()?;
        Ok(ChangeStatusInput {
            lot_id: LotId::new(raw.lot_id.trim()),
            status,
            notes: raw.notes,
        })
    }
}

impl TryFrom<RawUpdateMetadata> for UpdateLotMetadataInput {
    type Error = CommandError;

    fn try_from(raw: RawUpdateMetadata) -> Result<Self, Self::Error> {
        Ok(UpdateLotMetadataInput {
            lot_id: LotId::new(raw.lot_id.trim()),
            notes: raw.notes,
            expiry_date: parse_optional_date("expiry_date", raw.expiry_date.as_deref())?,
            batch_number: raw.batch_number,
        })
    }
}

impl LedgerCommand {
    /// Convert the payload and run it against the ledger
    pub fn apply(
        self,
        ledger: &LedgerService,
        ctx: &LedgerContext,
        codes: &mut LotCodeSequence,
    ) -> LedgerResult<CommandOutcome> {
        match self {
            LedgerCommand::CreateRoot(raw) => {
                let input = raw.into_input(ctx, codes)?;
                ledger.create_root_lot(input, ctx).map(CommandOutcome::Lot)
            }
            LedgerCommand::CreateDerived(raw) => {
                let parent_variety = if raw.lot_id.is_none() {
                    let parent = ledger.get_lot(&LotId::new(raw.parent_lot_id.trim()))?;
                    Some(parent.variety_id)
                } else {
                    None
                };
                let input = raw.into_input(ctx, codes, parent_variety.as_ref())?;
                ledger.create_derived_lot(input, ctx).map(CommandOutcome::Lot)
            }
            LedgerCommand::Transfer(raw) => {
                let input = TransferInput::try_from(raw)?;
                ledger.transfer(input, ctx).map(CommandOutcome::Transfer)
            }
            LedgerCommand::ChangeStatus(raw) => {
                let input = ChangeStatusInput::try_from(raw)?;
                ledger.change_status(input, ctx).map(CommandOutcome::Lot)
            }
            LedgerCommand::UpdateMetadata(raw) => {
                let input = UpdateLotMetadataInput::try_from(raw)?;
                ledger.update_metadata(input, ctx).map(CommandOutcome::Lot)
            }
            LedgerCommand::Delete(raw) => ledger
                .delete_lot(&LotId::new(raw.lot_id.trim()), ctx)
                .map(CommandOutcome::Deleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ctx() -> LedgerContext {
        LedgerContext::new("clerk", Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_parse_quantity_forms() {
        assert_eq!(parse_quantity("q", &json!(1000)).unwrap(), Decimal::from(1000));
        assert_eq!(
            parse_quantity("q", &json!("12.500")).unwrap(),
            Decimal::from_str("12.5").unwrap()
        );
        assert_eq!(
            parse_quantity("q", &json!(0.1)).unwrap(),
            Decimal::from_str("0.1").unwrap()
        );
        assert!(parse_quantity("q", &json!("lots")).is_err());
        assert!(parse_quantity("q", &json!(null)).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("d", "2026-09-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        assert!(parse_date("d", "01/09/2026").is_err());
    }

    #[test]
    fn test_envelope_reads_meta_and_payload() {
        let envelope = CommandEnvelope::from_value(json!({
            "op": "change_status",
            "actor": "inspector-7",
            "at": "2026-10-01T08:00:00Z",
            "lot_id": "LOT-A",
            "status": "certified"
        }))
        .unwrap();

        let ctx = envelope.context("fallback");
        assert_eq!(ctx.actor, "inspector-7");
        let LedgerCommand::ChangeStatus(raw) = envelope.command else {
            panic!("expected change_status");
        };
        let input = ChangeStatusInput::try_from(raw).unwrap();
        assert_eq!(input.status, LotStatus::Certified);
    }

    #[test]
    fn test_unknown_op_is_malformed() {
        let err = CommandEnvelope::from_value(json!({ "op": "merge", "lot_id": "LOT-A" }))
            .unwrap_err();
        assert!(matches!(err, CommandError::Malformed(_)));
    }

    #[test]
    fn test_unknown_level_maps_to_invalid_level() {
        let raw = RawCreateDerived {
            lot_id: Some("LOT-B".into()),
            parent_lot_id: "LOT-A".into(),
            level: "G9".into(),
            quantity: json!(10),
            custodian_id: "farm-1".into(),
            production_date: "2026-09-01".into(),
            expiry_date: None,
            batch_number: None,
            notes: None,
        };
        let mut codes = LotCodeSequence::new("SL", 1);
        let err: LedgerError = raw.into_input(&ctx(), &mut codes, None).unwrap_err().into();
        assert_eq!(err.code(), "INVALID_LEVEL");
    }

    #[test]
    fn test_root_without_code_gets_generated_one() {
        let raw: RawCreateRoot = serde_json::from_value(json!({
            "variety_id": "ir64",
            "quantity": "1000",
            "custodian_id": "station-north",
            "production_date": "2026-09-01"
        }))
        .unwrap();
        let mut codes = LotCodeSequence::new("SL", 1);
        let input = raw.into_input(&ctx(), &mut codes).unwrap();
        assert_eq!(input.lot_id.as_str(), "SL-2026-IR64-GO-0001");
        let next = codes
            .next_code(2026, &VarietyId::from("IR64"), SeedLevel::G1)
            .unwrap();
        assert_eq!(next.as_str(), "SL-2026-IR64-G1-0002");
    }

    #[test]
    fn test_exhausted_code_sequence_is_a_field_error() {
        let raw: RawCreateRoot = serde_json::from_value(json!({
            "variety_id": "IR64",
            "quantity": "1000",
            "custodian_id": "station-north",
            "production_date": "2026-09-01"
        }))
        .unwrap();
        let mut codes = LotCodeSequence::new("SL", u32::MAX);
        let err = raw.into_input(&ctx(), &mut codes).unwrap_err();
        assert!(matches!(err, CommandError::Field { ref field, .. } if field == "lot_id"));

        // The sequence does not wrap around to reissue early codes
        assert!(codes
            .next_code(2026, &VarietyId::from("IR64"), SeedLevel::G1)
            .is_err());
    }
}
