//! seed-ledger: replay a file of ledger commands
//!
//! Reads a JSON array of commands, applies them in order against a fresh
//! in-memory ledger and prints the resulting lots (and audit trail, when
//! enabled) as JSON. Stops at the first rejected command.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::Value;

use seed_lot_ledger::{
    logging, AuditEntry, AuditLog, CommandEnvelope, Config, FanoutSink, InMemoryLotStore,
    LedgerService, LotCodeSequence, TracingEventSink,
};
use shared::{Lot, LotId};

const DEFAULT_ACTOR: &str = "seed-ledger";

#[derive(Serialize)]
struct Report {
    applied: usize,
    lots: Vec<Lot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    audit: Vec<AuditEntry>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;
    logging::init(&config.logging);

    tracing::info!("Starting seed-ledger replay");
    tracing::info!("Environment: {}", config.environment);

    let path = std::env::args()
        .nth(1)
        .context("usage: seed-ledger <commands.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?;
    let commands: Vec<Value> =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array", path))?;

    let store = Arc::new(InMemoryLotStore::new());
    let audit = Arc::new(AuditLog::new());
    let mut sinks = FanoutSink::new().with(Arc::new(TracingEventSink));
    if config.audit.enabled {
        sinks = sinks.with(audit.clone());
    }
    let ledger = LedgerService::new(store.clone(), Arc::new(sinks), config.ledger.clone());
    let mut codes = LotCodeSequence::new(config.ledger.lot_code_prefix.clone(), 1);
    let mut touched: BTreeSet<LotId> = BTreeSet::new();
    let mut applied = 0;

    for (index, value) in commands.into_iter().enumerate() {
        let envelope = CommandEnvelope::from_value(value)
            .with_context(|| format!("command #{} is malformed", index))?;
        let ctx = envelope.context(DEFAULT_ACTOR);

        match envelope.command.apply(&ledger, &ctx, &mut codes) {
            Ok(outcome) => {
                tracing::debug!(index, lot_id = %outcome.lot().id, "Command applied");
                touched.insert(outcome.lot().id.clone());
                applied += 1;
            }
            Err(err) => {
                tracing::error!(index, code = err.code(), "Command rejected: {}", err);
                bail!("command #{} rejected [{}]: {}", index, err.code(), err);
            }
        }
    }

    let lots = store.snapshot()?;
    let audit_entries = touched
        .iter()
        .flat_map(|lot_id| audit.entries_for(lot_id))
        .collect();

    let report = Report {
        applied,
        lots,
        audit: audit_entries,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("Replay finished");
    Ok(())
}
