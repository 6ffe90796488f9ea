//! Common types used across the ledger

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Human-meaningful lot code (e.g. "SL-2026-IR64-G1-0007")
    LotId
);

string_id!(
    /// Multiplier or seed station currently holding a lot
    CustodianId
);

string_id!(
    /// Crop variety reference
    VarietyId
);

/// Who performed an operation and when.
///
/// Passed into every ledger operation so that no operation reads the system
/// clock or a session global on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerContext {
    pub actor: String,
    pub now: chrono::DateTime<chrono::Utc>,
}

impl LedgerContext {
    pub fn new(actor: impl Into<String>, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            actor: actor.into(),
            now,
        }
    }

    /// Context stamped with the current system time
    pub fn system(actor: impl Into<String>) -> Self {
        Self::new(actor, chrono::Utc::now())
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.now.date_naive()
    }
}
