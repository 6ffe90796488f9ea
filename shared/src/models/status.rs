//! Certification status of a lot and its transition table

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Certification status of a lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    #[default]
    Pending,
    Certified,
    Rejected,
    InStock,
    Active,
    Distributed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid lot status: {0}")]
pub struct StatusParseError(pub String);

impl LotStatus {
    pub const ALL: [LotStatus; 6] = [
        LotStatus::Pending,
        LotStatus::Certified,
        LotStatus::Rejected,
        LotStatus::InStock,
        LotStatus::Active,
        LotStatus::Distributed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Pending => "PENDING",
            LotStatus::Certified => "CERTIFIED",
            LotStatus::Rejected => "REJECTED",
            LotStatus::InStock => "IN_STOCK",
            LotStatus::Active => "ACTIVE",
            LotStatus::Distributed => "DISTRIBUTED",
        }
    }

    /// Statuses reachable from this one in a single transition
    pub fn allowed_transitions(&self) -> &'static [LotStatus] {
        match self {
            LotStatus::Pending => &[LotStatus::Certified, LotStatus::Rejected],
            LotStatus::Certified => &[
                LotStatus::InStock,
                LotStatus::Active,
                LotStatus::Distributed,
            ],
            LotStatus::InStock => &[LotStatus::Active, LotStatus::Distributed],
            LotStatus::Active => &[LotStatus::Distributed],
            LotStatus::Rejected | LotStatus::Distributed => &[],
        }
    }

    pub fn can_transition_to(&self, next: LotStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Terminal lots accept metadata edits only
    pub fn is_terminal(&self) -> bool {
        matches!(self, LotStatus::Rejected | LotStatus::Distributed)
    }

    /// Only certified stock may seed the next generation
    pub fn can_seed_derivation(&self) -> bool {
        matches!(
            self,
            LotStatus::Certified | LotStatus::InStock | LotStatus::Active
        )
    }
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LotStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "PENDING" => Ok(LotStatus::Pending),
            "CERTIFIED" => Ok(LotStatus::Certified),
            "REJECTED" => Ok(LotStatus::Rejected),
            "IN_STOCK" | "INSTOCK" => Ok(LotStatus::InStock),
            "ACTIVE" => Ok(LotStatus::Active),
            "DISTRIBUTED" => Ok(LotStatus::Distributed),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_is_pending() {
        assert_eq!(LotStatus::default(), LotStatus::Pending);
    }

    #[test]
    fn test_allowed_edges() {
        assert!(LotStatus::Pending.can_transition_to(LotStatus::Certified));
        assert!(LotStatus::Pending.can_transition_to(LotStatus::Rejected));
        assert!(LotStatus::Certified.can_transition_to(LotStatus::InStock));
        assert!(LotStatus::Certified.can_transition_to(LotStatus::Active));
        assert!(LotStatus::Certified.can_transition_to(LotStatus::Distributed));
        assert!(LotStatus::InStock.can_transition_to(LotStatus::Active));
        assert!(LotStatus::InStock.can_transition_to(LotStatus::Distributed));
        assert!(LotStatus::Active.can_transition_to(LotStatus::Distributed));
    }

    #[test]
    fn test_rejected_edges() {
        assert!(!LotStatus::Pending.can_transition_to(LotStatus::Active));
        assert!(!LotStatus::Active.can_transition_to(LotStatus::InStock));
        assert!(!LotStatus::Distributed.can_transition_to(LotStatus::Pending));
        assert!(!LotStatus::Rejected.can_transition_to(LotStatus::Certified));
        for status in LotStatus::ALL {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for status in LotStatus::ALL {
            assert_eq!(status.is_terminal(), status.allowed_transitions().is_empty());
        }
    }

    #[test]
    fn test_derivation_eligibility() {
        assert!(!LotStatus::Pending.can_seed_derivation());
        assert!(!LotStatus::Rejected.can_seed_derivation());
        assert!(!LotStatus::Distributed.can_seed_derivation());
        assert!(LotStatus::Certified.can_seed_derivation());
        assert!(LotStatus::InStock.can_seed_derivation());
        assert!(LotStatus::Active.can_seed_derivation());
    }

    #[test]
    fn test_parse_round_trips_display() {
        for status in LotStatus::ALL {
            assert_eq!(status.to_string().parse::<LotStatus>(), Ok(status));
        }
        assert_eq!("in stock".parse::<LotStatus>(), Ok(LotStatus::InStock));
        assert!("SHIPPED".parse::<LotStatus>().is_err());
    }
}
