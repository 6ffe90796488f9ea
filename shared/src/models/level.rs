//! Seed generation levels and the rules that order them

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation (certification depth) of a seed lot.
///
/// The order of the variants is the multiplication order: every level is
/// produced from exactly one lot of the level before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeedLevel {
    /// Origin (basic) seed, the root of every lineage
    Go,
    G1,
    G2,
    G3,
    G4,
    R1,
    R2,
}

/// Raised when a level code is not one of the seven recognized generations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid seed level: {0}")]
pub struct LevelParseError(pub String);

impl SeedLevel {
    /// All levels in generation order
    pub const ALL: [SeedLevel; 7] = [
        SeedLevel::Go,
        SeedLevel::G1,
        SeedLevel::G2,
        SeedLevel::G3,
        SeedLevel::G4,
        SeedLevel::R1,
        SeedLevel::R2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeedLevel::Go => "GO",
            SeedLevel::G1 => "G1",
            SeedLevel::G2 => "G2",
            SeedLevel::G3 => "G3",
            SeedLevel::G4 => "G4",
            SeedLevel::R1 => "R1",
            SeedLevel::R2 => "R2",
        }
    }

    /// Ordinal rank, strictly increasing along the generation sequence
    pub fn rank(&self) -> u8 {
        match self {
            SeedLevel::Go => 0,
            SeedLevel::G1 => 1,
            SeedLevel::G2 => 2,
            SeedLevel::G3 => 3,
            SeedLevel::G4 => 4,
            SeedLevel::R1 => 5,
            SeedLevel::R2 => 6,
        }
    }

    /// Level a lot of this level must be derived from (`None` for GO)
    pub fn parent_level(&self) -> Option<SeedLevel> {
        match self {
            SeedLevel::Go => None,
            level => Self::from_rank(level.rank() - 1),
        }
    }

    /// Level produced by multiplying a lot of this level (`None` for R2)
    pub fn successor(&self) -> Option<SeedLevel> {
        Self::from_rank(self.rank() + 1)
    }

    pub fn from_rank(rank: u8) -> Option<SeedLevel> {
        Self::ALL.get(rank as usize).copied()
    }

    pub fn is_root(&self) -> bool {
        matches!(self, SeedLevel::Go)
    }
}

impl std::fmt::Display for SeedLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SeedLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GO" | "G0" => Ok(SeedLevel::Go),
            "G1" => Ok(SeedLevel::G1),
            "G2" => Ok(SeedLevel::G2),
            "G3" => Ok(SeedLevel::G3),
            "G4" => Ok(SeedLevel::G4),
            "R1" => Ok(SeedLevel::R1),
            "R2" => Ok(SeedLevel::R2),
            _ => Err(LevelParseError(s.to_string())),
        }
    }
}

/// Number of defined generations; also the deepest possible lineage
pub const GENERATION_COUNT: usize = SeedLevel::ALL.len();

/// Required parent level for `level`
pub fn parent_level_of(level: SeedLevel) -> Option<SeedLevel> {
    level.parent_level()
}

/// Ordinal rank of `level` for ordering comparisons
pub fn rank_of(level: SeedLevel) -> u8 {
    level.rank()
}

/// Level a lot derived from a `level` lot must carry (`None` after R2)
pub fn successor_of(level: SeedLevel) -> Option<SeedLevel> {
    level.successor()
}

/// A child of `child` level may be derived from a `parent` lot only when it is
/// exactly one generation later
pub fn is_valid_derivation(parent: SeedLevel, child: SeedLevel) -> bool {
    child.rank() == parent.rank() + 1
}
