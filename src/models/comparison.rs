//! Player-versus-reference comparison rows.

use serde::{Deserialize, Serialize};

use super::{Column, GroupKey, MultiKills, Quartiles};

/// Position of the player relative to the reference population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Every compared value strictly above the reference
    Ahead,
    /// Every compared value strictly below the reference
    Behind,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Ahead => write!(f, "ahead"),
            Direction::Behind => write!(f, "behind"),
        }
    }
}

/// Player statistics joined with the champion and global references.
///
/// `reference`/`global` are `None` when no baseline row matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(flatten)]
    pub key: GroupKey,
    pub column: Column,
    pub player: Quartiles,
    pub reference: Option<Quartiles>,
    pub global: Option<Quartiles>,
}

/// A comparison where the player is uniformly ahead of or behind the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRow {
    pub direction: Direction,
    #[serde(flatten)]
    pub row: ComparisonRow,
}

/// Multi-kill means joined with the reference means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiKillComparison {
    #[serde(flatten)]
    pub key: GroupKey,
    pub player: MultiKills,
    pub reference: Option<MultiKills>,
}
