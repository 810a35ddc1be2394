//! Derived statistics models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Column, Position, StatKind, WideColumn};

/// Categorical fields used to partition records before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// (position, win)
    Role,
    /// (champion, position, win)
    ChampionRole,
}

/// Composite grouping key.
///
/// Field order defines sort order: champion, then position, then win.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub champion: Option<String>,
    pub position: Position,
    pub win: bool,
}

impl GroupKey {
    pub fn role(position: Position, win: bool) -> Self {
        Self {
            champion: None,
            position,
            win,
        }
    }

    pub fn champion_role(champion: impl Into<String>, position: Position, win: bool) -> Self {
        Self {
            champion: Some(champion.into()),
            position,
            win,
        }
    }

    /// Same key without the champion component.
    pub fn without_champion(&self) -> Self {
        Self::role(self.position, self.win)
    }
}

/// Mean and quartiles of one column within one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Quartiles {
    pub avg: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Avg => self.avg,
            StatKind::Q1 => self.q1,
            StatKind::Q2 => self.q2,
            StatKind::Q3 => self.q3,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: f64) {
        match kind {
            StatKind::Avg => self.avg = value,
            StatKind::Q1 => self.q1 = value,
            StatKind::Q2 => self.q2 = value,
            StatKind::Q3 => self.q3 = value,
        }
    }

    /// `(self, other)` value pairs for the given statistic kinds.
    pub fn paired_with(&self, other: &Quartiles, kinds: &[StatKind]) -> Vec<(f64, f64)> {
        kinds.iter().map(|k| (self.get(*k), other.get(*k))).collect()
    }
}

/// Long-format statistic: one value per (group, column, kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    #[serde(flatten)]
    pub key: GroupKey,
    pub column: Column,
    pub kind: StatKind,
    pub value: f64,
}

/// Wide-format aggregation output: one row per group, one value per
/// `{statKind}_{column}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideStatRow {
    #[serde(flatten)]
    pub key: GroupKey,
    pub values: BTreeMap<WideColumn, f64>,
}

impl WideStatRow {
    pub fn get(&self, kind: StatKind, column: Column) -> Option<f64> {
        self.values.get(&WideColumn::new(kind, column)).copied()
    }
}

/// Statistics of one column within one group (storage/lookup format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    #[serde(flatten)]
    pub key: GroupKey,
    pub column: Column,
    #[serde(flatten)]
    pub stats: Quartiles,
}

/// Multi-kill counts (means when aggregated).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiKills {
    pub double_kills: f64,
    pub triple_kills: f64,
    pub quadra_kills: f64,
    pub penta_kills: f64,
}

/// Multi-kill means for one (champion, position, win) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiKillRow {
    #[serde(flatten)]
    pub key: GroupKey,
    #[serde(flatten)]
    pub kills: MultiKills,
}

/// Win rate for one (champion, position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateRow {
    pub champion: String,
    pub position: Position,
    /// Percentage (0 to 100)
    pub win_rate: f64,
    pub total_games: u32,
}

/// Total ability and summoner spell casts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCasts {
    pub spell1_casts: i64,
    pub spell2_casts: i64,
    pub spell3_casts: i64,
    pub spell4_casts: i64,
    pub summoner1_casts: i64,
    pub summoner2_casts: i64,
}

/// Ability casts summed per champion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionSpellCasts {
    pub champion: String,
    pub spell1_casts: i64,
    pub spell2_casts: i64,
    pub spell3_casts: i64,
    pub spell4_casts: i64,
}
