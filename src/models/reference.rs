//! Reference population ("challenger" baseline) tables.

use serde::{Deserialize, Serialize};

use super::{Column, GroupKey, MinuteBucket, MultiKillRow, Position, Quartiles, SurrenderReference};

/// Champion label marking a champion-independent baseline row.
pub const GLOBAL_CHAMPION: &str = "GLOBAL";

/// One baseline statistic row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    pub champion: String,
    pub position: Position,
    pub win: bool,
    pub column: Column,
    #[serde(flatten)]
    pub stats: Quartiles,
}

impl ReferenceRow {
    pub fn is_global(&self) -> bool {
        self.champion == GLOBAL_CHAMPION
    }

    /// Join key against a champion-level group.
    pub fn champion_key(&self) -> (GroupKey, Column) {
        (
            GroupKey::champion_role(self.champion.clone(), self.position, self.win),
            self.column,
        )
    }

    /// Join key against a role-level group.
    pub fn role_key(&self) -> (GroupKey, Column) {
        (GroupKey::role(self.position, self.win), self.column)
    }
}

/// Baseline game duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationReference {
    pub average: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

/// All baseline tables used by one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSet {
    pub stats: Vec<ReferenceRow>,
    pub multi_kills: Vec<MultiKillRow>,
    pub duration: Option<DurationReference>,
    pub surrender_curve: Vec<MinuteBucket>,
    pub surrender: Option<SurrenderReference>,
}

impl ReferenceSet {
    /// Split statistic rows into champion-level and global rows.
    pub fn partition_stats(&self) -> (Vec<&ReferenceRow>, Vec<&ReferenceRow>) {
        self.stats.iter().partition(|r| !r.is_global())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metric;

    fn row(champion: &str) -> ReferenceRow {
        ReferenceRow {
            champion: champion.to_string(),
            position: Position::Jungle,
            win: true,
            column: Metric::Kills.into(),
            stats: Quartiles {
                avg: 5.0,
                q1: 3.0,
                q2: 5.0,
                q3: 7.0,
            },
        }
    }

    #[test]
    fn test_global_rows() {
        assert!(row(GLOBAL_CHAMPION).is_global());
        assert!(!row("Vi").is_global());
    }

    #[test]
    fn test_join_keys() {
        let r = row("Vi");
        let (key, column) = r.champion_key();
        assert_eq!(key, GroupKey::champion_role("Vi", Position::Jungle, true));
        assert_eq!(column, Column::per_game(Metric::Kills));
        assert_eq!(r.role_key().0, GroupKey::role(Position::Jungle, true));
    }

    #[test]
    fn test_partition_stats() {
        let set = ReferenceSet {
            stats: vec![row("Vi"), row(GLOBAL_CHAMPION), row("Lee Sin")],
            ..Default::default()
        };
        let (champions, global) = set.partition_stats();
        assert_eq!(champions.len(), 2);
        assert_eq!(global.len(), 1);
    }
}
