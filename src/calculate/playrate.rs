//! Per-player playrate filtering.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::GameRecord;

/// Categorical column whose playrate is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayrateColumn {
    Champion,
    Position,
}

impl PlayrateColumn {
    fn value<'a>(&self, record: &'a GameRecord) -> &'a str {
        match self {
            PlayrateColumn::Champion => &record.champion_name,
            PlayrateColumn::Position => record.individual_position.as_str(),
        }
    }
}

/// Keep only records whose (player, value) pair makes up at least
/// `threshold_percent` of that player's games.
///
/// The threshold is relative to each player's own total, so two players can
/// retain different value sets. Applying the filter twice with the same
/// threshold gives the same result as applying it once.
pub fn filter_by_playrate(
    records: &[GameRecord],
    column: PlayrateColumn,
    threshold_percent: f64,
) -> Vec<GameRecord> {
    let mut pair_counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut player_totals: HashMap<&str, usize> = HashMap::new();

    for record in records {
        *pair_counts
            .entry((record.puuid.as_str(), column.value(record)))
            .or_default() += 1;
        *player_totals.entry(record.puuid.as_str()).or_default() += 1;
    }

    let kept: Vec<GameRecord> = records
        .iter()
        .filter(|record| {
            let puuid = record.puuid.as_str();
            let count = pair_counts[&(puuid, column.value(record))];
            let total = player_totals[puuid];
            count as f64 / total as f64 * 100.0 >= threshold_percent
        })
        .cloned()
        .collect();

    debug!(
        "Playrate filter on {:?} at {}% kept {}/{} records",
        column,
        threshold_percent,
        kept.len(),
        records.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn games(puuid: &str, champion: &str, position: &str, n: usize, start: i64) -> Vec<GameRecord> {
        (0..n)
            .map(|i| record(puuid, start + i as i64, champion, position, i % 2 == 0, 1800))
            .collect()
    }

    #[test]
    fn test_filter_drops_rare_champions() {
        let mut records = games("p1", "Ahri", "MIDDLE", 18, 0);
        records.extend(games("p1", "Zed", "MIDDLE", 1, 100));
        records.extend(games("p1", "Lux", "MIDDLE", 2, 200));

        let kept = filter_by_playrate(&records, PlayrateColumn::Champion, 7.0);

        // Zed: 1/21 = 4.8%, Lux: 2/21 = 9.5%
        assert_eq!(kept.len(), 20);
        assert!(kept.iter().all(|r| r.champion_name != "Zed"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut records = games("p1", "Ahri", "MIDDLE", 4, 0);
        records.extend(games("p1", "Zed", "MIDDLE", 1, 100));

        let kept = filter_by_playrate(&records, PlayrateColumn::Champion, 20.0);
        assert_eq!(kept.len(), 5);
    }

    #[test]
    fn test_threshold_is_per_player() {
        let mut records = games("p1", "Ahri", "MIDDLE", 19, 0);
        records.extend(games("p1", "Zed", "MIDDLE", 1, 100));
        records.extend(games("p2", "Zed", "MIDDLE", 3, 200));

        let kept = filter_by_playrate(&records, PlayrateColumn::Champion, 7.0);

        assert!(kept.iter().any(|r| r.puuid == "p2" && r.champion_name == "Zed"));
        assert!(!kept.iter().any(|r| r.puuid == "p1" && r.champion_name == "Zed"));
    }

    #[test]
    fn test_filter_by_position() {
        let mut records = games("p1", "Ahri", "MIDDLE", 8, 0);
        records.extend(games("p1", "Ahri", "TOP", 1, 100));

        let kept = filter_by_playrate(&records, PlayrateColumn::Position, 20.0);
        assert_eq!(kept.len(), 8);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut records = games("p1", "Ahri", "MIDDLE", 10, 0);
        records.extend(games("p1", "Zed", "MIDDLE", 1, 100));
        records.extend(games("p1", "Lux", "MIDDLE", 1, 200));
        records.extend(games("p1", "Vex", "MIDDLE", 2, 300));
        records.extend(games("p2", "Vex", "MIDDLE", 1, 400));

        let once = filter_by_playrate(&records, PlayrateColumn::Champion, 10.0);
        let twice = filter_by_playrate(&once, PlayrateColumn::Champion, 10.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_by_playrate(&[], PlayrateColumn::Champion, 7.0).is_empty());
    }
}
