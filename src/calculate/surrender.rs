//! Surrender timing analysis.

use std::collections::{BTreeMap, BTreeSet};

use super::round_to;
use crate::models::{GameRecord, MinuteBucket, SurrenderSummary};

/// Concessions shorter than this are left out of the minute distribution.
pub const MIN_BUCKETED_DURATION_SECS: i64 = 900;

/// Concessions shorter than this count as ending before 20 minutes.
pub const EARLY_SURRENDER_LIMIT_SECS: i64 = 1200;

/// Minute distribution of concessions and the raw concession counts.
///
/// The before-20 count covers every concession of at least one second,
/// while the distribution only covers concessions of at least
/// [`MIN_BUCKETED_DURATION_SECS`]. The two subsets overlap but are filtered
/// independently.
pub fn analyze_surrenders(records: &[GameRecord]) -> (Vec<MinuteBucket>, SurrenderSummary) {
    let total_games = records
        .iter()
        .map(|r| r.game_id)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let surrendered: Vec<&GameRecord> = records
        .iter()
        .filter(|r| r.game_ended_in_surrender)
        .collect();

    let ended_before_20 = surrendered
        .iter()
        .filter(|r| r.game_duration >= 1 && r.game_duration < EARLY_SURRENDER_LIMIT_SECS)
        .count() as u32;

    let mut minute_counts: BTreeMap<i64, u32> = BTreeMap::new();
    for record in surrendered
        .iter()
        .filter(|r| r.game_duration >= MIN_BUCKETED_DURATION_SECS)
    {
        *minute_counts.entry(record.game_duration / 60).or_default() += 1;
    }
    let bucketed: u32 = minute_counts.values().sum();

    let buckets = minute_counts
        .into_iter()
        .map(|(minute, count)| MinuteBucket {
            minute,
            percent: round_to(count as f64 / bucketed as f64 * 100.0, 2),
        })
        .collect();

    let total_surrenders = surrendered.len() as u32;
    let summary = SurrenderSummary {
        total_games,
        total_surrenders,
        ended_before_20,
        ended_after_20: total_surrenders - ended_before_20,
    };

    (buckets, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn surrendered(game_id: i64, duration: i64) -> GameRecord {
        let mut r = record("p1", game_id, "Ahri", "MIDDLE", false, duration);
        r.game_ended_in_surrender = true;
        r
    }

    #[test]
    fn test_minute_buckets() {
        let records = vec![
            surrendered(1, 901),
            surrendered(2, 905),
            surrendered(3, 1205),
            surrendered(4, 1800),
        ];

        let (buckets, summary) = analyze_surrenders(&records);

        let minutes: Vec<_> = buckets.iter().map(|b| b.minute).collect();
        assert_eq!(minutes, vec![15, 20, 30]);
        assert_eq!(buckets[0].percent, 50.0);
        assert_eq!(buckets[1].percent, 25.0);
        assert_eq!(buckets[2].percent, 25.0);

        assert_eq!(summary.total_surrenders, 4);
        assert_eq!(summary.ended_before_20, 2);
        assert_eq!(summary.ended_after_20, 2);
    }

    #[test]
    fn test_before_20_counts_games_under_bucket_floor() {
        let records = vec![
            surrendered(1, 901),
            surrendered(2, 905),
            surrendered(3, 1205),
            surrendered(4, 1800),
            surrendered(5, 300),
        ];

        let (buckets, summary) = analyze_surrenders(&records);

        // 300s is outside the distribution but still ended before 20 minutes
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].percent, 50.0);
        assert_eq!(summary.ended_before_20, 3);
        assert_eq!(summary.total_surrenders, 5);
        assert_eq!(summary.ended_after_20, 2);
    }

    #[test]
    fn test_zero_second_surrender_is_not_early() {
        let (_, summary) = analyze_surrenders(&[surrendered(1, 0)]);
        assert_eq!(summary.ended_before_20, 0);
        assert_eq!(summary.ended_after_20, 1);
    }

    #[test]
    fn test_total_games_counts_distinct_ids() {
        let mut records = vec![
            record("p1", 1, "Ahri", "MIDDLE", true, 1800),
            record("p2", 1, "Zed", "MIDDLE", false, 1800),
            record("p1", 2, "Ahri", "MIDDLE", true, 2000),
        ];
        records.push(surrendered(3, 1500));

        let (buckets, summary) = analyze_surrenders(&records);
        assert_eq!(summary.total_games, 3);
        assert_eq!(summary.total_surrenders, 1);
        assert_eq!(buckets, vec![MinuteBucket { minute: 25, percent: 100.0 }]);
    }

    #[test]
    fn test_no_surrenders() {
        let (buckets, summary) =
            analyze_surrenders(&[record("p1", 1, "Ahri", "MIDDLE", true, 1800)]);
        assert!(buckets.is_empty());
        assert_eq!(summary.total_surrenders, 0);
        assert_eq!(summary.total_games, 1);
    }
}
