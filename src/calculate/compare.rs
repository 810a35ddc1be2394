//! Reference joins and highlight detection.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::{
    ColumnSummary, ComparisonRow, Direction, HighlightRow, MultiKillComparison, MultiKillRow,
    ReferenceSet, StatKind,
};

/// Left join: every left row is kept, paired with its first matching right
/// row or `None`.
///
/// Duplicate right keys keep the first occurrence.
pub fn left_join<L, R, K, FL, FR>(
    left: Vec<L>,
    right: &[R],
    left_key: FL,
    right_key: FR,
) -> Vec<(L, Option<R>)>
where
    R: Clone,
    K: Ord,
    FL: Fn(&L) -> K,
    FR: Fn(&R) -> K,
{
    let mut index: BTreeMap<K, &R> = BTreeMap::new();
    let mut duplicates = 0usize;
    for row in right {
        let key = right_key(row);
        if index.contains_key(&key) {
            duplicates += 1;
            continue;
        }
        index.insert(key, row);
    }
    if duplicates > 0 {
        warn!("Ignored {} duplicate reference rows in join", duplicates);
    }

    left.into_iter()
        .map(|row| {
            let matched = index.get(&left_key(&row)).map(|r| (*r).clone());
            (row, matched)
        })
        .collect()
}

/// Join player summaries with champion-level and global reference rows.
///
/// Champion-level rows match on (champion, position, win, column); global
/// rows match on (position, win, column).
pub fn join_reference(summaries: Vec<ColumnSummary>, reference: &ReferenceSet) -> Vec<ComparisonRow> {
    let (champion_rows, global_rows) = reference.partition_stats();

    let with_champion = left_join(
        summaries,
        &champion_rows,
        |s| (s.key.clone(), s.column),
        |r| r.champion_key(),
    );
    let with_global = left_join(
        with_champion,
        &global_rows,
        |(s, _)| (s.key.without_champion(), s.column),
        |r| r.role_key(),
    );

    let rows: Vec<ComparisonRow> = with_global
        .into_iter()
        .map(|((summary, champion_ref), global_ref)| ComparisonRow {
            key: summary.key,
            column: summary.column,
            player: summary.stats,
            reference: champion_ref.map(|r| r.stats),
            global: global_ref.map(|r| r.stats),
        })
        .collect();

    debug!(
        "Joined {} summaries: {} with champion reference, {} with global reference",
        rows.len(),
        rows.iter().filter(|r| r.reference.is_some()).count(),
        rows.iter().filter(|r| r.global.is_some()).count()
    );
    rows
}

/// Join multi-kill means with the reference means on (champion, position, win).
pub fn join_multi_kills(
    rows: Vec<MultiKillRow>,
    reference: &[MultiKillRow],
) -> Vec<MultiKillComparison> {
    left_join(rows, reference, |r| r.key.clone(), |r| r.key.clone())
        .into_iter()
        .map(|(row, reference)| MultiKillComparison {
            key: row.key,
            player: row.kills,
            reference: reference.map(|r| r.kills),
        })
        .collect()
}

/// Classify `(player, reference)` pairs.
///
/// `Ahead` when every player value is strictly greater, `Behind` when every
/// one is strictly lower; mixed signals, ties and empty input give `None`.
pub fn classify(pairs: &[(f64, f64)]) -> Option<Direction> {
    if pairs.is_empty() {
        return None;
    }
    if pairs.iter().all(|(p, r)| p > r) {
        Some(Direction::Ahead)
    } else if pairs.iter().all(|(p, r)| p < r) {
        Some(Direction::Behind)
    } else {
        None
    }
}

/// Rows where the player is uniformly ahead of or behind the champion
/// reference across `kinds`.
///
/// A row missing either its champion or its global reference is skipped.
pub fn detect_highlights(rows: &[ComparisonRow], kinds: &[StatKind]) -> Vec<HighlightRow> {
    rows.iter()
        .filter_map(|row| {
            if row.global.is_none() {
                return None;
            }
            let reference = row.reference.as_ref()?;
            let direction = classify(&row.player.paired_with(reference, kinds))?;
            Some(HighlightRow {
                direction,
                row: row.clone(),
            })
        })
        .collect()
}
