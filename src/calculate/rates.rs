//! Numeric projections of game records and per-minute normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{round_to, CalculateError};
use crate::models::{Column, GameRecord, GroupBy, GroupKey, Metric, Position};

/// Decimal places kept for per-minute rates.
pub const RATE_DECIMALS: i32 = 3;

/// Grouping fields of a record plus the numeric columns being aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub game_id: i64,
    pub puuid: String,
    pub champion: String,
    pub position: Position,
    pub win: bool,
    /// Seconds
    pub game_duration: i64,
    pub values: BTreeMap<Column, f64>,
}

impl MetricRow {
    pub fn key(&self, group_by: GroupBy) -> GroupKey {
        match group_by {
            GroupBy::Role => GroupKey::role(self.position, self.win),
            GroupBy::ChampionRole => {
                GroupKey::champion_role(self.champion.clone(), self.position, self.win)
            }
        }
    }

    pub fn get(&self, column: Column) -> Option<f64> {
        self.values.get(&column).copied()
    }
}

/// Project records onto per-game values of `metrics`.
pub fn project(records: &[GameRecord], metrics: &[Metric]) -> Vec<MetricRow> {
    records
        .iter()
        .map(|r| MetricRow {
            game_id: r.game_id,
            puuid: r.puuid.clone(),
            champion: r.champion_name.clone(),
            position: r.individual_position,
            win: r.win,
            game_duration: r.game_duration,
            values: metrics
                .iter()
                .map(|m| (Column::per_game(*m), m.value(r)))
                .collect(),
        })
        .collect()
}

/// Convert per-game `columns` into per-minute rates.
///
/// Each value is divided by the game length in minutes and rounded to
/// [`RATE_DECIMALS`]; the column is replaced by its per-minute variant.
/// Columns not listed are carried over unchanged.
pub fn per_minute(rows: &[MetricRow], columns: &[Column]) -> Result<Vec<MetricRow>, CalculateError> {
    if let Some(column) = columns.iter().find(|c| c.per_minute) {
        return Err(CalculateError::AlreadyPerMinute { column: *column });
    }

    rows.iter()
        .map(|row| {
            if row.game_duration <= 0 {
                return Err(CalculateError::ZeroDuration {
                    game_id: row.game_id,
                    duration: row.game_duration,
                });
            }
            let minutes = row.game_duration as f64 / 60.0;

            let mut out = row.clone();
            for column in columns {
                let value = out
                    .values
                    .remove(column)
                    .ok_or(CalculateError::MissingColumn {
                        column: *column,
                        game_id: row.game_id,
                    })?;
                out.values.insert(
                    Column::per_minute(column.metric),
                    round_to(value / minutes, RATE_DECIMALS),
                );
            }
            Ok(out)
        })
        .collect()
}

/// Replace the game-duration column with the duration in minutes.
pub fn duration_in_minutes(rows: &[MetricRow]) -> Vec<MetricRow> {
    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            out.values.insert(
                Column::per_game(Metric::GameDuration),
                round_to(row.game_duration as f64 / 60.0, RATE_DECIMALS),
            );
            out
        })
        .collect()
}
