//! Statistics calculation engine.
//!
//! Pure, synchronous transformations from typed game records (plus reference
//! tables) to derived tables:
//! - Grouped mean/quartile aggregation and wide/long reshaping
//! - Per-minute rate normalization
//! - Playrate filtering
//! - Reference joins and highlight detection
//! - Surrender timing, multi-kill and win-rate reductions

pub mod aggregate;
pub mod compare;
pub mod pipeline;
pub mod playrate;
pub mod rates;
pub mod reductions;
pub mod surrender;

pub use aggregate::{aggregate, melt, percentile, pivot, quartiles, unmelt};
pub use compare::{classify, detect_highlights, join_multi_kills, join_reference, left_join};
pub use pipeline::{analyze, build_reference, PlayerAnalysis};
pub use playrate::{filter_by_playrate, PlayrateColumn};
pub use rates::{per_minute, project, MetricRow};
pub use reductions::{multi_kills, spell_casts, spell_casts_per_champion, win_rates};
pub use surrender::analyze_surrenders;

use thiserror::Error;

use crate::models::{Column, ColumnParseError, StatKind};

/// Domain invariant violations raised by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculateError {
    #[error("Game {game_id} has a non-positive duration ({duration}s)")]
    ZeroDuration { game_id: i64, duration: i64 },

    #[error("Invalid statistic column: {0}")]
    InvalidColumnName(#[from] ColumnParseError),

    #[error("Column {column} is missing from game {game_id}")]
    MissingColumn { column: Column, game_id: i64 },

    #[error("Column {column} is already a per-minute rate")]
    AlreadyPerMinute { column: Column },

    #[error("Statistic {kind} of column {column} is missing")]
    MissingStatistic { column: Column, kind: StatKind },

    #[error("No games to analyse")]
    EmptyInput,

    #[error("No games found for queues {ranked} or {fallback}")]
    NoQueueGames { ranked: i64, fallback: i64 },
}

/// Round half to even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(2.0 / 3.0, 3), 0.667);
        assert_eq!(round_to(10.0, 2), 10.0);
    }

    #[test]
    fn test_round_to_half_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }
}
