//! Surrender (concession) timing models.

use serde::{Deserialize, Serialize};

use crate::calculate::round_to;

/// Share of bucketed concessions that ended in one game minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinuteBucket {
    pub minute: i64,
    /// Percentage of bucketed concessions (2 decimals)
    pub percent: f64,
}

/// Raw concession counts for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurrenderSummary {
    /// Distinct games analysed
    pub total_games: u32,
    /// Games that ended in a concession
    pub total_surrenders: u32,
    /// Concessions between 1 and 1199 seconds
    pub ended_before_20: u32,
    /// `total_surrenders - ended_before_20`
    pub ended_after_20: u32,
}

impl SurrenderSummary {
    /// Percentages in the shape of the reference surrender table.
    pub fn percentages(&self) -> SurrenderReference {
        SurrenderReference {
            percent_surrendered: percent(self.total_surrenders, self.total_games),
            percent_before_20: percent(self.ended_before_20, self.total_surrenders),
            percent_after_20: percent(self.ended_after_20, self.total_surrenders),
        }
    }
}

fn percent(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(part as f64 / total as f64 * 100.0, 2)
    }
}

/// Reference population surrender percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurrenderReference {
    pub percent_surrendered: f64,
    pub percent_before_20: f64,
    pub percent_after_20: f64,
}
