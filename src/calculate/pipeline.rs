//! End-to-end analysis of one player's history and reference building.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::aggregate::{aggregate, melt, pivot, quartiles};
use super::compare::{detect_highlights, join_multi_kills, join_reference};
use super::playrate::{filter_by_playrate, PlayrateColumn};
use super::rates::{duration_in_minutes, per_minute, project};
use super::reductions::{multi_kills, spell_casts, spell_casts_per_champion, win_rates};
use super::surrender::analyze_surrenders;
use super::CalculateError;
use crate::config::AnalysisConfig;
use crate::models::{
    ChampionSpellCasts, Column, ColumnSummary, ComparisonRow, DurationReference, GameRecord,
    GroupBy, HighlightRow, Metric, MinuteBucket, MultiKillComparison, ReferenceRow, ReferenceSet,
    SpellCasts, SurrenderReference, SurrenderSummary, WinRateRow, GLOBAL_CHAMPION,
};

/// Everything the presentation layer needs for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnalysis {
    /// Queue the statistics were computed on
    pub queue_id: i64,
    pub games_analyzed: usize,

    /// Player statistics joined with the references
    pub stats: Vec<ComparisonRow>,
    pub highlights: Vec<HighlightRow>,
    pub multi_kills: Vec<MultiKillComparison>,
    pub win_rates: Vec<WinRateRow>,

    /// Game duration in minutes per (position, win)
    pub durations: Vec<ColumnSummary>,
    pub reference_duration: Option<DurationReference>,

    pub surrender_curve: Vec<MinuteBucket>,
    pub surrender_summary: SurrenderSummary,
    pub reference_surrender_curve: Vec<MinuteBucket>,
    pub reference_surrender: Option<SurrenderReference>,

    /// Totals over every queue
    pub spells: SpellCasts,
    pub champion_spells: Vec<ChampionSpellCasts>,
}

/// Records of the ranked queue, or of the fallback queue when there are no
/// ranked games.
pub fn select_queue(
    records: &[GameRecord],
    config: &AnalysisConfig,
) -> Result<(i64, Vec<GameRecord>), CalculateError> {
    for queue_id in [config.ranked_queue_id, config.fallback_queue_id] {
        let games: Vec<GameRecord> = records
            .iter()
            .filter(|r| r.queue_id == queue_id)
            .cloned()
            .collect();
        if !games.is_empty() {
            return Ok((queue_id, games));
        }
        debug!("No games found for queue {}", queue_id);
    }

    Err(CalculateError::NoQueueGames {
        ranked: config.ranked_queue_id,
        fallback: config.fallback_queue_id,
    })
}

/// Per-game statistics for `per_game_metrics` followed by per-minute
/// statistics for `per_minute_metrics`.
pub fn compute_stats(
    records: &[GameRecord],
    per_game_metrics: &[Metric],
    per_minute_metrics: &[Metric],
    group_by: GroupBy,
) -> Result<Vec<ColumnSummary>, CalculateError> {
    let per_game_columns: Vec<Column> = per_game_metrics.iter().map(|m| Column::per_game(*m)).collect();
    let rows = project(records, per_game_metrics);
    let mut summaries = pivot(&melt(&aggregate(&rows, &per_game_columns, group_by)?))?;

    let source_columns: Vec<Column> = per_minute_metrics.iter().map(|m| Column::per_game(*m)).collect();
    let rate_columns: Vec<Column> = per_minute_metrics.iter().map(|m| Column::per_minute(*m)).collect();
    let rate_rows = per_minute(&project(records, per_minute_metrics), &source_columns)?;
    summaries.extend(pivot(&melt(&aggregate(&rate_rows, &rate_columns, group_by)?))?);

    Ok(summaries)
}

/// Game duration (minutes) statistics per (position, win), restricted to the
/// positions each player plays at least `lane_playrate_percent` of the time.
pub fn compute_durations(
    records: &[GameRecord],
    lane_playrate_percent: f64,
) -> Result<Vec<ColumnSummary>, CalculateError> {
    let lane_games = filter_by_playrate(records, PlayrateColumn::Position, lane_playrate_percent);
    let rows = duration_in_minutes(&project(&lane_games, &[]));
    let wide = aggregate(&rows, &[Metric::GameDuration.into()], GroupBy::Role)?;
    pivot(&melt(&wide))
}

/// Analyse one player's game history against the reference tables.
pub fn analyze(
    records: &[GameRecord],
    reference: &ReferenceSet,
    config: &AnalysisConfig,
) -> Result<PlayerAnalysis, CalculateError> {
    if records.is_empty() {
        return Err(CalculateError::EmptyInput);
    }

    let (queue_id, queue_games) = select_queue(records, config)?;
    let champion_games = filter_by_playrate(
        &queue_games,
        PlayrateColumn::Champion,
        config.champion_playrate_percent,
    );
    info!(
        "Analysing {} games from queue {} ({} after champion playrate filter)",
        queue_games.len(),
        queue_id,
        champion_games.len()
    );

    let summaries = compute_stats(
        &champion_games,
        &config.per_game_metrics,
        &config.per_minute_metrics,
        GroupBy::ChampionRole,
    )?;
    let stats = join_reference(summaries, reference);
    let highlights = detect_highlights(&stats, &config.highlight_kinds);
    let multi_kills = join_multi_kills(multi_kills(&champion_games), &reference.multi_kills);

    let durations = compute_durations(&queue_games, config.lane_playrate_percent)?;
    let (surrender_curve, surrender_summary) = analyze_surrenders(&queue_games);

    info!(
        "Computed {} statistics, {} highlights, {} multi-kill groups",
        stats.len(),
        highlights.len(),
        multi_kills.len()
    );

    Ok(PlayerAnalysis {
        queue_id,
        games_analyzed: queue_games.len(),
        stats,
        highlights,
        multi_kills,
        win_rates: win_rates(&champion_games),
        durations,
        reference_duration: reference.duration,
        surrender_curve,
        surrender_summary,
        reference_surrender_curve: reference.surrender_curve.clone(),
        reference_surrender: reference.surrender,
        spells: spell_casts(records),
        champion_spells: spell_casts_per_champion(records),
    })
}

fn to_reference_row(summary: ColumnSummary) -> ReferenceRow {
    ReferenceRow {
        champion: summary
            .key
            .champion
            .unwrap_or_else(|| GLOBAL_CHAMPION.to_string()),
        position: summary.key.position,
        win: summary.key.win,
        column: summary.column,
        stats: summary.stats,
    }
}

/// Build reference tables from a population of games.
///
/// Champion-level rows are grouped by (champion, position, win) and global
/// rows by (position, win), both after the champion playrate filter.
pub fn build_reference(
    records: &[GameRecord],
    config: &AnalysisConfig,
) -> Result<ReferenceSet, CalculateError> {
    if records.is_empty() {
        return Err(CalculateError::EmptyInput);
    }

    let (queue_id, queue_games) = select_queue(records, config)?;
    let champion_games = filter_by_playrate(
        &queue_games,
        PlayrateColumn::Champion,
        config.champion_playrate_percent,
    );

    let mut stats: Vec<ReferenceRow> = Vec::new();
    for group_by in [GroupBy::ChampionRole, GroupBy::Role] {
        let summaries = compute_stats(
            &champion_games,
            &config.per_game_metrics,
            &config.per_minute_metrics,
            group_by,
        )?;
        stats.extend(summaries.into_iter().map(to_reference_row));
    }

    let minutes: Vec<f64> = duration_in_minutes(&project(&queue_games, &[]))
        .iter()
        .filter_map(|r| r.get(Metric::GameDuration.into()))
        .collect();
    let duration = quartiles(&minutes).map(|q| DurationReference {
        average: q.avg,
        q1: q.q1,
        median: q.q2,
        q3: q.q3,
    });

    let (surrender_curve, surrender_summary) = analyze_surrenders(&queue_games);

    info!(
        "Built reference from {} games of queue {}: {} statistic rows",
        queue_games.len(),
        queue_id,
        stats.len()
    );

    Ok(ReferenceSet {
        stats,
        multi_kills: multi_kills(&champion_games),
        duration,
        surrender_curve,
        surrender: Some(surrender_summary.percentages()),
    })
}
