//! Grouped mean/quartile aggregation and wide/long reshaping.

use std::collections::BTreeMap;

use tracing::debug;

use super::{round_to, CalculateError, MetricRow};
use crate::models::{
    Column, ColumnSummary, GroupBy, GroupKey, Quartiles, StatKind, StatRow, WideColumn,
    WideStatRow,
};

/// Decimal places kept for aggregated statistics.
pub const STAT_DECIMALS: i32 = 4;

/// Percentile of sorted values using linear interpolation between order
/// statistics (R-7).
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let n = sorted.len();
    let rank = p / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;

    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Mean and Q1/Q2/Q3 of `values`, rounded to [`STAT_DECIMALS`].
pub fn quartiles(values: &[f64]) -> Option<Quartiles> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(Quartiles {
        avg: round_to(mean, STAT_DECIMALS),
        q1: round_to(percentile(&sorted, 25.0)?, STAT_DECIMALS),
        q2: round_to(percentile(&sorted, 50.0)?, STAT_DECIMALS),
        q3: round_to(percentile(&sorted, 75.0)?, STAT_DECIMALS),
    })
}

/// Every `{statKind}_{column}` name must split back into its parts.
fn check_column_names(columns: &[Column]) -> Result<(), CalculateError> {
    for column in columns {
        for kind in StatKind::ALL {
            let name = WideColumn::new(kind, *column).to_string();
            let parsed: WideColumn = name.parse()?;
            debug_assert_eq!(parsed, WideColumn::new(kind, *column));
        }
    }
    Ok(())
}

/// Order groups by (position, win) descending. The sort is stable, so
/// champions stay ascending within each (position, win).
fn sort_groups(rows: &mut [WideStatRow]) {
    rows.sort_by(|a, b| (b.key.position, b.key.win).cmp(&(a.key.position, a.key.win)));
}

/// Aggregate `columns` per group into a wide table.
///
/// Rows are ordered by position then win, both descending, with champions
/// ascending inside each (position, win).
pub fn aggregate(
    rows: &[MetricRow],
    columns: &[Column],
    group_by: GroupBy,
) -> Result<Vec<WideStatRow>, CalculateError> {
    check_column_names(columns)?;

    let mut groups: BTreeMap<GroupKey, Vec<&MetricRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.key(group_by)).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let mut values = BTreeMap::new();

        for column in columns {
            let samples = members
                .iter()
                .map(|r| {
                    r.get(*column).ok_or(CalculateError::MissingColumn {
                        column: *column,
                        game_id: r.game_id,
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            // Groups are never empty.
            if let Some(q) = quartiles(&samples) {
                for kind in StatKind::ALL {
                    values.insert(WideColumn::new(kind, *column), q.get(kind));
                }
            }
        }

        out.push(WideStatRow { key, values });
    }
    sort_groups(&mut out);

    debug!(
        "Aggregated {} rows into {} groups over {} columns",
        rows.len(),
        out.len(),
        columns.len()
    );
    Ok(out)
}

/// Wide to long: one row per (group, column, statistic kind).
pub fn melt(wide: &[WideStatRow]) -> Vec<StatRow> {
    let mut out = Vec::new();

    for row in wide {
        let mut by_column: BTreeMap<Column, Vec<(StatKind, f64)>> = BTreeMap::new();
        for (wc, value) in &row.values {
            by_column
                .entry(wc.column)
                .or_default()
                .push((wc.kind, *value));
        }

        for (column, stats) in by_column {
            for (kind, value) in stats {
                out.push(StatRow {
                    key: row.key.clone(),
                    column,
                    kind,
                    value,
                });
            }
        }
    }

    out
}

/// Long to wide, the inverse of [`melt`]. Rows come back in [`aggregate`]
/// order.
pub fn unmelt(long: &[StatRow]) -> Vec<WideStatRow> {
    let mut groups: BTreeMap<GroupKey, BTreeMap<WideColumn, f64>> = BTreeMap::new();
    for row in long {
        groups
            .entry(row.key.clone())
            .or_default()
            .insert(WideColumn::new(row.kind, row.column), row.value);
    }

    let mut rows: Vec<WideStatRow> = groups
        .into_iter()
        .map(|(key, values)| WideStatRow { key, values })
        .collect();
    sort_groups(&mut rows);
    rows
}

/// Long rows to one [`ColumnSummary`] per (group, column).
///
/// Every statistic kind must be present. Output is ordered by group key,
/// then column.
pub fn pivot(long: &[StatRow]) -> Result<Vec<ColumnSummary>, CalculateError> {
    let mut cells: BTreeMap<(GroupKey, Column), BTreeMap<StatKind, f64>> = BTreeMap::new();
    for row in long {
        cells
            .entry((row.key.clone(), row.column))
            .or_default()
            .insert(row.kind, row.value);
    }

    cells
        .into_iter()
        .map(|((key, column), stats)| {
            let mut q = Quartiles {
                avg: 0.0,
                q1: 0.0,
                q2: 0.0,
                q3: 0.0,
            };
            for kind in StatKind::ALL {
                let value = stats
                    .get(&kind)
                    .ok_or(CalculateError::MissingStatistic { column, kind })?;
                q.set(kind, *value);
            }
            Ok(ColumnSummary {
                key,
                column,
                stats: q,
            })
        })
        .collect()
}
