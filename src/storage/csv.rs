//! CSV storage for raw game rows and reference tables.
//!
//! Every file is header-less. Raw game rows hold one participant per line
//! in [`GAME_RECORD_SCHEMA`](crate::models::GAME_RECORD_SCHEMA) order, and
//! reference table fields are matched by position in declaration order.

use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use super::StorageError;
use crate::config::ReferenceFiles;
use crate::ingest::{normalize_rows, IngestPolicy, NormalizeResult};
use crate::models::{
    parse_bool, Column, DurationReference, GameRecord, GroupKey, MinuteBucket, MultiKillRow,
    MultiKills, Position, Quartiles, ReferenceRow, ReferenceSet, SurrenderReference,
};

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Read header-less raw rows as strings.
///
/// Rows of any length are accepted here; field count is checked when the
/// row is coerced.
pub fn read_game_rows(path: &Path) -> Result<Vec<Vec<String>>, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!("Read {} raw rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Read and normalize one player's raw rows.
///
/// Under [`IngestPolicy::FailFast`] the first invalid row is reported with
/// its 1-based line number.
pub fn load_games(path: &Path, policy: IngestPolicy) -> Result<NormalizeResult, StorageError> {
    let rows = read_game_rows(path)?;

    normalize_rows(&rows, policy).map_err(|source| {
        let line = rows
            .iter()
            .position(|row| GameRecord::from_fields(row.as_slice()).is_err())
            .map_or(0, |index| index + 1);
        StorageError::Coercion {
            path: path.to_path_buf(),
            line,
            source,
        }
    })
}

/// Booleans in reference tables may be written as `True`/`False`.
fn loose_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_bool("win", &raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Serialize, Deserialize)]
struct StatRecord {
    champion: String,
    position: Position,
    #[serde(deserialize_with = "loose_bool")]
    win: bool,
    column: Column,
    #[serde(rename = "AVG")]
    avg: f64,
    #[serde(rename = "Q1")]
    q1: f64,
    #[serde(rename = "Q2")]
    q2: f64,
    #[serde(rename = "Q3")]
    q3: f64,
}

impl From<StatRecord> for ReferenceRow {
    fn from(r: StatRecord) -> Self {
        ReferenceRow {
            champion: r.champion,
            position: r.position,
            win: r.win,
            column: r.column,
            stats: Quartiles {
                avg: r.avg,
                q1: r.q1,
                q2: r.q2,
                q3: r.q3,
            },
        }
    }
}

impl From<&ReferenceRow> for StatRecord {
    fn from(r: &ReferenceRow) -> Self {
        StatRecord {
            champion: r.champion.clone(),
            position: r.position,
            win: r.win,
            column: r.column,
            avg: r.stats.avg,
            q1: r.stats.q1,
            q2: r.stats.q2,
            q3: r.stats.q3,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultiKillRecord {
    champion: String,
    position: Position,
    #[serde(deserialize_with = "loose_bool")]
    win: bool,
    double_kills: f64,
    triple_kills: f64,
    quadra_kills: f64,
    penta_kills: f64,
}

impl From<MultiKillRecord> for MultiKillRow {
    fn from(r: MultiKillRecord) -> Self {
        MultiKillRow {
            key: GroupKey::champion_role(r.champion, r.position, r.win),
            kills: MultiKills {
                double_kills: r.double_kills,
                triple_kills: r.triple_kills,
                quadra_kills: r.quadra_kills,
                penta_kills: r.penta_kills,
            },
        }
    }
}

impl From<&MultiKillRow> for MultiKillRecord {
    fn from(r: &MultiKillRow) -> Self {
        MultiKillRecord {
            champion: r.key.champion.clone().unwrap_or_default(),
            position: r.key.position,
            win: r.key.win,
            double_kills: r.kills.double_kills,
            triple_kills: r.kills.triple_kills,
            quadra_kills: r.kills.quadra_kills,
            penta_kills: r.kills.penta_kills,
        }
    }
}

/// Read a header-less table; a missing file yields `None`.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, StorageError> {
    if !path.exists() {
        warn!("Reference table {:?} not found", path);
        return Ok(None);
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;

    debug!("Read {} rows from {:?}", rows.len(), path);
    Ok(Some(rows))
}

/// Write a header-less table, replacing the file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize, StorageError> {
    ensure_parent(path)?;

    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(rows.len())
}

/// Load every reference table found in `dir`.
///
/// Missing tables are logged and left empty; the analysis then runs
/// without the corresponding comparison.
pub fn load_reference_set(dir: &Path, files: &ReferenceFiles) -> Result<ReferenceSet, StorageError> {
    let stats: Vec<ReferenceRow> = read_table::<StatRecord>(&dir.join(&files.stats))?
        .unwrap_or_default()
        .into_iter()
        .map(ReferenceRow::from)
        .collect();

    let multi_kills: Vec<MultiKillRow> =
        read_table::<MultiKillRecord>(&dir.join(&files.multi_kills))?
            .unwrap_or_default()
            .into_iter()
            .map(MultiKillRow::from)
            .collect();

    let duration = read_table::<DurationReference>(&dir.join(&files.duration))?
        .and_then(|rows| rows.into_iter().next());

    let surrender_curve = read_table::<MinuteBucket>(&dir.join(&files.surrender_curve))?
        .unwrap_or_default();

    let surrender = read_table::<SurrenderReference>(&dir.join(&files.surrender_stats))?
        .and_then(|rows| rows.into_iter().next());

    info!(
        "Loaded reference from {:?}: {} statistic rows, {} multi-kill rows",
        dir,
        stats.len(),
        multi_kills.len()
    );

    Ok(ReferenceSet {
        stats,
        multi_kills,
        duration,
        surrender_curve,
        surrender,
    })
}

/// Write every reference table into `dir`.
pub fn write_reference_set(
    dir: &Path,
    files: &ReferenceFiles,
    reference: &ReferenceSet,
) -> Result<(), StorageError> {
    let stats: Vec<StatRecord> = reference.stats.iter().map(StatRecord::from).collect();
    write_table(&dir.join(&files.stats), &stats)?;

    let multi_kills: Vec<MultiKillRecord> =
        reference.multi_kills.iter().map(MultiKillRecord::from).collect();
    write_table(&dir.join(&files.multi_kills), &multi_kills)?;

    if let Some(duration) = reference.duration {
        write_table(&dir.join(&files.duration), &[duration])?;
    }
    write_table(&dir.join(&files.surrender_curve), &reference.surrender_curve)?;
    if let Some(surrender) = reference.surrender {
        write_table(&dir.join(&files.surrender_stats), &[surrender])?;
    }

    info!("Wrote reference tables to {:?}", dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::raw_row;
    use crate::models::{CoercionError, Metric, GLOBAL_CHAMPION};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_rows(path: &Path, rows: &[Vec<String>]) {
        let lines: Vec<String> = rows.iter().map(|row| row.join(",")).collect();
        fs::write(path, lines.join("\n")).unwrap();
    }

    fn reference() -> ReferenceSet {
        let stats = Quartiles {
            avg: 5.25,
            q1: 3.0,
            q2: 5.0,
            q3: 7.5,
        };
        ReferenceSet {
            stats: vec![
                ReferenceRow {
                    champion: "Ahri".to_string(),
                    position: Position::Middle,
                    win: true,
                    column: Metric::Kills.into(),
                    stats,
                },
                ReferenceRow {
                    champion: GLOBAL_CHAMPION.to_string(),
                    position: Position::Middle,
                    win: false,
                    column: Column::per_minute(Metric::TotalDamageDealtToChampions),
                    stats,
                },
            ],
            multi_kills: vec![MultiKillRow {
                key: GroupKey::champion_role("Ahri", Position::Middle, true),
                kills: MultiKills {
                    double_kills: 0.8,
                    triple_kills: 0.2,
                    quadra_kills: 0.05,
                    penta_kills: 0.01,
                },
            }],
            duration: Some(DurationReference {
                average: 29.5,
                q1: 24.0,
                median: 29.0,
                q3: 34.0,
            }),
            surrender_curve: vec![
                MinuteBucket {
                    minute: 15,
                    percent: 40.0,
                },
                MinuteBucket {
                    minute: 20,
                    percent: 60.0,
                },
            ],
            surrender: Some(SurrenderReference {
                percent_surrendered: 25.0,
                percent_before_20: 40.0,
                percent_after_20: 60.0,
            }),
        }
    }

    #[test]
    fn test_reference_set_write_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let files = ReferenceFiles::default();

        write_reference_set(temp_dir.path(), &files, &reference()).unwrap();
        let loaded = load_reference_set(temp_dir.path(), &files).unwrap();

        assert_eq!(loaded, reference());
    }

    #[test]
    fn test_stats_table_has_no_header() {
        let temp_dir = TempDir::new().unwrap();
        let files = ReferenceFiles::default();
        write_reference_set(temp_dir.path(), &files, &reference()).unwrap();

        let content = fs::read_to_string(temp_dir.path().join(&files.stats)).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Ahri,MIDDLE,true,kills,5.25,3.0,5.0,7.5"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_load_existing_reference_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let files = ReferenceFiles::default();
        fs::write(
            dir.join(&files.stats),
            "Ahri,MIDDLE,True,kills,5.0,3.0,5.0,7.0\nGLOBAL,MIDDLE,True,kills,4.0,2.0,4.0,6.0\n",
        )
        .unwrap();
        fs::write(
            dir.join(&files.multi_kills),
            "Ahri,MIDDLE,False,0.5,0.1,0.0,0.0\n",
        )
        .unwrap();
        fs::write(dir.join(&files.duration), "29.5,24.0,29.0,34.0\n").unwrap();
        fs::write(dir.join(&files.surrender_curve), "15,40.0\n20,60.0\n").unwrap();
        fs::write(dir.join(&files.surrender_stats), "25.0,40.0,60.0\n").unwrap();

        let loaded = load_reference_set(dir, &files).unwrap();

        assert_eq!(loaded.stats.len(), 2);
        assert_eq!(loaded.stats[0].champion, "Ahri");
        assert_eq!(loaded.stats[0].stats.q3, 7.0);
        assert!(loaded.stats[1].is_global());
        assert_eq!(loaded.multi_kills[0].kills.double_kills, 0.5);
        assert!(!loaded.multi_kills[0].key.win);
        assert_eq!(
            loaded.duration,
            Some(DurationReference {
                average: 29.5,
                q1: 24.0,
                median: 29.0,
                q3: 34.0,
            })
        );
        assert_eq!(loaded.surrender_curve.len(), 2);
        assert_eq!(loaded.surrender.map(|s| s.percent_after_20), Some(60.0));
    }

    #[test]
    fn test_missing_tables_are_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = load_reference_set(temp_dir.path(), &ReferenceFiles::default()).unwrap();
        assert_eq!(loaded, ReferenceSet::default());
    }

    #[test]
    fn test_python_style_booleans() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stats.csv");
        fs::write(
            &path,
            "Zed,MIDDLE,True,deathsPerMins,0.2,0.1,0.2,0.3\n",
        )
        .unwrap();

        let rows = read_table::<StatRecord>(&path).unwrap().unwrap();
        let row = ReferenceRow::from(rows.into_iter().next().unwrap());
        assert!(row.win);
        assert_eq!(row.column, Column::per_minute(Metric::Deaths));
    }

    #[test]
    fn test_invalid_column_name_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stats.csv");
        fs::write(
            &path,
            "Zed,MIDDLE,true,notAColumn,1,1,1,1\n",
        )
        .unwrap();

        assert!(matches!(
            read_table::<StatRecord>(&path),
            Err(StorageError::Csv(_))
        ));
    }

    #[test]
    fn test_read_game_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("player-1.csv");
        let rows = vec![raw_row(&[("gameId", "1")]), raw_row(&[("gameId", "2")])];

        write_rows(&path, &rows);
        assert_eq!(read_game_rows(&path).unwrap(), rows);

        let result = load_games(&path, IngestPolicy::FailFast).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].game_id, 2);
    }

    #[test]
    fn test_load_games_reports_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("player-1.csv");
        let rows = vec![
            raw_row(&[("gameId", "1")]),
            raw_row(&[("gameId", "2"), ("win", "maybe")]),
        ];
        write_rows(&path, &rows);

        match load_games(&path, IngestPolicy::FailFast) {
            Err(StorageError::Coercion { line, source, .. }) => {
                assert_eq!(line, 2);
                assert!(matches!(
                    source,
                    CoercionError::InvalidValue { field: "win", .. }
                ));
            }
            other => panic!("expected coercion error, got {:?}", other),
        }

        let skipped = load_games(&path, IngestPolicy::SkipInvalid).unwrap();
        assert_eq!(skipped.records.len(), 1);
        assert_eq!(skipped.skipped[0].0, 1);
    }

    #[test]
    fn test_missing_game_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nobody.csv");
        assert!(matches!(
            read_game_rows(&path),
            Err(StorageError::PathNotFound(_))
        ));
    }
}
