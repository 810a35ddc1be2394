//! JSONL (JSON Lines) output tables.
//!
//! Each analysis table is written to its own file under the player's output
//! directory, one JSON object per row.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::calculate::PlayerAnalysis;

/// Analysis tables written as JSONL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTable {
    Stats,
    Highlights,
    MultiKills,
    WinRates,
    Durations,
    SurrenderCurve,
}

impl OutputTable {
    pub const ALL: [OutputTable; 6] = [
        OutputTable::Stats,
        OutputTable::Highlights,
        OutputTable::MultiKills,
        OutputTable::WinRates,
        OutputTable::Durations,
        OutputTable::SurrenderCurve,
    ];

    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            OutputTable::Stats => "stats.jsonl",
            OutputTable::Highlights => "highlights.jsonl",
            OutputTable::MultiKills => "multi_kills.jsonl",
            OutputTable::WinRates => "win_rates.jsonl",
            OutputTable::Durations => "durations.jsonl",
            OutputTable::SurrenderCurve => "surrender_curve.jsonl",
        }
    }

    /// Path of this table for one player.
    pub fn path(&self, config: &StorageConfig, player: &str) -> PathBuf {
        config.player_output_dir(player).join(self.filename())
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_table(config: &StorageConfig, table: OutputTable, player: &str) -> Self {
        Self::new(table.path(config, player))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {:?}", rows.len(), self.path);
        Ok(rows.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_table(config: &StorageConfig, table: OutputTable, player: &str) -> Self {
        Self::new(table.path(config, player))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all rows; a missing file reads as empty and malformed lines are
    /// skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut rows = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(row) => rows.push(row),
                Err(e) => warn!("Failed to parse line {} in {:?}: {}", index + 1, self.path, e),
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}

/// Write every table of an analysis, returning the number of rows written.
pub fn write_analysis(
    config: &StorageConfig,
    player: &str,
    analysis: &PlayerAnalysis,
) -> Result<usize, StorageError> {
    let mut total = 0;
    for table in OutputTable::ALL {
        total += match table {
            OutputTable::Stats => {
                JsonlWriter::for_table(config, table, player).write_all(&analysis.stats)?
            }
            OutputTable::Highlights => {
                JsonlWriter::for_table(config, table, player).write_all(&analysis.highlights)?
            }
            OutputTable::MultiKills => {
                JsonlWriter::for_table(config, table, player).write_all(&analysis.multi_kills)?
            }
            OutputTable::WinRates => {
                JsonlWriter::for_table(config, table, player).write_all(&analysis.win_rates)?
            }
            OutputTable::Durations => {
                JsonlWriter::for_table(config, table, player).write_all(&analysis.durations)?
            }
            OutputTable::SurrenderCurve => JsonlWriter::for_table(config, table, player)
                .write_all(&analysis.surrender_curve)?,
        };
    }

    info!(
        "Wrote {} rows to {:?}",
        total,
        config.player_output_dir(player)
    );
    Ok(total)
}
