//! Flat-file storage.
//!
//! Handles reading and writing the local data directory:
//! - Raw game rows (header-less CSV, one file per player)
//! - Reference tables (CSV)
//! - Analysis output (JSON, JSONL and Parquet)

pub mod csv;
pub mod jsonl;
pub mod parquet;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{CoercionError, ColumnParseError};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("{path:?} line {line}: {source}")]
    Coercion {
        path: PathBuf,
        line: usize,
        source: CoercionError,
    },

    #[error("Invalid column name: {0}")]
    Column(#[from] ColumnParseError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Raw game rows, one CSV per player
    pub fn games_dir(&self) -> PathBuf {
        self.data_dir.join("games")
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.data_dir.join("reference")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("output")
    }

    /// Raw rows of one player.
    pub fn games_path(&self, player: &str) -> PathBuf {
        self.games_dir().join(format!("{}.csv", player))
    }

    /// Output directory of one player's analysis.
    pub fn player_output_dir(&self, player: &str) -> PathBuf {
        self.output_dir().join(player)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.games_dir(), PathBuf::from("/data/games"));
        assert_eq!(config.reference_dir(), PathBuf::from("/data/reference"));
        assert_eq!(config.output_dir(), PathBuf::from("/data/output"));
        assert_eq!(
            config.games_path("player-1"),
            PathBuf::from("/data/games/player-1.csv")
        );
        assert_eq!(
            config.player_output_dir("player-1"),
            PathBuf::from("/data/output/player-1")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_coercion_error_message() {
        let err = StorageError::Coercion {
            path: PathBuf::from("games.csv"),
            line: 3,
            source: CoercionError::UnknownPosition("MID".to_string()),
        };
        assert_eq!(err.to_string(), "\"games.csv\" line 3: Unknown position 'MID'");
    }
}
