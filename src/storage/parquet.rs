//! Parquet output for analytics.
//!
//! Comparison and duration tables are flattened into columnar form so they
//! can be queried alongside other players' results.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use super::{StorageConfig, StorageError};
use crate::models::{ColumnSummary, ComparisonRow, GroupKey, Quartiles, StatKind};

/// Parquet table types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    Comparisons,
    Durations,
}

impl TableType {
    pub fn filename(&self) -> &'static str {
        match self {
            TableType::Comparisons => "comparisons.parquet",
            TableType::Durations => "durations.parquet",
        }
    }
}

/// Schema definitions for Parquet tables.
pub mod schemas {
    use super::*;

    fn key_fields() -> Vec<Field> {
        vec![
            Field::new("champion", DataType::Utf8, true),
            Field::new("position", DataType::Utf8, false),
            Field::new("win", DataType::Boolean, false),
            Field::new("column", DataType::Utf8, false),
        ]
    }

    fn stat_fields(prefix: &str, nullable: bool) -> Vec<Field> {
        StatKind::ALL
            .iter()
            .map(|kind| {
                let name = format!("{}{}", prefix, kind.prefix().to_lowercase());
                Field::new(name, DataType::Float64, nullable)
            })
            .collect()
    }

    /// Player statistics with the champion (`ref_`) and global (`global_`)
    /// references side by side.
    pub fn comparisons_schema() -> Schema {
        let mut fields = key_fields();
        fields.extend(stat_fields("", false));
        fields.extend(stat_fields("ref_", true));
        fields.extend(stat_fields("global_", true));
        Schema::new(fields)
    }

    pub fn durations_schema() -> Schema {
        let mut fields = key_fields();
        fields.extend(stat_fields("", false));
        Schema::new(fields)
    }
}

fn key_columns<'a>(
    keys: impl Iterator<Item = (&'a GroupKey, String)> + Clone,
) -> Vec<ArrayRef> {
    let champions: Vec<Option<&str>> = keys.clone().map(|(k, _)| k.champion.as_deref()).collect();
    let positions: Vec<&str> = keys.clone().map(|(k, _)| k.position.as_str()).collect();
    let wins: Vec<bool> = keys.clone().map(|(k, _)| k.win).collect();
    let columns: Vec<String> = keys.map(|(_, c)| c).collect();

    vec![
        Arc::new(StringArray::from(champions)) as ArrayRef,
        Arc::new(StringArray::from(positions)) as ArrayRef,
        Arc::new(BooleanArray::from(wins)) as ArrayRef,
        Arc::new(StringArray::from(columns)) as ArrayRef,
    ]
}

fn stat_columns(stats: &[Option<Quartiles>]) -> Vec<ArrayRef> {
    StatKind::ALL
        .iter()
        .map(|kind| {
            let values: Vec<Option<f64>> = stats.iter().map(|q| q.map(|q| q.get(*kind))).collect();
            Arc::new(Float64Array::from(values)) as ArrayRef
        })
        .collect()
}

/// Parquet file writer.
pub struct ParquetWriter {
    config: StorageConfig,
}

impl ParquetWriter {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn table_path(&self, table: TableType, player: &str) -> PathBuf {
        self.config.player_output_dir(player).join(table.filename())
    }

    /// Write comparison rows to Parquet.
    pub fn write_comparisons(
        &self,
        player: &str,
        rows: &[ComparisonRow],
    ) -> Result<PathBuf, StorageError> {
        let path = self.table_path(TableType::Comparisons, player);
        let schema = Arc::new(schemas::comparisons_schema());

        let mut columns = key_columns(rows.iter().map(|r| (&r.key, r.column.to_string())));
        let player_stats: Vec<Option<Quartiles>> = rows.iter().map(|r| Some(r.player)).collect();
        let reference: Vec<Option<Quartiles>> = rows.iter().map(|r| r.reference).collect();
        let global: Vec<Option<Quartiles>> = rows.iter().map(|r| r.global).collect();
        columns.extend(stat_columns(&player_stats));
        columns.extend(stat_columns(&reference));
        columns.extend(stat_columns(&global));

        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        self.write_batch(&path, &schema, &batch)?;

        info!("Wrote {} comparison rows to {:?}", rows.len(), path);
        Ok(path)
    }

    /// Write duration summaries to Parquet.
    pub fn write_durations(
        &self,
        player: &str,
        rows: &[ColumnSummary],
    ) -> Result<PathBuf, StorageError> {
        let path = self.table_path(TableType::Durations, player);
        let schema = Arc::new(schemas::durations_schema());

        let mut columns = key_columns(rows.iter().map(|r| (&r.key, r.column.to_string())));
        let stats: Vec<Option<Quartiles>> = rows.iter().map(|r| Some(r.stats)).collect();
        columns.extend(stat_columns(&stats));

        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        self.write_batch(&path, &schema, &batch)?;

        info!("Wrote {} duration rows to {:?}", rows.len(), path);
        Ok(path)
    }

    fn write_batch(
        &self,
        path: &Path,
        schema: &Arc<Schema>,
        batch: &RecordBatch,
    ) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Metric, Position};
    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> StorageConfig {
        StorageConfig::new(temp_dir.path().to_path_buf())
    }

    fn read_batches(path: &Path) -> Vec<RecordBatch> {
        let file = File::open(path).unwrap();
        ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn q(v: f64) -> Quartiles {
        Quartiles {
            avg: v,
            q1: v - 1.0,
            q2: v,
            q3: v + 1.0,
        }
    }

    #[test]
    fn test_comparisons_schema() {
        let schema = schemas::comparisons_schema();
        assert_eq!(schema.fields().len(), 16);
        assert!(schema.field_with_name("avg").is_ok());
        assert!(schema.field_with_name("ref_q2").is_ok());
        assert!(schema.field_with_name("global_q3").unwrap().is_nullable());
        assert!(!schema.field_with_name("q1").unwrap().is_nullable());
    }

    #[test]
    fn test_write_and_read_comparisons() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let rows = vec![
            ComparisonRow {
                key: GroupKey::champion_role("Lux", Position::Utility, true),
                column: Metric::VisionScore.into(),
                player: q(40.0),
                reference: Some(q(35.0)),
                global: Some(q(30.0)),
            },
            ComparisonRow {
                key: GroupKey::champion_role("Lux", Position::Utility, false),
                column: Metric::VisionScore.into(),
                player: q(38.0),
                reference: None,
                global: None,
            },
        ];

        let path = ParquetWriter::new(config.clone())
            .write_comparisons("p1", &rows)
            .unwrap();
        assert_eq!(path, config.player_output_dir("p1").join("comparisons.parquet"));

        let batches = read_batches(&path);
        assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);
        let ref_avg = batches[0]
            .column_by_name("ref_avg")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(ref_avg.value(0), 35.0);
        assert!(ref_avg.is_null(1));
    }

    #[test]
    fn test_write_durations() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let rows = vec![ColumnSummary {
            key: GroupKey::role(Position::Jungle, true),
            column: Metric::GameDuration.into(),
            stats: q(28.0),
        }];
        let path = ParquetWriter::new(config).write_durations("p1", &rows).unwrap();

        let batches = read_batches(&path);
        let champion = batches[0]
            .column_by_name("champion")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert!(champion.is_null(0));
    }
}
