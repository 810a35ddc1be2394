//! Normalization of raw string rows into typed game records.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{CoercionError, GameRecord};

/// What to do with a row that fails to coerce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPolicy {
    /// Abort the batch on the first invalid row
    #[default]
    FailFast,
    /// Drop invalid rows and report them
    SkipInvalid,
}

/// Result of normalizing a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizeResult {
    pub records: Vec<GameRecord>,
    /// Zero-based row index and the reason each skipped row was rejected
    pub skipped: Vec<(usize, CoercionError)>,
}

impl NormalizeResult {
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Normalize a batch of raw rows.
///
/// Each row is coerced as a whole: a row is either fully typed or rejected.
/// Under [`IngestPolicy::FailFast`] the first rejection is returned as the
/// error; under [`IngestPolicy::SkipInvalid`] it is logged and recorded.
pub fn normalize_rows(
    rows: &[Vec<String>],
    policy: IngestPolicy,
) -> Result<NormalizeResult, CoercionError> {
    let mut result = NormalizeResult::default();

    for (index, row) in rows.iter().enumerate() {
        match GameRecord::from_fields(row.as_slice()) {
            Ok(record) => result.records.push(record),
            Err(e) => match policy {
                IngestPolicy::FailFast => return Err(e),
                IngestPolicy::SkipInvalid => {
                    warn!("Skipping row {}: {}", index, e);
                    result.skipped.push((index, e));
                }
            },
        }
    }

    info!(
        "Normalized {} rows ({} skipped)",
        result.records.len(),
        result.skipped.len()
    );
    Ok(result)
}
