//! # Rift Insights
//!
//! Match-history statistics for one player, compared against a reference
//! population of high-ranked players.
//!
//! ## Architecture
//!
//! - **models**: Typed game records, statistic columns and result tables
//! - **ingest**: Coercion of raw string rows into typed records
//! - **calculate**: Aggregation, rates, playrate filtering and comparisons
//! - **storage**: CSV input, JSONL and Parquet output
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;
