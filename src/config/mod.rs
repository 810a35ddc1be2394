//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Metric, StatKind};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum share of a player's games on a champion (percent)
    #[serde(default = "default_champion_playrate")]
    pub champion_playrate_percent: f64,

    /// Minimum share of a player's games in a position (percent), used for
    /// game-duration statistics
    #[serde(default = "default_lane_playrate")]
    pub lane_playrate_percent: f64,

    /// Queue analysed by default (ranked solo)
    #[serde(default = "default_ranked_queue")]
    pub ranked_queue_id: i64,

    /// Queue used when no ranked games exist (draft)
    #[serde(default = "default_fallback_queue")]
    pub fallback_queue_id: i64,

    /// Columns aggregated per game
    #[serde(default = "default_per_game_metrics")]
    pub per_game_metrics: Vec<Metric>,

    /// Columns aggregated per minute
    #[serde(default = "default_per_minute_metrics")]
    pub per_minute_metrics: Vec<Metric>,

    /// Statistics that must all agree for a highlight
    #[serde(default = "default_highlight_kinds")]
    pub highlight_kinds: Vec<StatKind>,
}

fn default_champion_playrate() -> f64 {
    7.0
}

fn default_lane_playrate() -> f64 {
    20.0
}

fn default_ranked_queue() -> i64 {
    420
}

fn default_fallback_queue() -> i64 {
    400
}

fn default_per_game_metrics() -> Vec<Metric> {
    vec![
        Metric::Kda,
        Metric::Kills,
        Metric::Deaths,
        Metric::Assists,
        Metric::PhysicalDamageDealtToChampions,
        Metric::MagicDamageDealtToChampions,
        Metric::TotalDamageDealtToChampions,
        Metric::WardsPlaced,
        Metric::WardsKilled,
        Metric::VisionWardsBoughtInGame,
        Metric::VisionScore,
        Metric::TotalPings,
    ]
}

fn default_per_minute_metrics() -> Vec<Metric> {
    vec![
        Metric::PhysicalDamageDealtToChampions,
        Metric::MagicDamageDealtToChampions,
        Metric::TotalDamageDealtToChampions,
        Metric::DamageDealtToTurrets,
        Metric::DamageDealtToObjectives,
        Metric::AllInPings,
        Metric::AssistMePings,
        Metric::CommandPings,
        Metric::EnemyMissingPings,
        Metric::EnemyVisionPings,
        Metric::HoldPings,
        Metric::GetBackPings,
        Metric::NeedVisionPings,
        Metric::OnMyWayPings,
        Metric::PushPings,
        Metric::BasicPings,
        Metric::VisionClearedPings,
    ]
}

fn default_highlight_kinds() -> Vec<StatKind> {
    vec![StatKind::Q1, StatKind::Q2, StatKind::Q3, StatKind::Avg]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            champion_playrate_percent: default_champion_playrate(),
            lane_playrate_percent: default_lane_playrate(),
            ranked_queue_id: default_ranked_queue(),
            fallback_queue_id: default_fallback_queue(),
            per_game_metrics: default_per_game_metrics(),
            per_minute_metrics: default_per_minute_metrics(),
            highlight_kinds: default_highlight_kinds(),
        }
    }
}

/// Reference table file names, relative to the reference directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceFiles {
    #[serde(default = "default_stats_file")]
    pub stats: String,

    #[serde(default = "default_multi_kills_file")]
    pub multi_kills: String,

    #[serde(default = "default_duration_file")]
    pub duration: String,

    #[serde(default = "default_surrender_curve_file")]
    pub surrender_curve: String,

    #[serde(default = "default_surrender_stats_file")]
    pub surrender_stats: String,
}

fn default_stats_file() -> String {
    "average_percentiles.csv".to_string()
}

fn default_multi_kills_file() -> String {
    "multi_kills.csv".to_string()
}

fn default_duration_file() -> String {
    "duration.csv".to_string()
}

fn default_surrender_curve_file() -> String {
    "ff_per_mins.csv".to_string()
}

fn default_surrender_stats_file() -> String {
    "ff_stats.csv".to_string()
}

impl Default for ReferenceFiles {
    fn default() -> Self {
        Self {
            stats: default_stats_file(),
            multi_kills: default_multi_kills_file(),
            duration: default_duration_file(),
            surrender_curve: default_surrender_curve_file(),
            surrender_stats: default_surrender_stats_file(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub reference: ReferenceFiles,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            analysis: AnalysisConfig::default(),
            reference: ReferenceFiles::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;

        for (name, value) in [
            ("champion_playrate_percent", analysis.champion_playrate_percent),
            ("lane_playrate_percent", analysis.lane_playrate_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }

        if analysis.highlight_kinds.is_empty() {
            return Err(ConfigError::ValidationError(
                "highlight_kinds must not be empty".to_string(),
            ));
        }

        if analysis.per_minute_metrics.contains(&Metric::GameDuration) {
            return Err(ConfigError::ValidationError(
                "gameDuration cannot be normalized per minute".to_string(),
            ));
        }

        Ok(())
    }
}
