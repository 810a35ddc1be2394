//! Numeric columns, statistic kinds and the wide-column naming convention.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::GameRecord;

/// Errors parsing a column or wide statistic name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnParseError {
    #[error("Unknown column: {0}")]
    Unknown(String),

    #[error("Ambiguous statistic column name: {0}")]
    Ambiguous(String),
}

/// A numeric value extracted from a [`GameRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Kda,
    Kills,
    Deaths,
    Assists,
    PhysicalDamageDealtToChampions,
    MagicDamageDealtToChampions,
    TotalDamageDealtToChampions,
    DamageDealtToTurrets,
    DamageDealtToObjectives,
    WardsPlaced,
    WardsKilled,
    VisionWardsBoughtInGame,
    VisionScore,
    AllInPings,
    AssistMePings,
    CommandPings,
    EnemyMissingPings,
    EnemyVisionPings,
    HoldPings,
    GetBackPings,
    NeedVisionPings,
    OnMyWayPings,
    PushPings,
    BasicPings,
    VisionClearedPings,
    TotalPings,
    GameDuration,
    DoubleKills,
    TripleKills,
    QuadraKills,
    PentaKills,
}

impl Metric {
    pub const ALL: [Metric; 31] = [
        Metric::Kda,
        Metric::Kills,
        Metric::Deaths,
        Metric::Assists,
        Metric::PhysicalDamageDealtToChampions,
        Metric::MagicDamageDealtToChampions,
        Metric::TotalDamageDealtToChampions,
        Metric::DamageDealtToTurrets,
        Metric::DamageDealtToObjectives,
        Metric::WardsPlaced,
        Metric::WardsKilled,
        Metric::VisionWardsBoughtInGame,
        Metric::VisionScore,
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
        Metric::TotalPings,
        Metric::GameDuration,
        Metric::DoubleKills,
        Metric::TripleKills,
        Metric::QuadraKills,
        Metric::PentaKills,
    ];

    /// Column label used in reference tables and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Kda => "kda",
            Metric::Kills => "kills",
            Metric::Deaths => "deaths",
            Metric::Assists => "assists",
            Metric::PhysicalDamageDealtToChampions => "physicalDamageDealtToChampions",
            Metric::MagicDamageDealtToChampions => "magicDamageDealtToChampions",
            Metric::TotalDamageDealtToChampions => "totalDamageDealtToChampions",
            Metric::DamageDealtToTurrets => "damageDealtToTurrets",
            Metric::DamageDealtToObjectives => "damageDealtToObjectives",
            Metric::WardsPlaced => "wardsPlaced",
            Metric::WardsKilled => "wardsKilled",
            Metric::VisionWardsBoughtInGame => "visionWardsBoughtInGame",
            Metric::VisionScore => "visionScore",
            Metric::AllInPings => "allInPings",
            Metric::AssistMePings => "assistMePings",
            Metric::CommandPings => "commandPings",
            Metric::EnemyMissingPings => "enemyMissingPings",
            Metric::EnemyVisionPings => "enemyVisionPings",
            Metric::HoldPings => "holdPings",
            Metric::GetBackPings => "getBackPings",
            Metric::NeedVisionPings => "needVisionPings",
            Metric::OnMyWayPings => "onMyWayPings",
            Metric::PushPings => "pushPings",
            Metric::BasicPings => "basicPings",
            Metric::VisionClearedPings => "visionClearedPings",
            Metric::TotalPings => "totalPings",
            Metric::GameDuration => "gameDuration",
            Metric::DoubleKills => "doubleKills",
            Metric::TripleKills => "tripleKills",
            Metric::QuadraKills => "quadraKills",
            Metric::PentaKills => "pentaKills",
        }
    }

    /// Raw value of this metric for one record.
    ///
    /// KDA is `(kills + assists) / deaths`, or `kills + assists` without deaths.
    pub fn value(&self, r: &GameRecord) -> f64 {
        let v = match self {
            Metric::Kda => {
                let ka = (r.kills + r.assists) as f64;
                return if r.deaths != 0 {
                    ka / r.deaths as f64
                } else {
                    ka
                };
            }
            Metric::Kills => r.kills,
            Metric::Deaths => r.deaths,
            Metric::Assists => r.assists,
            Metric::PhysicalDamageDealtToChampions => r.physical_damage_dealt_to_champions,
            Metric::MagicDamageDealtToChampions => r.magic_damage_dealt_to_champions,
            Metric::TotalDamageDealtToChampions => r.total_damage_dealt_to_champions,
            Metric::DamageDealtToTurrets => r.damage_dealt_to_turrets,
            Metric::DamageDealtToObjectives => r.damage_dealt_to_objectives,
            Metric::WardsPlaced => r.wards_placed,
            Metric::WardsKilled => r.wards_killed,
            Metric::VisionWardsBoughtInGame => r.vision_wards_bought_in_game,
            Metric::VisionScore => r.vision_score,
            Metric::AllInPings => r.pings.all_in,
            Metric::AssistMePings => r.pings.assist_me,
            Metric::CommandPings => r.pings.command,
            Metric::EnemyMissingPings => r.pings.enemy_missing,
            Metric::EnemyVisionPings => r.pings.enemy_vision,
            Metric::HoldPings => r.pings.hold,
            Metric::GetBackPings => r.pings.get_back,
            Metric::NeedVisionPings => r.pings.need_vision,
            Metric::OnMyWayPings => r.pings.on_my_way,
            Metric::PushPings => r.pings.push,
            Metric::BasicPings => r.pings.basic,
            Metric::VisionClearedPings => r.pings.vision_cleared,
            Metric::TotalPings => r.pings.total(),
            Metric::GameDuration => r.game_duration,
            Metric::DoubleKills => r.double_kills,
            Metric::TripleKills => r.triple_kills,
            Metric::QuadraKills => r.quadra_kills,
            Metric::PentaKills => r.penta_kills,
        };
        v as f64
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| ColumnParseError::Unknown(s.to_string()))
    }
}

const PER_MINUTE_SUFFIX: &str = "PerMins";

/// An aggregated column: a metric, either per game or per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column {
    pub metric: Metric,
    pub per_minute: bool,
}

impl Column {
    pub const fn per_game(metric: Metric) -> Self {
        Self {
            metric,
            per_minute: false,
        }
    }

    pub const fn per_minute(metric: Metric) -> Self {
        Self {
            metric,
            per_minute: true,
        }
    }
}

impl From<Metric> for Column {
    fn from(metric: Metric) -> Self {
        Column::per_game(metric)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.per_minute {
            write!(f, "{}{}", self.metric, PER_MINUTE_SUFFIX)
        } else {
            write!(f, "{}", self.metric)
        }
    }
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_suffix(PER_MINUTE_SUFFIX) {
            Some(base) => Ok(Column::per_minute(base.parse()?)),
            None => Ok(Column::per_game(s.parse()?)),
        }
    }
}

/// Statistic computed per group and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKind {
    #[serde(rename = "AVG")]
    Avg,
    Q1,
    Q2,
    Q3,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [StatKind::Avg, StatKind::Q1, StatKind::Q2, StatKind::Q3];

    /// Prefix used in wide column names (`avg_kills`, `Q1_kills`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            StatKind::Avg => "avg",
            StatKind::Q1 => "Q1",
            StatKind::Q2 => "Q2",
            StatKind::Q3 => "Q3",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        StatKind::ALL.iter().find(|k| k.prefix() == prefix).copied()
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatKind::Avg => write!(f, "AVG"),
            StatKind::Q1 => write!(f, "Q1"),
            StatKind::Q2 => write!(f, "Q2"),
            StatKind::Q3 => write!(f, "Q3"),
        }
    }
}

impl FromStr for StatKind {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVG" | "avg" => Ok(StatKind::Avg),
            "Q1" => Ok(StatKind::Q1),
            "Q2" => Ok(StatKind::Q2),
            "Q3" => Ok(StatKind::Q3),
            other => Err(ColumnParseError::Unknown(other.to_string())),
        }
    }
}

/// A column of the wide aggregation table: `{statKind}_{columnName}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WideColumn {
    pub kind: StatKind,
    pub column: Column,
}

impl WideColumn {
    pub fn new(kind: StatKind, column: Column) -> Self {
        Self { kind, column }
    }
}

impl fmt::Display for WideColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.column)
    }
}

impl FromStr for WideColumn {
    type Err = ColumnParseError;

    /// Split a wide name back into statistic kind and column.
    ///
    /// A remainder that itself starts with a statistic prefix cannot be
    /// attributed unambiguously and is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once('_')
            .ok_or_else(|| ColumnParseError::Ambiguous(s.to_string()))?;
        let kind =
            StatKind::from_prefix(prefix).ok_or_else(|| ColumnParseError::Ambiguous(s.to_string()))?;

        let starts_with_stat = StatKind::ALL
            .iter()
            .any(|k| rest.starts_with(&format!("{}_", k.prefix())));
        if rest.is_empty() || starts_with_stat {
            return Err(ColumnParseError::Ambiguous(s.to_string()));
        }

        Ok(Self {
            kind,
            column: rest.parse()?,
        })
    }
}

macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

serde_via_str!(Metric);
serde_via_str!(Column);
serde_via_str!(WideColumn);
