//! Typed match-history record and its fixed column schema.
//!
//! Raw rows arrive as ordered string fields (one participant in one game),
//! either freshly flattened from the match API or read back from flat files.
//! [`GameRecord::from_fields`] casts such a row against [`GAME_RECORD_SCHEMA`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic type of a raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Boolean,
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Text => write!(f, "text"),
        }
    }
}

/// A raw field could not be cast to its declared type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("Expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("Field '{field}' expected {expected}, got '{value}'")]
    InvalidValue {
        field: &'static str,
        expected: FieldType,
        value: String,
    },

    #[error("Unknown position '{0}'")]
    UnknownPosition(String),
}

/// Field name and type for every column of a raw game row, in row order.
pub const GAME_RECORD_SCHEMA: &[(&str, FieldType)] = &[
    ("gameCreation", FieldType::Text),
    ("gameDuration", FieldType::Integer),
    ("gameId", FieldType::Integer),
    ("gameVersion", FieldType::Text),
    ("platformId", FieldType::Text),
    ("queueId", FieldType::Integer),
    ("team_1_teamId", FieldType::Integer),
    ("team_1_win", FieldType::Boolean),
    ("team_1_total_tower_killed", FieldType::Integer),
    ("team_1_first_tower", FieldType::Boolean),
    ("team_1_atakhan", FieldType::Boolean),
    ("team_1_total_baron_killed", FieldType::Integer),
    ("team_1_total_dragon_killed", FieldType::Integer),
    ("team_1_total_grubs_killed", FieldType::Integer),
    ("team_1_total_herald_killed", FieldType::Integer),
    ("team_2_teamId", FieldType::Integer),
    ("team_2_win", FieldType::Boolean),
    ("team_2_total_tower_killed", FieldType::Integer),
    ("team_2_first_tower", FieldType::Boolean),
    ("team_2_atakhan", FieldType::Boolean),
    ("team_2_total_baron_killed", FieldType::Integer),
    ("team_2_total_dragon_killed", FieldType::Integer),
    ("team_2_total_grubs_killed", FieldType::Integer),
    ("team_2_total_herald_killed", FieldType::Integer),
    ("puuid", FieldType::Text),
    ("riotIdGameName", FieldType::Text),
    ("riotIdTagline", FieldType::Text),
    ("summonerId", FieldType::Text),
    ("summonerLevel", FieldType::Integer),
    ("teamId", FieldType::Integer),
    ("participantId", FieldType::Integer),
    ("win", FieldType::Boolean),
    ("allInPings", FieldType::Integer),
    ("assistMePings", FieldType::Integer),
    ("commandPings", FieldType::Integer),
    ("enemyMissingPings", FieldType::Integer),
    ("enemyVisionPings", FieldType::Integer),
    ("holdPings", FieldType::Integer),
    ("getBackPings", FieldType::Integer),
    ("needVisionPings", FieldType::Integer),
    ("onMyWayPings", FieldType::Integer),
    ("pushPings", FieldType::Integer),
    ("basicPings", FieldType::Integer),
    ("visionClearedPings", FieldType::Integer),
    ("champExperience", FieldType::Integer),
    ("champLevel", FieldType::Integer),
    ("championId", FieldType::Integer),
    ("championName", FieldType::Text),
    ("kills", FieldType::Integer),
    ("deaths", FieldType::Integer),
    ("assists", FieldType::Integer),
    ("individualPosition", FieldType::Text),
    ("lane", FieldType::Text),
    ("neutralMinionsKilled", FieldType::Integer),
    ("damageDealtToBuildings", FieldType::Integer),
    ("damageDealtToObjectives", FieldType::Integer),
    ("damageDealtToTurrets", FieldType::Integer),
    ("turretKills", FieldType::Integer),
    ("inhibitorKills", FieldType::Integer),
    ("wardsPlaced", FieldType::Integer),
    ("wardsKilled", FieldType::Integer),
    ("visionWardsBoughtInGame", FieldType::Integer),
    ("visionScore", FieldType::Integer),
    ("teamEarlySurrendered", FieldType::Boolean),
    ("gameEndedInSurrender", FieldType::Boolean),
    ("gameEndedInEarlySurrender", FieldType::Boolean),
    ("doubleKills", FieldType::Integer),
    ("tripleKills", FieldType::Integer),
    ("quadraKills", FieldType::Integer),
    ("pentaKills", FieldType::Integer),
    ("spell1Casts", FieldType::Integer),
    ("spell2Casts", FieldType::Integer),
    ("spell3Casts", FieldType::Integer),
    ("spell4Casts", FieldType::Integer),
    ("summoner1Id", FieldType::Integer),
    ("summoner2Id", FieldType::Integer),
    ("summoner1Casts", FieldType::Integer),
    ("summoner2Casts", FieldType::Integer),
    ("physicalDamageDealtToChampions", FieldType::Integer),
    ("magicDamageDealtToChampions", FieldType::Integer),
    ("totalDamageDealtToChampions", FieldType::Integer),
    ("dragonKills", FieldType::Integer),
    ("totalAllyJungleMinionsKilled", FieldType::Integer),
    ("totalEnemyJungleMinionsKilled", FieldType::Integer),
    ("totalMinionsKilled", FieldType::Integer),
];

/// Parse a boolean token; only `true`/`false` (case-insensitive, trimmed).
pub fn parse_bool(field: &'static str, raw: &str) -> Result<bool, CoercionError> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CoercionError::InvalidValue {
            field,
            expected: FieldType::Boolean,
            value: raw.to_string(),
        }),
    }
}

/// Parse a base-10 integer.
pub fn parse_int(field: &'static str, raw: &str) -> Result<i64, CoercionError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CoercionError::InvalidValue {
            field,
            expected: FieldType::Integer,
            value: raw.to_string(),
        })
}

/// Sequential reader over one raw row, checked against a schema.
pub struct FieldReader<'a, S> {
    schema: &'static [(&'static str, FieldType)],
    fields: &'a [S],
    pos: usize,
}

impl<'a, S: AsRef<str>> FieldReader<'a, S> {
    /// Create a reader; fails if the row length does not match the schema.
    pub fn new(
        schema: &'static [(&'static str, FieldType)],
        fields: &'a [S],
    ) -> Result<Self, CoercionError> {
        if fields.len() != schema.len() {
            return Err(CoercionError::FieldCount {
                expected: schema.len(),
                actual: fields.len(),
            });
        }
        Ok(Self {
            schema,
            fields,
            pos: 0,
        })
    }

    fn next_raw(&mut self, expected: FieldType) -> (&'static str, &'a str) {
        let (name, ty) = self.schema[self.pos];
        debug_assert_eq!(ty, expected, "schema type mismatch for {}", name);
        let raw = self.fields[self.pos].as_ref();
        self.pos += 1;
        (name, raw)
    }

    pub fn int(&mut self) -> Result<i64, CoercionError> {
        let (name, raw) = self.next_raw(FieldType::Integer);
        parse_int(name, raw)
    }

    pub fn boolean(&mut self) -> Result<bool, CoercionError> {
        let (name, raw) = self.next_raw(FieldType::Boolean);
        parse_bool(name, raw)
    }

    pub fn text(&mut self) -> String {
        let (_, raw) = self.next_raw(FieldType::Text);
        raw.to_string()
    }

    pub fn position(&mut self) -> Result<Position, CoercionError> {
        let (_, raw) = self.next_raw(FieldType::Text);
        raw.parse()
    }
}

/// Role played in a game (`individualPosition`).
///
/// Variants are declared in the lexical order of their API labels so that
/// sorting by position matches sorting by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "BOTTOM")]
    Bottom,
    #[serde(rename = "Invalid")]
    Invalid,
    #[serde(rename = "JUNGLE")]
    Jungle,
    #[serde(rename = "MIDDLE")]
    Middle,
    #[serde(rename = "TOP")]
    Top,
    #[serde(rename = "UTILITY")]
    Utility,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Bottom => "BOTTOM",
            Position::Invalid => "Invalid",
            Position::Jungle => "JUNGLE",
            Position::Middle => "MIDDLE",
            Position::Top => "TOP",
            Position::Utility => "UTILITY",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Position {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BOTTOM" => Ok(Position::Bottom),
            "Invalid" => Ok(Position::Invalid),
            "JUNGLE" => Ok(Position::Jungle),
            "MIDDLE" => Ok(Position::Middle),
            "TOP" => Ok(Position::Top),
            "UTILITY" => Ok(Position::Utility),
            other => Err(CoercionError::UnknownPosition(other.to_string())),
        }
    }
}

/// Team-level objective counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamObjectives {
    pub team_id: i64,
    pub win: bool,
    pub towers_killed: i64,
    pub first_tower: bool,
    pub atakhan: bool,
    pub barons_killed: i64,
    pub dragons_killed: i64,
    pub grubs_killed: i64,
    pub heralds_killed: i64,
}

impl TeamObjectives {
    fn read<S: AsRef<str>>(r: &mut FieldReader<'_, S>) -> Result<Self, CoercionError> {
        Ok(Self {
            team_id: r.int()?,
            win: r.boolean()?,
            towers_killed: r.int()?,
            first_tower: r.boolean()?,
            atakhan: r.boolean()?,
            barons_killed: r.int()?,
            dragons_killed: r.int()?,
            grubs_killed: r.int()?,
            heralds_killed: r.int()?,
        })
    }
}

/// Ping counters for one participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pings {
    pub all_in: i64,
    pub assist_me: i64,
    pub command: i64,
    pub enemy_missing: i64,
    pub enemy_vision: i64,
    pub hold: i64,
    pub get_back: i64,
    pub need_vision: i64,
    pub on_my_way: i64,
    pub push: i64,
    pub basic: i64,
    pub vision_cleared: i64,
}

impl Pings {
    /// Sum of all twelve ping counters.
    pub fn total(&self) -> i64 {
        self.all_in
            + self.assist_me
            + self.command
            + self.enemy_missing
            + self.enemy_vision
            + self.hold
            + self.get_back
            + self.need_vision
            + self.on_my_way
            + self.push
            + self.basic
            + self.vision_cleared
    }
}

/// One participant in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    // Game
    pub game_creation: String,
    pub game_duration: i64,
    pub game_id: i64,
    pub game_version: String,
    pub platform_id: String,
    pub queue_id: i64,

    pub team_1: TeamObjectives,
    pub team_2: TeamObjectives,

    // Identity
    pub puuid: String,
    pub riot_id_game_name: String,
    pub riot_id_tagline: String,
    pub summoner_id: String,
    pub summoner_level: i64,
    pub team_id: i64,
    pub participant_id: i64,
    pub win: bool,

    pub pings: Pings,

    // Champion
    pub champ_experience: i64,
    pub champ_level: i64,
    pub champion_id: i64,
    pub champion_name: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub individual_position: Position,
    pub lane: String,

    // Objectives and vision
    pub neutral_minions_killed: i64,
    pub damage_dealt_to_buildings: i64,
    pub damage_dealt_to_objectives: i64,
    pub damage_dealt_to_turrets: i64,
    pub turret_kills: i64,
    pub inhibitor_kills: i64,
    pub wards_placed: i64,
    pub wards_killed: i64,
    pub vision_wards_bought_in_game: i64,
    pub vision_score: i64,

    // Surrender flags
    pub team_early_surrendered: bool,
    pub game_ended_in_surrender: bool,
    pub game_ended_in_early_surrender: bool,

    // Multi-kills
    pub double_kills: i64,
    pub triple_kills: i64,
    pub quadra_kills: i64,
    pub penta_kills: i64,

    // Casts
    pub spell1_casts: i64,
    pub spell2_casts: i64,
    pub spell3_casts: i64,
    pub spell4_casts: i64,
    pub summoner1_id: i64,
    pub summoner2_id: i64,
    pub summoner1_casts: i64,
    pub summoner2_casts: i64,

    // Damage
    pub physical_damage_dealt_to_champions: i64,
    pub magic_damage_dealt_to_champions: i64,
    pub total_damage_dealt_to_champions: i64,

    pub dragon_kills: i64,
    pub total_ally_jungle_minions_killed: i64,
    pub total_enemy_jungle_minions_killed: i64,
    pub total_minions_killed: i64,
}

impl GameRecord {
    /// Cast a raw row against [`GAME_RECORD_SCHEMA`].
    ///
    /// All-or-nothing: the first field that fails coercion fails the row.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, CoercionError> {
        let mut r = FieldReader::new(GAME_RECORD_SCHEMA, fields)?;

        Ok(Self {
            game_creation: r.text(),
            game_duration: r.int()?,
            game_id: r.int()?,
            game_version: r.text(),
            platform_id: r.text(),
            queue_id: r.int()?,
            team_1: TeamObjectives::read(&mut r)?,
            team_2: TeamObjectives::read(&mut r)?,
            puuid: r.text(),
            riot_id_game_name: r.text(),
            riot_id_tagline: r.text(),
            summoner_id: r.text(),
            summoner_level: r.int()?,
            team_id: r.int()?,
            participant_id: r.int()?,
            win: r.boolean()?,
            pings: Pings {
                all_in: r.int()?,
                assist_me: r.int()?,
                command: r.int()?,
                enemy_missing: r.int()?,
                enemy_vision: r.int()?,
                hold: r.int()?,
                get_back: r.int()?,
                need_vision: r.int()?,
                on_my_way: r.int()?,
                push: r.int()?,
                basic: r.int()?,
                vision_cleared: r.int()?,
            },
            champ_experience: r.int()?,
            champ_level: r.int()?,
            champion_id: r.int()?,
            champion_name: r.text(),
            kills: r.int()?,
            deaths: r.int()?,
            assists: r.int()?,
            individual_position: r.position()?,
            lane: r.text(),
            neutral_minions_killed: r.int()?,
            damage_dealt_to_buildings: r.int()?,
            damage_dealt_to_objectives: r.int()?,
            damage_dealt_to_turrets: r.int()?,
            turret_kills: r.int()?,
            inhibitor_kills: r.int()?,
            wards_placed: r.int()?,
            wards_killed: r.int()?,
            vision_wards_bought_in_game: r.int()?,
            vision_score: r.int()?,
            team_early_surrendered: r.boolean()?,
            game_ended_in_surrender: r.boolean()?,
            game_ended_in_early_surrender: r.boolean()?,
            double_kills: r.int()?,
            triple_kills: r.int()?,
            quadra_kills: r.int()?,
            penta_kills: r.int()?,
            spell1_casts: r.int()?,
            spell2_casts: r.int()?,
            spell3_casts: r.int()?,
            spell4_casts: r.int()?,
            summoner1_id: r.int()?,
            summoner2_id: r.int()?,
            summoner1_casts: r.int()?,
            summoner2_casts: r.int()?,
            physical_damage_dealt_to_champions: r.int()?,
            magic_damage_dealt_to_champions: r.int()?,
            total_damage_dealt_to_champions: r.int()?,
            dragon_kills: r.int()?,
            total_ally_jungle_minions_killed: r.int()?,
            total_enemy_jungle_minions_killed: r.int()?,
            total_minions_killed: r.int()?,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::raw_row;
    use super::*;

    #[test]
    fn test_schema_has_every_field_once() {
        assert_eq!(GAME_RECORD_SCHEMA.len(), 85);
        let mut names: Vec<_> = GAME_RECORD_SCHEMA.iter().map(|(n, _)| *n).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), GAME_RECORD_SCHEMA.len());
    }

    #[test]
    fn test_from_fields_valid_row() {
        let row = raw_row(&[("kills", "7"), ("win", "TRUE"), ("championName", "Jinx")]);
        let record = GameRecord::from_fields(&row).unwrap();

        assert_eq!(record.kills, 7);
        assert!(record.win);
        assert_eq!(record.champion_name, "Jinx");
        assert_eq!(record.individual_position, Position::Middle);
        assert_eq!(record.game_duration, 1800);
        assert_eq!(record.pings.total(), 12);
    }

    #[test]
    fn test_bool_normalization() {
        assert_eq!(parse_bool("win", " True "), Ok(true));
        assert_eq!(parse_bool("win", "FALSE"), Ok(false));
        assert!(parse_bool("win", "1").is_err());
        assert!(parse_bool("win", "yes").is_err());
    }

    #[test]
    fn test_invalid_integer_fails_whole_row() {
        let row = raw_row(&[("deaths", "three")]);
        let err = GameRecord::from_fields(&row).unwrap_err();

        assert_eq!(
            err,
            CoercionError::InvalidValue {
                field: "deaths",
                expected: FieldType::Integer,
                value: "three".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_field_count() {
        let mut row = raw_row(&[]);
        row.pop();
        let err = GameRecord::from_fields(&row).unwrap_err();
        assert_eq!(
            err,
            CoercionError::FieldCount {
                expected: 85,
                actual: 84
            }
        );
    }

    #[test]
    fn test_unknown_position() {
        let row = raw_row(&[("individualPosition", "SUPPORT")]);
        assert_eq!(
            GameRecord::from_fields(&row).unwrap_err(),
            CoercionError::UnknownPosition("SUPPORT".to_string())
        );
    }

    #[test]
    fn test_position_ordering_matches_labels() {
        let mut positions = vec![
            Position::Utility,
            Position::Bottom,
            Position::Top,
            Position::Jungle,
            Position::Middle,
        ];
        positions.sort();
        let labels: Vec<_> = positions.iter().map(|p| p.as_str()).collect();
        let mut sorted_labels = labels.clone();
        sorted_labels.sort();
        assert_eq!(labels, sorted_labels);
    }

    #[test]
    fn test_position_serialization() {
        let json = serde_json::to_string(&Position::Utility).unwrap();
        assert_eq!(json, "\"UTILITY\"");
        let parsed: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Position::Utility);
    }
}
