use std::fs;
use std::path::Path;

use tempfile::TempDir;

use rift_insights::calculate::{analyze, build_reference};
use rift_insights::config::AppConfig;
use rift_insights::ingest::IngestPolicy;
use rift_insights::models::{Column, Direction, FieldType, Metric, GAME_RECORD_SCHEMA};
use rift_insights::storage::csv::{load_games, load_reference_set, write_reference_set};
use rift_insights::storage::jsonl::{write_analysis, JsonlReader, OutputTable};
use rift_insights::storage::StorageConfig;
use rift_insights::HighlightRow;

fn row(puuid: &str, game_id: i64, champion: &str, win: bool, kills: i64, surrender: bool) -> Vec<String> {
    GAME_RECORD_SCHEMA
        .iter()
        .map(|(name, ty)| match *name {
            "gameDuration" => "1800".to_string(),
            "gameId" => game_id.to_string(),
            "queueId" => "420".to_string(),
            "puuid" => puuid.to_string(),
            "championName" => champion.to_string(),
            "individualPosition" | "lane" => "JUNGLE".to_string(),
            "win" => if win { "True" } else { "False" }.to_string(),
            "gameEndedInSurrender" => if surrender { "True" } else { "False" }.to_string(),
            "kills" => kills.to_string(),
            _ => match ty {
                FieldType::Integer => "2".to_string(),
                FieldType::Boolean => "False".to_string(),
                FieldType::Text => "NA1".to_string(),
            },
        })
        .collect()
}

fn write_rows(path: &Path, rows: &[Vec<String>]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let lines: Vec<String> = rows.iter().map(|row| row.join(",")).collect();
    fs::write(path, lines.join("\n")).unwrap();
}

fn set_field(row: &mut [String], field: &str, value: &str) {
    let index = GAME_RECORD_SCHEMA
        .iter()
        .position(|(name, _)| *name == field)
        .unwrap();
    row[index] = value.to_string();
}

#[test]
fn test_reference_build_and_player_analysis() {
    let temp_dir = TempDir::new().unwrap();
    let storage = StorageConfig::new(temp_dir.path().to_path_buf());
    let config = AppConfig::default();

    // Reference population: two players on Lee Sin
    let mut population = Vec::new();
    for i in 0..10 {
        population.push(row("ref-a", 100 + i, "LeeSin", i % 2 == 0, 4 + i % 3, false));
        population.push(row("ref-b", 200 + i, "LeeSin", i % 2 == 1, 5 + i % 2, i == 3));
    }
    let population_path = storage.games_dir().join("population.csv");
    write_rows(&population_path, &population);

    let population = load_games(&population_path, IngestPolicy::FailFast).unwrap();
    assert_eq!(population.records.len(), 20);

    let reference = build_reference(&population.records, &config.analysis).unwrap();
    write_reference_set(&storage.reference_dir(), &config.reference, &reference).unwrap();
    let reference = load_reference_set(&storage.reference_dir(), &config.reference).unwrap();
    assert!(!reference.stats.is_empty());
    assert!(reference.surrender.is_some());

    // The player kills far more than the population in every game
    let mut games = Vec::new();
    for i in 0..8 {
        games.push(row("me", i, "LeeSin", i % 2 == 0, 15, false));
    }
    // Other queues only count towards spell totals
    let mut aram = row("me", 50, "Teemo", true, 0, false);
    set_field(&mut aram, "queueId", "450");
    games.push(aram);

    let player_path = storage.games_path("me");
    write_rows(&player_path, &games);
    let records = load_games(&player_path, IngestPolicy::FailFast)
        .unwrap()
        .records;

    let analysis = analyze(&records, &reference, &config.analysis).unwrap();

    assert_eq!(analysis.queue_id, 420);
    assert_eq!(analysis.games_analyzed, 8);
    assert!(analysis.stats.iter().all(|s| s.reference.is_some()));
    assert!(analysis
        .win_rates
        .iter()
        .all(|w| w.champion == "LeeSin"));
    assert_eq!(analysis.champion_spells.len(), 2);

    let kill_highlights: Vec<_> = analysis
        .highlights
        .iter()
        .filter(|h| h.row.column == Column::per_game(Metric::Kills))
        .collect();
    assert_eq!(kill_highlights.len(), 2);
    assert!(kill_highlights
        .iter()
        .all(|h| h.direction == Direction::Ahead));

    let written = write_analysis(&storage, "me", &analysis).unwrap();
    assert!(written > 0);

    let highlights: Vec<HighlightRow> =
        JsonlReader::for_table(&storage, OutputTable::Highlights, "me")
            .read_all()
            .unwrap();
    assert_eq!(highlights.len(), analysis.highlights.len());
    assert!(highlights
        .iter()
        .zip(&analysis.highlights)
        .all(|(read, computed)| read.row.key == computed.row.key
            && read.row.column == computed.row.column
            && read.direction == computed.direction));
}

#[test]
fn test_invalid_row_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.csv");

    let mut bad = row("me", 2, "LeeSin", true, 3, false);
    set_field(&mut bad, "gameDuration", "thirty minutes");
    write_rows(&path, &[row("me", 1, "LeeSin", true, 3, false), bad]);

    let err = load_games(&path, IngestPolicy::FailFast).unwrap_err();
    assert!(err.to_string().contains("line 2"));

    let result = load_games(&path, IngestPolicy::SkipInvalid).unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.skipped[0].0, 1);
}
