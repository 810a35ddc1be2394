//! Fixed-column reductions: multi-kills, win rates and spell casts.

use std::collections::BTreeMap;

use super::round_to;
use crate::models::{
    ChampionSpellCasts, GameRecord, GroupKey, MultiKillRow, MultiKills, Position, SpellCasts,
    WinRateRow,
};

/// Mean multi-kill counts per (champion, position, win), sorted descending.
pub fn multi_kills(records: &[GameRecord]) -> Vec<MultiKillRow> {
    let mut groups: BTreeMap<GroupKey, (MultiKills, usize)> = BTreeMap::new();
    for r in records {
        let key = GroupKey::champion_role(r.champion_name.clone(), r.individual_position, r.win);
        let (sums, count) = groups.entry(key).or_default();
        sums.double_kills += r.double_kills as f64;
        sums.triple_kills += r.triple_kills as f64;
        sums.quadra_kills += r.quadra_kills as f64;
        sums.penta_kills += r.penta_kills as f64;
        *count += 1;
    }

    groups
        .into_iter()
        .rev()
        .map(|(key, (sums, count))| {
            let n = count as f64;
            MultiKillRow {
                key,
                kills: MultiKills {
                    double_kills: round_to(sums.double_kills / n, 4),
                    triple_kills: round_to(sums.triple_kills / n, 4),
                    quadra_kills: round_to(sums.quadra_kills / n, 4),
                    penta_kills: round_to(sums.penta_kills / n, 4),
                },
            }
        })
        .collect()
}

/// Win rate (percent) and games played per (champion, position).
pub fn win_rates(records: &[GameRecord]) -> Vec<WinRateRow> {
    let mut groups: BTreeMap<(&str, Position), (u32, u32)> = BTreeMap::new();
    for r in records {
        let (wins, games) = groups
            .entry((r.champion_name.as_str(), r.individual_position))
            .or_default();
        if r.win {
            *wins += 1;
        }
        *games += 1;
    }

    groups
        .into_iter()
        .map(|((champion, position), (wins, games))| WinRateRow {
            champion: champion.to_string(),
            position,
            win_rate: wins as f64 / games as f64 * 100.0,
            total_games: games,
        })
        .collect()
}

/// Ability and summoner spell casts summed over every record.
pub fn spell_casts(records: &[GameRecord]) -> SpellCasts {
    records.iter().fold(SpellCasts::default(), |mut acc, r| {
        acc.spell1_casts += r.spell1_casts;
        acc.spell2_casts += r.spell2_casts;
        acc.spell3_casts += r.spell3_casts;
        acc.spell4_casts += r.spell4_casts;
        acc.summoner1_casts += r.summoner1_casts;
        acc.summoner2_casts += r.summoner2_casts;
        acc
    })
}

/// Ability casts summed per champion, ordered by champion name.
pub fn spell_casts_per_champion(records: &[GameRecord]) -> Vec<ChampionSpellCasts> {
    let mut groups: BTreeMap<&str, [i64; 4]> = BTreeMap::new();
    for r in records {
        let sums = groups.entry(r.champion_name.as_str()).or_default();
        sums[0] += r.spell1_casts;
        sums[1] += r.spell2_casts;
        sums[2] += r.spell3_casts;
        sums[3] += r.spell4_casts;
    }

    groups
        .into_iter()
        .map(|(champion, [s1, s2, s3, s4])| ChampionSpellCasts {
            champion: champion.to_string(),
            spell1_casts: s1,
            spell2_casts: s2,
            spell3_casts: s3,
            spell4_casts: s4,
        })
        .collect()
}
