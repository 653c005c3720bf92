// Season keeper ranking.
//
// Season lines are summed per player, filtered by playing time, normalized
// once per role cohort, and the top players per team are kept.

use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::category::{Category, Role, StatLine};
use crate::config::{CategorySet, KeeperConfig};
use crate::ingest::DailyRecord;
use crate::league::compare_team_ids;
use crate::valuation::normalize::{normalize, StandardScores};

// ---------------------------------------------------------------------------
// Season aggregation
// ---------------------------------------------------------------------------

/// One player's whole season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonAggregate {
    pub player_id: String,
    pub player_name: String,
    pub role: Role,
    /// Team the player appeared for most often; empty for a player who was
    /// never on a team.
    pub team_id: String,
    pub team_abbrev: String,
    pub stats: StatLine,
}

struct Accumulator<'a> {
    name: &'a str,
    role: Role,
    abbrev: &'a str,
    team_counts: HashMap<&'a str, usize>,
    stats: StatLine,
}

/// Most frequent team; ties go to the smallest team id.
fn modal_team(counts: &HashMap<&str, usize>) -> String {
    counts
        .iter()
        .max_by(|(a_id, a_n), (b_id, b_n)| {
            a_n.cmp(b_n).then_with(|| compare_team_ids(b_id, a_id))
        })
        .map(|(id, _)| id.to_string())
        .unwrap_or_default()
}

/// Sum every player's daily lines, in player-id order.
///
/// Name and role come from the player's first record, the abbreviation from
/// the last record that carries one.
pub fn aggregate_season(records: &[DailyRecord]) -> Vec<SeasonAggregate> {
    let mut players: BTreeMap<&str, Accumulator<'_>> = BTreeMap::new();
    for record in records {
        let acc = players
            .entry(record.player_id.as_str())
            .or_insert_with(|| Accumulator {
                name: record.player_name.as_str(),
                role: record.role,
                abbrev: "",
                team_counts: HashMap::new(),
                stats: StatLine::default(),
            });
        if !record.team_abbrev.is_empty() {
            acc.abbrev = record.team_abbrev.as_str();
        }
        if !record.team_id.is_empty() {
            *acc.team_counts.entry(record.team_id.as_str()).or_insert(0) += 1;
        }
        acc.stats += record.stats;
    }

    players
        .into_iter()
        .map(|(id, acc)| SeasonAggregate {
            player_id: id.to_string(),
            player_name: acc.name.to_string(),
            role: acc.role,
            team_id: modal_team(&acc.team_counts),
            team_abbrev: acc.abbrev.to_string(),
            stats: acc.stats,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// A recommended keeper.
#[derive(Debug, Clone, PartialEq)]
pub struct KeeperRow {
    pub team_id: String,
    pub team_abbrev: String,
    pub player_id: String,
    pub player_name: String,
    pub role: Role,
    pub total_value: f64,
    pub key_stats: String,
}

/// `LABEL:value` for each category, joined with `/`.
pub fn key_stats(line: &StatLine, categories: &[Category]) -> String {
    categories
        .iter()
        .map(|cat| {
            format!(
                "{}:{:.*}",
                cat.label(),
                cat.display_precision(),
                cat.value(line)
            )
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn qualifies(player: &SeasonAggregate, config: &KeeperConfig) -> bool {
    match player.role {
        Role::Batter => player.stats.plate_appearances >= config.min_pa,
        Role::Pitcher => player.stats.innings_pitched() >= config.min_ip,
    }
}

/// Rank keepers for every team.
///
/// Output is grouped by team (ascending id) with each team's players in
/// descending total value; equal totals keep player-id order. Unaffiliated
/// players are scored as part of their cohort but never listed. A team whose
/// players all miss the playing-time bar is absent. `abbrev_fallback` fills
/// in abbreviations the daily records did not carry.
pub fn rank_keepers(
    records: &[DailyRecord],
    config: &KeeperConfig,
    abbrev_fallback: &BTreeMap<String, String>,
) -> Vec<KeeperRow> {
    let season = aggregate_season(records);

    let mut scored: Vec<(&SeasonAggregate, f64)> = Vec::new();
    for role in [Role::Batter, Role::Pitcher] {
        let cohort: Vec<&SeasonAggregate> = season
            .iter()
            .filter(|p| p.role == role && qualifies(p, config))
            .collect();
        let lines: Vec<&StatLine> = cohort.iter().map(|p| &p.stats).collect();
        let scores: Vec<StandardScores> =
            normalize(&lines, config.for_role(role), config.ascending());
        info!(
            "Keeper cohort {}: {} of {} players qualify",
            role,
            cohort.len(),
            season.iter().filter(|p| p.role == role).count()
        );
        scored.extend(cohort.into_iter().zip(scores.iter().map(StandardScores::total)));
    }
    // Restore player-id order across roles so ties break the same way every run.
    scored.sort_by(|a, b| a.0.player_id.cmp(&b.0.player_id));

    let mut by_team: BTreeMap<&str, Vec<(&SeasonAggregate, f64)>> = BTreeMap::new();
    for entry in scored {
        if entry.0.team_id.is_empty() {
            continue;
        }
        by_team.entry(entry.0.team_id.as_str()).or_default().push(entry);
    }
    let mut teams: Vec<(&str, Vec<(&SeasonAggregate, f64)>)> = by_team.into_iter().collect();
    teams.sort_by(|a, b| compare_team_ids(a.0, b.0));

    let mut rows = Vec::new();
    for (team_id, mut players) in teams {
        players.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (player, total) in players.into_iter().take(config.per_team) {
            let team_abbrev = if player.team_abbrev.is_empty() {
                abbrev_fallback.get(team_id).cloned().unwrap_or_default()
            } else {
                player.team_abbrev.clone()
            };
            rows.push(KeeperRow {
                team_id: team_id.to_string(),
                team_abbrev,
                player_id: player.player_id.clone(),
                player_name: player.player_name.clone(),
                role: player.role,
                total_value: total,
                key_stats: key_stats(&player.stats, config.for_role(player.role)),
            });
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
