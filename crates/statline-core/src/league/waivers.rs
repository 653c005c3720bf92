// Weekly roster versus free-agent comparison for one managed team.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::WaiverConfig;
use crate::ingest::RosterInterval;
use crate::league::calendar::mondays;
use crate::valuation::matrix::ValueMatrix;
use crate::valuation::rolling::{rolling_mean, RollingValues};

/// Value given to a rostered player the value matrix has never seen.
pub const MISSING_PLAYER_VALUE: f64 = -999.0;

/// A free agent worth considering.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub player_id: String,
    pub player_name: String,
    pub value: f64,
}

/// A rostered player outperformed by available free agents on a checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WaiverRecommendation {
    pub checkpoint_date: NaiveDate,
    pub roster_player_id: String,
    pub roster_player_name: String,
    pub roster_player_value: f64,
    /// Best first.
    pub alternatives: Vec<Alternative>,
}

fn display_name(names: &BTreeMap<String, String>, id: &str) -> String {
    names.get(id).cloned().unwrap_or_else(|| id.to_string())
}

/// Compare the target team's roster on `date` against the free-agent pool.
///
/// Returns an empty list when the date has no defined rolling values or the
/// team holds nobody on it.
pub fn recommend_at(
    rolling: &RollingValues<'_>,
    rosters: &[RosterInterval],
    latest: NaiveDate,
    date: NaiveDate,
    config: &WaiverConfig,
    names: &BTreeMap<String, String>,
) -> Vec<WaiverRecommendation> {
    let Some(snapshot) = rolling.snapshot(date) else {
        debug!("Checkpoint {}: no rolling values, skipped", date);
        return Vec::new();
    };

    let active: Vec<&RosterInterval> = rosters.iter().filter(|r| r.covers(date, latest)).collect();
    let roster: Vec<&RosterInterval> = active
        .iter()
        .copied()
        .filter(|r| r.team_id == config.team_id)
        .collect();
    if roster.is_empty() {
        debug!("Checkpoint {}: team {} holds nobody, skipped", date, config.team_id);
        return Vec::new();
    }

    let players = rolling.matrix().players();
    let taken: HashSet<&str> = active.iter().map(|r| r.player_id.as_str()).collect();
    let mut pool: Vec<(u32, f64)> = snapshot
        .into_iter()
        .filter(|(p, _)| !taken.contains(players.id(*p)))
        .collect();
    // Stable: equal values keep player-index order.
    pool.sort_by(|a, b| b.1.total_cmp(&a.1));
    pool.truncate(config.free_agent_pool);

    let mut out = Vec::new();
    for interval in roster {
        let value = rolling
            .value_at(date, &interval.player_id)
            .unwrap_or(MISSING_PLAYER_VALUE);
        let alternatives: Vec<Alternative> = pool
            .iter()
            .filter(|(_, v)| *v > value + config.margin)
            .take(config.max_alternatives)
            .map(|&(p, v)| Alternative {
                player_id: players.id(p).to_string(),
                player_name: display_name(names, players.id(p)),
                value: v,
            })
            .collect();
        if alternatives.is_empty() {
            continue;
        }
        out.push(WaiverRecommendation {
            checkpoint_date: date,
            roster_player_id: interval.player_id.clone(),
            roster_player_name: if interval.player_name.is_empty() {
                display_name(names, &interval.player_id)
            } else {
                interval.player_name.clone()
            },
            roster_player_value: value,
            alternatives,
        });
    }
    out
}

/// Run the comparison on every Monday between the matrix's first and last
/// dates.
pub fn recommend(
    matrix: &ValueMatrix,
    rosters: &[RosterInterval],
    config: &WaiverConfig,
    names: &BTreeMap<String, String>,
) -> Vec<WaiverRecommendation> {
    let (Some(first), Some(latest)) = (matrix.first_date(), matrix.last_date()) else {
        return Vec::new();
    };
    let rolling = rolling_mean(matrix, config.window_days);
    let checkpoints = mondays(first, latest);

    let recommendations: Vec<WaiverRecommendation> = checkpoints
        .iter()
        .flat_map(|&date| recommend_at(&rolling, rosters, latest, date, config, names))
        .collect();
    info!(
        "Roster comparison for team {}: {} flagged players over {} checkpoints",
        config.team_id,
        recommendations.len(),
        checkpoints.len()
    );
    recommendations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
