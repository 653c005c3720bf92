// Team success and roster behavior.
//
// A team's season value is the sum of its players' daily values over every
// day it held them. That total is then compared across teams with how long
// they hold players before dropping them and how often they add players.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::config::BehaviorConfig;
use crate::ingest::RosterInterval;
use crate::league::compare_team_ids;
use crate::stats::{mean, median, pearson, sample_stdev};
use crate::valuation::matrix::{row_lookup, ValueMatrix};

/// One team's season value and roster habits.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSuccess {
    pub team_id: String,
    pub team_abbrev: String,
    pub total_value: f64,
    pub value_per_day: f64,
    /// Additions after the opening grace period.
    pub adds: usize,
    /// Adds per season week.
    pub churn_rate: f64,
    /// Completed holds (dropped players) counted for the hold statistics.
    pub drops: usize,
    pub avg_hold_days: Option<f64>,
    pub median_hold_days: Option<f64>,
    /// Sample spread of the hold lengths; needs at least two drops.
    pub std_hold_days: Option<f64>,
    pub churn_delta_from_optimal: f64,
}

/// League-wide result of the behavior analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorSummary {
    pub season_start: Option<NaiveDate>,
    pub latest_date: NaiveDate,
    pub season_days: i64,
    pub optimal_churn: Option<f64>,
    pub optimal_hold_days: Option<f64>,
    pub value_vs_hold_correlation: Option<f64>,
    pub value_vs_churn_correlation: Option<f64>,
    pub teams: Vec<TeamSuccess>,
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Sum of one player's daily values over `[from, to]`, both inclusive.
/// Days outside the matrix's range contribute nothing.
pub fn interval_value(matrix: &ValueMatrix, player_id: &str, from: NaiveDate, to: NaiveDate) -> f64 {
    let Some(p) = matrix.players().get(player_id) else {
        return 0.0;
    };
    if from > to {
        return 0.0;
    }
    let dates = matrix.dates();
    let lo = dates.partition_point(|d| *d < from);
    let hi = dates.partition_point(|d| *d <= to);
    (lo..hi)
        .map(|t| row_lookup(matrix.row(t), p).unwrap_or(0.0))
        .sum()
}

/// Number of whole weeks between two dates, fractional.
pub fn season_weeks(start: NaiveDate, latest: NaiveDate) -> f64 {
    (latest - start).num_days() as f64 / 7.0
}

/// Hold length of a dropped player, capped; `None` while the interval is
/// still open or ended within the drop buffer of the latest date.
pub fn completed_hold(
    interval: &RosterInterval,
    latest: NaiveDate,
    config: &BehaviorConfig,
) -> Option<i64> {
    let end = interval.end_date?;
    if end >= latest - Duration::days(config.drop_buffer_days) {
        return None;
    }
    Some(interval.days_held(latest).min(config.max_hold_days))
}

/// Whether an interval starts after the opening grace period.
pub fn is_add(interval: &RosterInterval, season_start: NaiveDate, config: &BehaviorConfig) -> bool {
    interval.start_date > season_start + Duration::days(config.add_grace_days)
}

#[derive(Default)]
struct TeamTally {
    abbrev: String,
    total_value: f64,
    adds: usize,
    holds: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Score every team in `rosters` over `[season_start, latest]`, where the
/// season starts on the earliest roster start date.
///
/// Teams are returned by descending total value (team id on ties).
pub fn analyze_behavior(
    matrix: &ValueMatrix,
    rosters: &[RosterInterval],
    latest: NaiveDate,
    config: &BehaviorConfig,
) -> BehaviorSummary {
    let Some(season_start) = rosters.iter().map(|r| r.start_date).min() else {
        return BehaviorSummary {
            season_start: None,
            latest_date: latest,
            season_days: 0,
            optimal_churn: None,
            optimal_hold_days: None,
            value_vs_hold_correlation: None,
            value_vs_churn_correlation: None,
            teams: Vec::new(),
        };
    };
    let season_days = ((latest - season_start).num_days() + 1).max(0);
    let weeks = season_weeks(season_start, latest);

    let mut tallies: BTreeMap<&str, TeamTally> = BTreeMap::new();
    for interval in rosters {
        let tally = tallies.entry(interval.team_id.as_str()).or_default();
        if !interval.team_abbrev.is_empty() {
            tally.abbrev = interval.team_abbrev.clone();
        }
        let from = interval.start_date.max(season_start);
        let to = interval.effective_end(latest).min(latest);
        tally.total_value += interval_value(matrix, &interval.player_id, from, to);
        if is_add(interval, season_start, config) {
            tally.adds += 1;
        }
        if let Some(days) = completed_hold(interval, latest, config) {
            tally.holds.push(days as f64);
        }
    }

    let mut teams: Vec<TeamSuccess> = tallies
        .into_iter()
        .map(|(team_id, tally)| TeamSuccess {
            team_id: team_id.to_string(),
            team_abbrev: tally.abbrev,
            total_value: tally.total_value,
            value_per_day: if season_days > 0 {
                tally.total_value / season_days as f64
            } else {
                0.0
            },
            adds: tally.adds,
            churn_rate: if weeks > 0.0 {
                tally.adds as f64 / weeks
            } else {
                0.0
            },
            drops: tally.holds.len(),
            avg_hold_days: mean(&tally.holds),
            median_hold_days: median(&tally.holds),
            std_hold_days: sample_stdev(&tally.holds),
            churn_delta_from_optimal: 0.0,
        })
        .collect();
    teams.sort_by(|a, b| {
        b.total_value
            .total_cmp(&a.total_value)
            .then_with(|| compare_team_ids(&a.team_id, &b.team_id))
    });

    let benchmark = &teams[..config.benchmark_teams.min(teams.len())];
    let optimal_churn = mean(&benchmark.iter().map(|t| t.churn_rate).collect::<Vec<_>>());
    let optimal_hold_days = mean(
        &benchmark
            .iter()
            .filter_map(|t| t.avg_hold_days)
            .collect::<Vec<_>>(),
    );
    if let Some(optimal) = optimal_churn {
        for team in &mut teams {
            team.churn_delta_from_optimal = team.churn_rate - optimal;
        }
    }

    let (hold_values, holds): (Vec<f64>, Vec<f64>) = teams
        .iter()
        .filter_map(|t| t.avg_hold_days.map(|h| (t.total_value, h)))
        .unzip();
    let values: Vec<f64> = teams.iter().map(|t| t.total_value).collect();
    let churns: Vec<f64> = teams.iter().map(|t| t.churn_rate).collect();
    let value_vs_hold_correlation = pearson(&hold_values, &holds);
    let value_vs_churn_correlation = pearson(&values, &churns);

    info!(
        "Team success over {} days for {} teams (optimal churn {:.2}/week)",
        season_days,
        teams.len(),
        optimal_churn.unwrap_or(0.0)
    );

    BehaviorSummary {
        season_start: Some(season_start),
        latest_date: latest,
        season_days,
        optimal_churn,
        optimal_hold_days,
        value_vs_hold_correlation,
        value_vs_churn_correlation,
        teams,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
