// Daily value: one scalar per (date, player) from that day's role cohorts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::info;

use crate::category::{Role, StatLine};
use crate::config::CategorySet;
use crate::ingest::DailyRecord;
use crate::valuation::matrix::ValueMatrix;
use crate::valuation::normalize::normalize;

/// A single day's merged lines, keyed by role then player id.
type DayCohorts<'a> = BTreeMap<Role, BTreeMap<&'a str, StatLine>>;

/// Group records by date and merge repeated (date, role, player) rows.
fn merge_by_day(records: &[DailyRecord]) -> BTreeMap<NaiveDate, DayCohorts<'_>> {
    let mut days: BTreeMap<NaiveDate, DayCohorts<'_>> = BTreeMap::new();
    for record in records {
        *days
            .entry(record.date)
            .or_default()
            .entry(record.role)
            .or_default()
            .entry(record.player_id.as_str())
            .or_default() += record.stats;
    }
    days
}

/// Values for one day. Each role is normalized against its own cohort only;
/// a player in both roles gets one entry per role.
fn values_for_day<S: CategorySet>(cohorts: &DayCohorts<'_>, set: &S) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    for (role, players) in cohorts {
        let ids: Vec<&str> = players.keys().copied().collect();
        let lines: Vec<&StatLine> = players.values().collect();
        let scores = normalize(&lines, set.for_role(*role), set.ascending());
        out.extend(
            ids.into_iter()
                .zip(scores)
                .map(|(id, s)| (id.to_string(), s.total())),
        );
    }
    out
}

/// Daily value for every (date, player) present in `records`, dates ascending.
/// A player's entries for the same date (both roles) are not yet summed.
pub fn daily_values<S: CategorySet + Sync>(
    records: &[DailyRecord],
    set: &S,
) -> Vec<(NaiveDate, Vec<(String, f64)>)> {
    let days: Vec<(NaiveDate, DayCohorts<'_>)> = merge_by_day(records).into_iter().collect();
    days.par_iter()
        .map(|(date, cohorts)| (*date, values_for_day(cohorts, set)))
        .collect()
}

/// Build the sparse value matrix from raw daily records.
pub fn build_value_matrix<S: CategorySet + Sync>(records: &[DailyRecord], set: &S) -> ValueMatrix {
    let per_day = daily_values(records, set);
    let matrix = ValueMatrix::from_values(
        per_day
            .into_iter()
            .flat_map(|(date, values)| values.into_iter().map(move |(id, v)| (date, id, v))),
    );
    info!(
        "Built value matrix: {} dates x {} players from {} records",
        matrix.num_dates(),
        matrix.num_players(),
        records.len()
    );
    matrix
}

/// Display name per player id; the first record seen wins.
pub fn player_names(records: &[DailyRecord]) -> BTreeMap<String, String> {
    let mut names = BTreeMap::new();
    for record in records {
        names
            .entry(record.player_id.clone())
            .or_insert_with(|| record.player_name.clone());
    }
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
