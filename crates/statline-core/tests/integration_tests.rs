// Integration tests for the league analytics pipeline.
//
// These tests load the CSV fixtures through the public ingestion API and run
// every analysis on the result: daily values, window selection, keepers,
// roster comparison, team success and the report writers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};

use statline_core::config::{BehaviorConfig, Config, DataPaths, KeeperConfig, WaiverConfig, WindowConfig};
use statline_core::ingest::{self, LeagueData};
use statline_core::league::{behavior, keepers, waivers};
use statline_core::report;
use statline_core::valuation::daily;
use statline_core::valuation::matrix::ValueMatrix;
use statline_core::valuation::window;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn fixture_paths() -> DataPaths {
    DataPaths {
        daily_stats: format!("{FIXTURES}/daily_player_stats.csv"),
        roster_history: format!("{FIXTURES}/roster_history.csv"),
        output_dir: "unused".into(),
    }
}

fn load_fixtures() -> LeagueData {
    ingest::load_all(&fixture_paths()).expect("fixtures should load")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn fixture_matrix(data: &LeagueData) -> ValueMatrix {
    daily::build_value_matrix(&data.daily, &Config::default().daily_value)
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("statline_it_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ===========================================================================
// Ingestion
// ===========================================================================

#[test]
fn fixtures_load_and_skip_bad_rows() {
    let data = load_fixtures();
    // 15 days x 8 players, minus one missed game; the unknown role and the
    // bad date are dropped.
    assert_eq!(data.daily.len(), 119);
    assert_eq!(data.rosters.len(), 7);
    assert_eq!(data.daily.iter().map(|r| r.date).min(), Some(date("2025-04-07")));
    assert_eq!(data.latest_date(), Some(date("2025-04-21")));
    assert!(data.daily.iter().all(|r| r.player_id != "coach1"));
}

#[test]
fn empty_stat_cells_read_as_zero() {
    let data = load_fixtures();
    let batter = data
        .daily
        .iter()
        .find(|r| r.player_id == "b_high")
        .unwrap();
    assert_eq!(batter.stats.outs_pitched, 0.0);
    assert_eq!(batter.stats.strikeouts_pitched, 0.0);
    let pitcher = data.daily.iter().find(|r| r.player_id == "p_high").unwrap();
    assert_eq!(pitcher.stats.runs, 0.0);
    assert_eq!(pitcher.stats.outs_pitched, 18.0);
}

// ===========================================================================
// Daily values and rolling windows
// ===========================================================================

#[test]
fn daily_values_rank_players_within_role() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    assert_eq!(m.num_dates(), 15);
    assert_eq!(m.num_players(), 8);

    let d = date("2025-04-07");
    assert!(m.value(d, "fa1") > m.value(d, "b_high"));
    assert!(m.value(d, "b_high") > m.value(d, "b_mid"));
    assert!(m.value(d, "b_mid") > m.value(d, "b_low"));
    assert!(m.value(d, "p_high") > m.value(d, "p_mid"));
    assert!(m.value(d, "p_mid") > m.value(d, "p_low"));

    // b_mid sat out April 9.
    assert_eq!(m.value(date("2025-04-09"), "b_mid"), 0.0);
}

#[test]
fn batting_cohort_sums_to_zero_each_day() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    for &d in m.dates() {
        let total: f64 = ["fa1", "b_high", "b_mid", "b_low"]
            .iter()
            .map(|p| m.value(d, p))
            .sum();
        assert!(total.abs() < 1e-9, "batting values on {d} sum to {total}");
    }
}

#[test]
fn rolling_values_are_undefined_until_window_fills() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    let rolling = statline_core::valuation::rolling::rolling_mean(&m, 7);
    assert_eq!(rolling.value_at(date("2025-04-12"), "p_high"), None);
    // p_high's daily value is the same every day.
    let first = m.value(date("2025-04-07"), "p_high");
    let seventh = rolling.value_at(date("2025-04-13"), "p_high").unwrap();
    assert!((seventh - first).abs() < 1e-9);
}

#[test]
fn window_sweep_on_fixtures() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    let config = WindowConfig {
        horizon_days: 3,
        min_window: 1,
        max_window: 9,
        step: 2,
        retention: 0.9,
    };
    let report = window::optimize_window(&m, &config);
    assert!(!report.correlations.is_empty());
    assert!(report.correlations.keys().all(|w| config.candidates().contains(w)));
    let selected = report.selected.unwrap();
    // Production is nearly constant, so short windows already predict well.
    assert!(selected.correlation >= 0.9 * report.max_correlation.unwrap());
}

// ===========================================================================
// League analyses
// ===========================================================================

#[test]
fn keepers_from_fixtures() {
    let data = load_fixtures();
    let config = KeeperConfig {
        min_pa: 0.0,
        min_ip: 0.0,
        per_team: 2,
        ..KeeperConfig::default()
    };
    let rows = keepers::rank_keepers(&data.daily, &config, &ingest::team_abbrevs(&data.rosters));
    let listed: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.team_id.as_str(), r.player_id.as_str()))
        .collect();
    // Free agents are never listed; team 1 keeps its two best.
    assert!(listed.iter().all(|(team, _)| *team == "1" || *team == "2"));
    assert!(!listed.iter().any(|(_, p)| *p == "fa1" || *p == "fa_p"));
    assert_eq!(listed.iter().filter(|(team, _)| *team == "1").count(), 2);
    assert_eq!(rows[0].team_abbrev, "ALP");
    assert!(rows[0].total_value >= rows[1].total_value);
}

#[test]
fn default_keeper_thresholds_exclude_light_batters() {
    let data = load_fixtures();
    let rows = keepers::rank_keepers(&data.daily, &KeeperConfig::default(), &BTreeMap::new());
    // 60 PA is well short of 200; 90 IP clears 50.
    assert!(rows.iter().all(|r| r.key_stats.starts_with("ERA:")));
    assert_eq!(rows.len(), 3);
}

#[test]
fn roster_comparison_flags_weak_players() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    let config = WaiverConfig {
        window_days: 7,
        ..WaiverConfig::default()
    };
    let names = daily::player_names(&data.daily);
    let recs = waivers::recommend(&m, &data.rosters, &config, &names);

    // April 7 has no 7-day history; April 14 flags b_low and p_low; April 21
    // adds b_mid, picked up on April 16.
    let flagged: Vec<(NaiveDate, &str)> = recs
        .iter()
        .map(|r| (r.checkpoint_date, r.roster_player_id.as_str()))
        .collect();
    assert_eq!(
        flagged,
        vec![
            (date("2025-04-14"), "b_low"),
            (date("2025-04-14"), "p_low"),
            (date("2025-04-21"), "b_low"),
            (date("2025-04-21"), "p_low"),
            (date("2025-04-21"), "b_mid"),
        ]
    );
    let best: Vec<&str> = recs[0]
        .alternatives
        .iter()
        .map(|a| a.player_name.as_str())
        .collect();
    assert_eq!(best, vec!["Free Agent One", "Free Arm"]);
}

#[test]
fn team_value_matches_player_series_with_inclusive_bounds() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    let latest = data.latest_date().unwrap();
    let summary = behavior::analyze_behavior(&m, &data.rosters, latest, &BehaviorConfig::default());

    let mut expected = 0.0;
    for interval in data.rosters.iter().filter(|r| r.team_id == "1") {
        let mut day = interval.start_date;
        while day <= interval.effective_end(latest) {
            expected += m.value(day, &interval.player_id);
            day += Duration::days(1);
        }
    }
    let team1 = summary.teams.iter().find(|t| t.team_id == "1").unwrap();
    assert!((team1.total_value - expected).abs() < 1e-9);
    assert!((team1.value_per_day - expected / 15.0).abs() < 1e-9);

    // b_mid's first interval covers April 7 through April 12 inclusive.
    let b_mid_days: f64 = (7..=12)
        .map(|d| m.value(NaiveDate::from_ymd_opt(2025, 4, d).unwrap(), "b_mid"))
        .sum();
    assert!((behavior::interval_value(&m, "b_mid", date("2025-04-07"), date("2025-04-12")) - b_mid_days).abs() < 1e-12);
}

#[test]
fn roster_behavior_on_fixtures() {
    let data = load_fixtures();
    let m = fixture_matrix(&data);
    let latest = data.latest_date().unwrap();
    let summary = behavior::analyze_behavior(&m, &data.rosters, latest, &BehaviorConfig::default());

    assert_eq!(summary.season_days, 15);
    let order: Vec<&str> = summary.teams.iter().map(|t| t.team_id.as_str()).collect();
    assert_eq!(order, vec!["1", "2"]);

    let alp = &summary.teams[0];
    let brv = &summary.teams[1];
    assert_eq!(alp.team_abbrev, "ALP");
    assert_eq!(alp.drops, 1);
    assert_eq!(alp.avg_hold_days, Some(5.0));
    assert_eq!(brv.avg_hold_days, None);
    // One add after the grace period over a two-week season.
    assert_eq!(brv.adds, 1);
    assert!((brv.churn_rate - 0.5).abs() < 1e-12);
    assert!((summary.optimal_churn.unwrap() - 0.25).abs() < 1e-12);
    assert!((brv.churn_delta_from_optimal - 0.25).abs() < 1e-12);
    assert!((summary.value_vs_churn_correlation.unwrap() + 1.0).abs() < 1e-9);
    assert_eq!(summary.value_vs_hold_correlation, None);
}

// ===========================================================================
// Reports
// ===========================================================================

#[test]
fn full_pipeline_writes_every_output() {
    let data = load_fixtures();
    let config = Config::default();
    let m = fixture_matrix(&data);
    let latest = data.latest_date().unwrap();
    let dir = temp_dir("pipeline");

    let window_report = window::optimize_window(&m, &config.window);
    let keeper_rows = keepers::rank_keepers(&data.daily, &config.keepers, &ingest::team_abbrevs(&data.rosters));
    let recs = waivers::recommend(&m, &data.rosters, &config.waivers, &daily::player_names(&data.daily));
    let summary = behavior::analyze_behavior(&m, &data.rosters, latest, &config.behavior);

    report::write_keepers(&dir, &keeper_rows).unwrap();
    report::write_window_correlations(&dir, &window_report).unwrap();
    report::write_recommendations(&dir, &recs).unwrap();
    report::write_team_success(&dir, &summary).unwrap();
    report::write_summary(&dir, &report::LeagueSummary::new(&window_report, &summary)).unwrap();

    let team_lines = read_lines(&dir.join(report::TEAM_SUCCESS_FILE));
    assert_eq!(
        team_lines[0],
        "team_id,team_abbrev,total_value,value_per_day,churn_rate,avg_hold_days,median_hold_days,std_hold_days,drops,churn_delta_from_optimal"
    );
    assert_eq!(team_lines.len(), 3);
    assert!(team_lines[2].starts_with("2,BRV,"));

    // 15 dates cannot fill a 28-day window, so no checkpoint is evaluated.
    assert_eq!(read_lines(&dir.join(report::RECOMMENDATIONS_FILE)).len(), 1);
    // Neither can the default 3..=90 sweep with a 7-day horizon beyond window 8.
    let window_lines = read_lines(&dir.join(report::WINDOW_CORRELATIONS_FILE));
    assert!(window_lines.len() >= 2);
    assert_eq!(window_lines.iter().filter(|l| l.ends_with(",true")).count(), 1);

    assert_eq!(read_lines(&dir.join(report::KEEPERS_FILE)).len(), 4);
    let json = std::fs::read_to_string(dir.join(report::SUMMARY_FILE)).unwrap();
    assert!(json.contains("\"selected_window\""));

    let _ = std::fs::remove_dir_all(&dir);
}
