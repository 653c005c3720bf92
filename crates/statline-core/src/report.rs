// Output tables: CSV files and a JSON summary in the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::league::behavior::{BehaviorSummary, TeamSuccess};
use crate::league::keepers::KeeperRow;
use crate::league::waivers::WaiverRecommendation;
use crate::valuation::window::{SelectedWindow, WindowReport};

pub const KEEPERS_FILE: &str = "keepers.csv";
pub const WINDOW_CORRELATIONS_FILE: &str = "window_correlations.csv";
pub const RECOMMENDATIONS_FILE: &str = "roster_recommendations.csv";
pub const TEAM_SUCCESS_FILE: &str = "team_success.csv";
pub const SUMMARY_FILE: &str = "league_summary.json";

const KEEPER_HEADERS: &[&str] = &[
    "team_id",
    "team_abbrev",
    "player_name",
    "role",
    "total_value",
    "key_stats",
];
const WINDOW_HEADERS: &[&str] = &["window_length", "correlation", "selected"];
const RECOMMENDATION_HEADERS: &[&str] = &[
    "checkpoint_date",
    "roster_player_name",
    "roster_player_value",
    "recommended_alternatives",
];
const TEAM_SUCCESS_HEADERS: &[&str] = &[
    "team_id",
    "team_abbrev",
    "total_value",
    "value_per_day",
    "churn_rate",
    "avg_hold_days",
    "median_hold_days",
    "std_hold_days",
    "drops",
    "churn_delta_from_optimal",
];

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error writing {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn round_opt(value: Option<f64>, places: i32) -> Option<f64> {
    value.map(|v| round_to(v, places))
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct KeeperCsvRow<'a> {
    pub team_id: &'a str,
    pub team_abbrev: &'a str,
    pub player_name: &'a str,
    pub role: &'static str,
    pub total_value: f64,
    pub key_stats: &'a str,
}

impl<'a> From<&'a KeeperRow> for KeeperCsvRow<'a> {
    fn from(row: &'a KeeperRow) -> Self {
        KeeperCsvRow {
            team_id: &row.team_id,
            team_abbrev: &row.team_abbrev,
            player_name: &row.player_name,
            role: row.role.label(),
            total_value: round_to(row.total_value, 2),
            key_stats: &row.key_stats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WindowCsvRow {
    pub window_length: usize,
    pub correlation: f64,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationCsvRow<'a> {
    pub checkpoint_date: String,
    pub roster_player_name: &'a str,
    pub roster_player_value: String,
    pub recommended_alternatives: String,
}

impl<'a> From<&'a WaiverRecommendation> for RecommendationCsvRow<'a> {
    fn from(rec: &'a WaiverRecommendation) -> Self {
        RecommendationCsvRow {
            checkpoint_date: rec.checkpoint_date.format("%Y-%m-%d").to_string(),
            roster_player_name: &rec.roster_player_name,
            roster_player_value: format!("{:.2}", rec.roster_player_value),
            recommended_alternatives: rec
                .alternatives
                .iter()
                .map(|a| format!("{} ({:.2})", a.player_name, a.value))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamSuccessCsvRow<'a> {
    pub team_id: &'a str,
    pub team_abbrev: &'a str,
    pub total_value: f64,
    pub value_per_day: f64,
    pub churn_rate: f64,
    pub avg_hold_days: Option<f64>,
    pub median_hold_days: Option<f64>,
    pub std_hold_days: Option<f64>,
    pub drops: usize,
    pub churn_delta_from_optimal: f64,
}

impl<'a> From<&'a TeamSuccess> for TeamSuccessCsvRow<'a> {
    fn from(team: &'a TeamSuccess) -> Self {
        TeamSuccessCsvRow {
            team_id: &team.team_id,
            team_abbrev: &team.team_abbrev,
            total_value: round_to(team.total_value, 2),
            value_per_day: round_to(team.value_per_day, 4),
            churn_rate: round_to(team.churn_rate, 2),
            avg_hold_days: round_opt(team.avg_hold_days, 1),
            median_hold_days: round_opt(team.median_hold_days, 1),
            std_hold_days: round_opt(team.std_hold_days, 1),
            drops: team.drops,
            churn_delta_from_optimal: round_to(team.churn_delta_from_optimal, 2),
        }
    }
}

/// Contents of `league_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueSummary {
    pub selected_window: Option<SelectedWindow>,
    pub max_correlation: Option<f64>,
    pub windows_evaluated: usize,
    pub optimal_churn: Option<f64>,
    pub optimal_hold_days: Option<f64>,
    pub value_vs_hold_correlation: Option<f64>,
    pub value_vs_churn_correlation: Option<f64>,
    pub teams: usize,
}

impl LeagueSummary {
    pub fn new(window: &WindowReport, behavior: &BehaviorSummary) -> Self {
        LeagueSummary {
            selected_window: window.selected.map(|s| SelectedWindow {
                window: s.window,
                correlation: round_to(s.correlation, 4),
            }),
            max_correlation: round_opt(window.max_correlation, 4),
            windows_evaluated: window.correlations.len(),
            optimal_churn: round_opt(behavior.optimal_churn, 2),
            optimal_hold_days: round_opt(behavior.optimal_hold_days, 1),
            value_vs_hold_correlation: round_opt(behavior.value_vs_hold_correlation, 4),
            value_vs_churn_correlation: round_opt(behavior.value_vs_churn_correlation, 4),
            teams: behavior.teams.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(dir).map_err(|e| ReportError::Io {
        path: dir.display().to_string(),
        source: e,
    })
}

/// Write `rows` under an explicit header so empty tables still carry one.
fn write_csv<T: Serialize>(
    path: &Path,
    headers: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<usize, ReportError> {
    let csv_err = |e: csv::Error| ReportError::Csv {
        path: path.display().to_string(),
        source: e,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(headers).map_err(csv_err)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
        count += 1;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(count)
}

pub fn write_keepers(dir: &Path, rows: &[KeeperRow]) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(KEEPERS_FILE);
    let n = write_csv(&path, KEEPER_HEADERS, rows.iter().map(KeeperCsvRow::from))?;
    info!("Wrote {} keeper rows to {}", n, path.display());
    Ok(path)
}

/// Every window with a defined correlation, ascending, with the selection flagged.
pub fn write_window_correlations(dir: &Path, report: &WindowReport) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(WINDOW_CORRELATIONS_FILE);
    let selected = report.selected.map(|s| s.window);
    let rows = report.correlations.iter().map(|(&w, &c)| WindowCsvRow {
        window_length: w,
        correlation: round_to(c, 4),
        selected: Some(w) == selected,
    });
    let n = write_csv(&path, WINDOW_HEADERS, rows)?;
    info!("Wrote {} window correlations to {}", n, path.display());
    Ok(path)
}

pub fn write_recommendations(
    dir: &Path,
    recommendations: &[WaiverRecommendation],
) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(RECOMMENDATIONS_FILE);
    let n = write_csv(
        &path,
        RECOMMENDATION_HEADERS,
        recommendations.iter().map(RecommendationCsvRow::from),
    )?;
    info!("Wrote {} roster recommendations to {}", n, path.display());
    Ok(path)
}

pub fn write_team_success(dir: &Path, summary: &BehaviorSummary) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(TEAM_SUCCESS_FILE);
    let n = write_csv(&path, TEAM_SUCCESS_HEADERS, summary.teams.iter().map(TeamSuccessCsvRow::from))?;
    info!("Wrote {} team rows to {}", n, path.display());
    Ok(path)
}

pub fn write_summary(dir: &Path, summary: &LeagueSummary) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(SUMMARY_FILE);
    let text = serde_json::to_string_pretty(summary).map_err(|e| ReportError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    fs::write(&path, text).map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    info!("Wrote league summary to {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Role;
    use crate::league::waivers::Alternative;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("statline_report_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.55556, 4), -0.5556);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn recommendation_row_formats_alternatives() {
        let rec = WaiverRecommendation {
            checkpoint_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            roster_player_id: "1".into(),
            roster_player_name: "Slumping Guy".into(),
            roster_player_value: -0.5,
            alternatives: vec![
                Alternative {
                    player_id: "2".into(),
                    player_name: "Hot Hand".into(),
                    value: 1.234,
                },
                Alternative {
                    player_id: "3".into(),
                    player_name: "Next Up".into(),
                    value: 0.98,
                },
            ],
        };
        let row = RecommendationCsvRow::from(&rec);
        assert_eq!(row.checkpoint_date, "2025-06-02");
        assert_eq!(row.roster_player_value, "-0.50");
        assert_eq!(row.recommended_alternatives, "Hot Hand (1.23), Next Up (0.98)");
    }

    #[test]
    fn window_csv_marks_selection() {
        let dir = temp_dir("window");
        let report = WindowReport {
            correlations: [(3, 0.41234), (6, 0.5), (9, 0.49)].into_iter().collect::<BTreeMap<_, _>>(),
            max_correlation: Some(0.5),
            selected: Some(SelectedWindow {
                window: 6,
                correlation: 0.5,
            }),
        };
        let path = write_window_correlations(&dir, &report).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "window_length,correlation,selected");
        assert_eq!(lines[1], "3,0.4123,false");
        assert_eq!(lines[2], "6,0.5,true");
        assert_eq!(lines.len(), 4);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn keeper_csv_has_expected_columns() {
        let dir = temp_dir("keepers");
        let rows = vec![KeeperRow {
            team_id: "1".into(),
            team_abbrev: "AAA".into(),
            player_id: "p".into(),
            player_name: "Some Player".into(),
            role: Role::Pitcher,
            total_value: 3.14159,
            key_stats: "ERA:2.50/K9:10.00".into(),
        }];
        let path = write_keepers(&dir, &rows).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("team_id,team_abbrev,player_name,role,total_value,key_stats")
        );
        assert_eq!(lines.next(), Some("1,AAA,Some Player,Pitcher,3.14,ERA:2.50/K9:10.00"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = temp_dir("empty");
        let path = write_recommendations(&dir, &[]).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(
            text.trim_end(),
            "checkpoint_date,roster_player_name,roster_player_value,recommended_alternatives"
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn summary_json_round_trips_fields() {
        let dir = temp_dir("summary");
        let summary = LeagueSummary {
            selected_window: Some(SelectedWindow {
                window: 21,
                correlation: 0.61,
            }),
            max_correlation: Some(0.65),
            windows_evaluated: 30,
            optimal_churn: Some(1.5),
            optimal_hold_days: None,
            value_vs_hold_correlation: None,
            value_vs_churn_correlation: Some(-0.2),
            teams: 10,
        };
        let path = write_summary(&dir, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["selected_window"]["window"], 21);
        assert_eq!(value["optimal_hold_days"], serde_json::Value::Null);
        assert_eq!(value["teams"], 10);
        let _ = fs::remove_dir_all(&dir);
    }
}
