// Input loading: per-day player stat rows and roster intervals.
//
// Both files are CSV. The daily stats schema declares every stat column up
// front; a column missing from the file, or an empty cell, reads as zero here
// and nowhere else.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::category::{Role, StatLine};
use crate::config::DataPaths;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player's production on one day, in one role.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub player_id: String,
    pub player_name: String,
    pub team_id: String,
    pub team_abbrev: String,
    pub role: Role,
    pub stats: StatLine,
}

/// A span during which a team held a player. An open `end_date` means the
/// player is still held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterInterval {
    pub team_id: String,
    pub team_abbrev: String,
    pub player_id: String,
    pub player_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl RosterInterval {
    /// End date with an open interval clamped to `latest`.
    pub fn effective_end(&self, latest: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(latest)
    }

    /// Whether the player was held on `date`, both boundaries inclusive.
    pub fn covers(&self, date: NaiveDate, latest: NaiveDate) -> bool {
        self.start_date <= date && date <= self.effective_end(latest)
    }

    /// Whole days between start and (clamped) end.
    pub fn days_held(&self, latest: NaiveDate) -> i64 {
        (self.effective_end(latest) - self.start_date).num_days()
    }
}

/// Everything the analyses read, loaded once.
#[derive(Debug, Clone)]
pub struct LeagueData {
    pub daily: Vec<DailyRecord>,
    pub rosters: Vec<RosterInterval>,
}

impl LeagueData {
    /// Latest date with stats; open roster intervals are clamped to it.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.daily.iter().map(|r| r.date).max()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Daily stats row. Stat columns are optional so that a missing column or an
/// empty cell both read as zero.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawDailyRow {
    date: String,
    player_id: String,
    #[serde(default)]
    player_name: String,
    #[serde(default)]
    team_id: String,
    #[serde(default)]
    team_abbrev: String,
    role: String,
    #[serde(default)]
    R: Option<f64>,
    #[serde(default)]
    HR: Option<f64>,
    #[serde(default)]
    RBI: Option<f64>,
    #[serde(default)]
    SB: Option<f64>,
    #[serde(default)]
    H: Option<f64>,
    #[serde(default)]
    AB: Option<f64>,
    #[serde(default)]
    walks_batting: Option<f64>,
    #[serde(default)]
    HBP: Option<f64>,
    #[serde(default)]
    SF: Option<f64>,
    #[serde(default)]
    TB: Option<f64>,
    #[serde(default)]
    PA: Option<f64>,
    #[serde(default)]
    ER: Option<f64>,
    #[serde(default)]
    outs_pitched: Option<f64>,
    #[serde(default)]
    walks_pitching: Option<f64>,
    #[serde(default)]
    hits_allowed: Option<f64>,
    #[serde(default)]
    strikeouts_pitched: Option<f64>,
    #[serde(default)]
    QS: Option<f64>,
    #[serde(default)]
    SVHD: Option<f64>,
}

impl RawDailyRow {
    fn stat_line(&self) -> StatLine {
        let z = |v: Option<f64>| v.unwrap_or(0.0);
        StatLine {
            runs: z(self.R),
            home_runs: z(self.HR),
            rbi: z(self.RBI),
            stolen_bases: z(self.SB),
            hits: z(self.H),
            at_bats: z(self.AB),
            walks_batting: z(self.walks_batting),
            hit_by_pitch: z(self.HBP),
            sac_flies: z(self.SF),
            total_bases: z(self.TB),
            plate_appearances: z(self.PA),
            earned_runs: z(self.ER),
            outs_pitched: z(self.outs_pitched),
            walks_pitching: z(self.walks_pitching),
            hits_allowed: z(self.hits_allowed),
            strikeouts_pitched: z(self.strikeouts_pitched),
            quality_starts: z(self.QS),
            saves_plus_holds: z(self.SVHD),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    team_id: String,
    #[serde(default)]
    team_abbrev: String,
    player_id: String,
    #[serde(default)]
    player_name: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse `YYYY-MM-DD`, tolerating a trailing time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn all_finite(line: &StatLine) -> bool {
    [
        line.runs,
        line.home_runs,
        line.rbi,
        line.stolen_bases,
        line.hits,
        line.at_bats,
        line.walks_batting,
        line.hit_by_pitch,
        line.sac_flies,
        line.total_bases,
        line.plate_appearances,
        line.earned_runs,
        line.outs_pitched,
        line.walks_pitching,
        line.hits_allowed,
        line.strikeouts_pitched,
        line.quality_starts,
        line.saves_plus_holds,
    ]
    .iter()
    .all(|v| v.is_finite())
}

/// Team id -> abbreviation, last seen wins.
pub fn team_abbrevs(intervals: &[RosterInterval]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for interval in intervals {
        if !interval.team_abbrev.is_empty() {
            map.insert(interval.team_id.clone(), interval.team_abbrev.clone());
        }
    }
    map
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

pub fn load_daily_from_reader<R: Read>(rdr: R) -> Result<Vec<DailyRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut records = Vec::new();
    for result in reader.deserialize::<RawDailyRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed stats row: {}", e);
                continue;
            }
        };
        let Some(date) = parse_date(&raw.date) else {
            warn!("skipping stats row for '{}': bad date '{}'", raw.player_id, raw.date);
            continue;
        };
        let role = match raw.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                warn!("skipping stats row for '{}': {}", raw.player_id, e);
                continue;
            }
        };
        let stats = raw.stat_line();
        if !all_finite(&stats) {
            warn!("skipping stats row for '{}': non-finite stat value", raw.player_id);
            continue;
        }
        if raw.player_id.is_empty() {
            warn!("skipping stats row on {}: empty player_id", date);
            continue;
        }
        records.push(DailyRecord {
            date,
            player_id: raw.player_id,
            player_name: raw.player_name,
            team_id: raw.team_id,
            team_abbrev: raw.team_abbrev,
            role,
            stats,
        });
    }
    Ok(records)
}

pub fn load_rosters_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterInterval>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut intervals = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
                continue;
            }
        };
        let Some(start_date) = parse_date(&raw.start_date) else {
            warn!("skipping roster row for '{}': bad start_date '{}'", raw.player_id, raw.start_date);
            continue;
        };
        let end_date = match raw.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => match parse_date(text) {
                Some(d) => Some(d),
                None => {
                    warn!("skipping roster row for '{}': bad end_date '{}'", raw.player_id, text);
                    continue;
                }
            },
        };
        if end_date.is_some_and(|end| end < start_date) {
            warn!("skipping roster row for '{}': ends before it starts", raw.player_id);
            continue;
        }
        intervals.push(RosterInterval {
            team_id: raw.team_id,
            team_abbrev: raw.team_abbrev,
            player_id: raw.player_id,
            player_name: raw.player_name,
            start_date,
            end_date,
        });
    }
    Ok(intervals)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

pub fn load_daily_stats(path: &Path) -> Result<Vec<DailyRecord>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_daily_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_roster_history(path: &Path) -> Result<Vec<RosterInterval>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_rosters_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load both input files. Daily stats must produce at least one row; an
/// empty roster history is allowed but disables the roster analyses.
pub fn load_all(paths: &DataPaths) -> Result<LeagueData, IngestError> {
    let daily = load_daily_stats(Path::new(&paths.daily_stats))?;
    if daily.is_empty() {
        return Err(IngestError::Validation(
            "daily stats CSV produced zero valid rows".into(),
        ));
    }
    let rosters = load_roster_history(Path::new(&paths.roster_history))?;
    if rosters.is_empty() {
        warn!("roster history is empty; roster analyses will produce no rows");
    }
    info!("Loaded {} stat rows and {} roster intervals", daily.len(), rosters.len());
    Ok(LeagueData { daily, rosters })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
