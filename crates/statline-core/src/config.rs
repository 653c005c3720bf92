// Configuration loading and parsing (statline.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::category::{Category, Role};

/// Name of the single config file under `config/` (and `defaults/`).
pub const CONFIG_FILE_NAME: &str = "statline.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Fully assembled configuration. Every section falls back to the reference
/// constants when omitted from the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_paths: DataPaths,
    pub daily_value: DailyValueConfig,
    pub keepers: KeeperConfig,
    pub window: WindowConfig,
    pub waivers: WaiverConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub daily_stats: String,
    pub roster_history: String,
    pub output_dir: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            daily_stats: "data/daily_player_stats.csv".into(),
            roster_history: "data/roster_history.csv".into(),
            output_dir: "output".into(),
        }
    }
}

/// A role-split category set with its lower-is-better subset.
pub trait CategorySet {
    fn batting(&self) -> &[Category];
    fn pitching(&self) -> &[Category];
    fn ascending(&self) -> &[Category];

    fn for_role(&self, role: Role) -> &[Category] {
        match role {
            Role::Batter => self.batting(),
            Role::Pitcher => self.pitching(),
        }
    }
}

/// Categories that make up a player's daily value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DailyValueConfig {
    pub batting_categories: Vec<Category>,
    pub pitching_categories: Vec<Category>,
    pub ascending: Vec<Category>,
}

impl Default for DailyValueConfig {
    fn default() -> Self {
        DailyValueConfig {
            batting_categories: vec![
                Category::Runs,
                Category::HomeRuns,
                Category::RunsBattedIn,
                Category::StolenBases,
            ],
            pitching_categories: vec![
                Category::Strikeouts,
                Category::QualityStarts,
                Category::SavesPlusHolds,
                Category::EarnedRuns,
                Category::WalksPlusHits,
            ],
            ascending: vec![Category::EarnedRuns, Category::WalksPlusHits],
        }
    }
}

impl CategorySet for DailyValueConfig {
    fn batting(&self) -> &[Category] {
        &self.batting_categories
    }
    fn pitching(&self) -> &[Category] {
        &self.pitching_categories
    }
    fn ascending(&self) -> &[Category] {
        &self.ascending
    }
}

/// Season ranking (keeper selection) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    pub min_pa: f64,
    pub min_ip: f64,
    pub per_team: usize,
    pub batting_categories: Vec<Category>,
    pub pitching_categories: Vec<Category>,
    pub ascending: Vec<Category>,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        KeeperConfig {
            min_pa: 200.0,
            min_ip: 50.0,
            per_team: 5,
            batting_categories: vec![
                Category::Runs,
                Category::HomeRuns,
                Category::RunsBattedIn,
                Category::StolenBases,
                Category::Ops,
            ],
            pitching_categories: vec![
                Category::Era,
                Category::Whip,
                Category::StrikeoutsPerNine,
                Category::QualityStarts,
                Category::SavesPlusHolds,
            ],
            ascending: vec![Category::Era, Category::Whip],
        }
    }
}

impl CategorySet for KeeperConfig {
    fn batting(&self) -> &[Category] {
        &self.batting_categories
    }
    fn pitching(&self) -> &[Category] {
        &self.pitching_categories
    }
    fn ascending(&self) -> &[Category] {
        &self.ascending
    }
}

/// Lookback window search settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub horizon_days: usize,
    pub min_window: usize,
    pub max_window: usize,
    pub step: usize,
    /// Fraction of the best correlation a shorter window must retain.
    pub retention: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            horizon_days: 7,
            min_window: 3,
            max_window: 90,
            step: 3,
            retention: 0.90,
        }
    }
}

impl WindowConfig {
    /// Candidate window lengths in ascending order.
    pub fn candidates(&self) -> Vec<usize> {
        if self.step == 0 || self.min_window == 0 {
            return Vec::new();
        }
        (self.min_window..=self.max_window).step_by(self.step).collect()
    }
}

/// Roster versus free-agent comparison settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaiverConfig {
    pub team_id: String,
    pub window_days: usize,
    pub free_agent_pool: usize,
    pub margin: f64,
    pub max_alternatives: usize,
}

impl Default for WaiverConfig {
    fn default() -> Self {
        WaiverConfig {
            team_id: "2".into(),
            window_days: 28,
            free_agent_pool: 20,
            margin: 0.75,
            max_alternatives: 2,
        }
    }
}

/// Team success and roster behavior settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Intervals ending within this many days of the data's end count as still held.
    pub drop_buffer_days: i64,
    /// Additions during the opening days of the season are draft moves, not churn.
    pub add_grace_days: i64,
    pub max_hold_days: i64,
    pub benchmark_teams: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            drop_buffer_days: 3,
            add_grace_days: 7,
            max_hold_days: 180,
            benchmark_teams: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/statline.toml` relative to
/// `base_dir`. Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE_NAME);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| match e {
        ParseFailure::Toml(source) => ConfigError::ParseError {
            path: path.clone(),
            source,
        },
        ParseFailure::Invalid(err) => err,
    })?;
    Ok(config)
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}

fn parse_config(text: &str) -> Result<Config, ParseFailure> {
    let config: Config = toml::from_str(text).map_err(ParseFailure::Toml)?;
    validate(&config).map_err(ParseFailure::Invalid)?;
    Ok(config)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Whether a `defaults/` entry is shipped into `config/`. Templates ending in
/// `.example` stay behind for the user to fill in.
fn is_shipped_default(path: &Path) -> bool {
    path.is_file()
        && !path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".example"))
}

/// Copy `source` to `target` unless `target` already exists. Returns whether
/// a copy was made; an existing file is never touched.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let mut src = std::fs::File::open(source)
        .map_err(|e| copy_error(format!("cannot open {}: {e}", source.display())))?;
    std::io::copy(&mut src, &mut dest)
        .map_err(|e| copy_error(format!("cannot copy into {}: {e}", target.display())))?;
    Ok(true)
}

/// Seed `config/` from the shipped `defaults/` directory.
///
/// Missing files are copied; files already in `config/` are left alone so
/// local edits survive upgrades. A checkout without `defaults/` is fine as
/// long as `config/` exists. Returns the paths written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            debug!("No defaults/ in {}; using config/ as is", base_dir.display());
            return Ok(Vec::new());
        }
        return Err(copy_error(format!(
            "no defaults/ or config/ directory under {}; run statline from the project root",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut sources = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        if is_shipped_default(&path) {
            sources.push(path);
        }
    }
    // Directory order is platform-dependent.
    sources.sort();

    let mut copied = Vec::new();
    for source in sources {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if copy_if_missing(&source, &target)? {
            info!("Seeded {} from {}", target.display(), source.display());
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Loads config relative to the current working directory, copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_category_set(section: &str, set: &dyn CategorySet) -> Result<(), ConfigError> {
    for (list, role) in [("batting_categories", Role::Batter), ("pitching_categories", Role::Pitcher)] {
        let field = format!("{section}.{list}");
        let categories = set.for_role(role);
        if categories.is_empty() {
            return Err(invalid(&field, "must list at least one category"));
        }
        if let Some(wrong) = categories.iter().find(|c| c.role() != role) {
            return Err(invalid(
                &field,
                format!("{wrong} is a {} category", wrong.role().label().to_lowercase()),
            ));
        }
        for (i, cat) in categories.iter().enumerate() {
            if categories[..i].contains(cat) {
                return Err(invalid(&field, format!("{cat} is listed twice")));
            }
        }
    }

    let field = format!("{section}.ascending");
    if let Some(stray) = set
        .ascending()
        .iter()
        .find(|c| !set.batting().contains(c) && !set.pitching().contains(c))
    {
        return Err(invalid(&field, format!("{stray} is not in either category list")));
    }
    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_category_set("daily_value", &config.daily_value)?;
    validate_category_set("keepers", &config.keepers)?;

    let keepers = &config.keepers;
    if keepers.per_team == 0 {
        return Err(invalid("keepers.per_team", "must be > 0"));
    }
    if keepers.min_pa < 0.0 {
        return Err(invalid("keepers.min_pa", format!("must be >= 0, got {}", keepers.min_pa)));
    }
    if keepers.min_ip < 0.0 {
        return Err(invalid("keepers.min_ip", format!("must be >= 0, got {}", keepers.min_ip)));
    }

    let window = &config.window;
    let window_fields: &[(&str, usize)] = &[
        ("window.horizon_days", window.horizon_days),
        ("window.min_window", window.min_window),
        ("window.max_window", window.max_window),
        ("window.step", window.step),
    ];
    for (name, val) in window_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }
    if window.min_window > window.max_window {
        return Err(invalid(
            "window.min_window",
            format!(
                "must not exceed window.max_window ({} > {})",
                window.min_window, window.max_window
            ),
        ));
    }
    if !(window.retention > 0.0 && window.retention <= 1.0) {
        return Err(invalid(
            "window.retention",
            format!("must be in (0.0, 1.0], got {}", window.retention),
        ));
    }

    let waivers = &config.waivers;
    let waiver_fields: &[(&str, usize)] = &[
        ("waivers.window_days", waivers.window_days),
        ("waivers.free_agent_pool", waivers.free_agent_pool),
        ("waivers.max_alternatives", waivers.max_alternatives),
    ];
    for (name, val) in waiver_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }
    if !(waivers.margin >= 0.0) {
        return Err(invalid("waivers.margin", format!("must be >= 0, got {}", waivers.margin)));
    }
    if waivers.team_id.trim().is_empty() {
        return Err(invalid("waivers.team_id", "must not be empty"));
    }

    let behavior = &config.behavior;
    let day_fields: &[(&str, i64)] = &[
        ("behavior.drop_buffer_days", behavior.drop_buffer_days),
        ("behavior.add_grace_days", behavior.add_grace_days),
    ];
    for (name, val) in day_fields {
        if *val < 0 {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }
    if behavior.max_hold_days <= 0 {
        return Err(invalid(
            "behavior.max_hold_days",
            format!("must be > 0, got {}", behavior.max_hold_days),
        ));
    }
    if behavior.benchmark_teams == 0 {
        return Err(invalid("behavior.benchmark_teams", "must be > 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
