// Statistical categories, player roles, and the raw stat line they derive from.
//
// A `StatLine` carries the full declared column set for one player over one
// time bucket (a day or a season). Every `Category` is a pure function of a
// stat line, so counting and rate categories share a single code path.

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Whether a record describes batting or pitching production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batter,
    Pitcher,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Batter => "Batter",
            Role::Pitcher => "Pitcher",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    /// Case-insensitive parse of `batter` / `pitcher`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batter" => Ok(Role::Batter),
            "pitcher" => Ok(Role::Pitcher),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Stat line
// ---------------------------------------------------------------------------

/// Raw counting stats for one player over one time bucket.
///
/// Absent source columns are zero. Lines are additive, so a season line is
/// the sum of that player's daily lines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    pub runs: f64,
    pub home_runs: f64,
    pub rbi: f64,
    pub stolen_bases: f64,
    pub hits: f64,
    pub at_bats: f64,
    pub walks_batting: f64,
    pub hit_by_pitch: f64,
    pub sac_flies: f64,
    pub total_bases: f64,
    pub plate_appearances: f64,
    pub earned_runs: f64,
    pub outs_pitched: f64,
    pub walks_pitching: f64,
    pub hits_allowed: f64,
    pub strikeouts_pitched: f64,
    pub quality_starts: f64,
    pub saves_plus_holds: f64,
}

/// Divide, returning 0.0 when the denominator is zero or the result is not finite.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

impl StatLine {
    /// On-base fraction: (H + BB + HBP) / PA.
    pub fn obp(&self) -> f64 {
        guarded_ratio(
            self.hits + self.walks_batting + self.hit_by_pitch,
            self.plate_appearances,
        )
    }

    /// Slugging: TB / AB.
    pub fn slg(&self) -> f64 {
        guarded_ratio(self.total_bases, self.at_bats)
    }

    pub fn ops(&self) -> f64 {
        self.obp() + self.slg()
    }

    /// Innings pitched derived from outs recorded.
    pub fn innings_pitched(&self) -> f64 {
        self.outs_pitched / 3.0
    }

    pub fn era(&self) -> f64 {
        guarded_ratio(self.earned_runs * 9.0, self.innings_pitched())
    }

    pub fn whip(&self) -> f64 {
        guarded_ratio(self.walks_pitching + self.hits_allowed, self.innings_pitched())
    }

    pub fn k_per_nine(&self) -> f64 {
        guarded_ratio(self.strikeouts_pitched * 9.0, self.innings_pitched())
    }

    /// Walks plus hits allowed, the per-day stand-in for WHIP.
    pub fn walks_plus_hits(&self) -> f64 {
        self.walks_pitching + self.hits_allowed
    }
}

impl AddAssign for StatLine {
    fn add_assign(&mut self, rhs: Self) {
        self.runs += rhs.runs;
        self.home_runs += rhs.home_runs;
        self.rbi += rhs.rbi;
        self.stolen_bases += rhs.stolen_bases;
        self.hits += rhs.hits;
        self.at_bats += rhs.at_bats;
        self.walks_batting += rhs.walks_batting;
        self.hit_by_pitch += rhs.hit_by_pitch;
        self.sac_flies += rhs.sac_flies;
        self.total_bases += rhs.total_bases;
        self.plate_appearances += rhs.plate_appearances;
        self.earned_runs += rhs.earned_runs;
        self.outs_pitched += rhs.outs_pitched;
        self.walks_pitching += rhs.walks_pitching;
        self.hits_allowed += rhs.hits_allowed;
        self.strikeouts_pitched += rhs.strikeouts_pitched;
        self.quality_starts += rhs.quality_starts;
        self.saves_plus_holds += rhs.saves_plus_holds;
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A scoring category. The serde names match the keys used in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "R")]
    Runs,
    #[serde(rename = "HR")]
    HomeRuns,
    #[serde(rename = "RBI")]
    RunsBattedIn,
    #[serde(rename = "SB")]
    StolenBases,
    #[serde(rename = "OBP")]
    OnBase,
    #[serde(rename = "SLG")]
    Slugging,
    #[serde(rename = "OPS")]
    Ops,
    #[serde(rename = "K")]
    Strikeouts,
    #[serde(rename = "QS")]
    QualityStarts,
    #[serde(rename = "SVHD")]
    SavesPlusHolds,
    #[serde(rename = "ER")]
    EarnedRuns,
    #[serde(rename = "WH")]
    WalksPlusHits,
    #[serde(rename = "ERA")]
    Era,
    #[serde(rename = "WHIP")]
    Whip,
    #[serde(rename = "K9")]
    StrikeoutsPerNine,
}

impl Category {
    /// Config key for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Runs => "R",
            Category::HomeRuns => "HR",
            Category::RunsBattedIn => "RBI",
            Category::StolenBases => "SB",
            Category::OnBase => "OBP",
            Category::Slugging => "SLG",
            Category::Ops => "OPS",
            Category::Strikeouts => "K",
            Category::QualityStarts => "QS",
            Category::SavesPlusHolds => "SVHD",
            Category::EarnedRuns => "ER",
            Category::WalksPlusHits => "WH",
            Category::Era => "ERA",
            Category::Whip => "WHIP",
            Category::StrikeoutsPerNine => "K9",
        }
    }

    /// The role whose production this category measures.
    pub fn role(&self) -> Role {
        match self {
            Category::Runs
            | Category::HomeRuns
            | Category::RunsBattedIn
            | Category::StolenBases
            | Category::OnBase
            | Category::Slugging
            | Category::Ops => Role::Batter,
            Category::Strikeouts
            | Category::QualityStarts
            | Category::SavesPlusHolds
            | Category::EarnedRuns
            | Category::WalksPlusHits
            | Category::Era
            | Category::Whip
            | Category::StrikeoutsPerNine => Role::Pitcher,
        }
    }

    /// Raw value of this category for a stat line. Rate categories are
    /// derived from the line's sums and are 0.0 for a zero denominator.
    pub fn value(&self, line: &StatLine) -> f64 {
        match self {
            Category::Runs => line.runs,
            Category::HomeRuns => line.home_runs,
            Category::RunsBattedIn => line.rbi,
            Category::StolenBases => line.stolen_bases,
            Category::OnBase => line.obp(),
            Category::Slugging => line.slg(),
            Category::Ops => line.ops(),
            Category::Strikeouts => line.strikeouts_pitched,
            Category::QualityStarts => line.quality_starts,
            Category::SavesPlusHolds => line.saves_plus_holds,
            Category::EarnedRuns => line.earned_runs,
            Category::WalksPlusHits => line.walks_plus_hits(),
            Category::Era => line.era(),
            Category::Whip => line.whip(),
            Category::StrikeoutsPerNine => line.k_per_nine(),
        }
    }

    /// Decimal places used when printing a value of this category.
    pub fn display_precision(&self) -> usize {
        match self {
            Category::OnBase | Category::Slugging | Category::Ops => 3,
            Category::Era | Category::Whip | Category::StrikeoutsPerNine => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
