// Cross-sectional normalization of raw categories into standard scores.

use crate::category::{Category, StatLine};
use crate::stats::{compute_pool_stats, compute_zscore, PoolStats};

// ---------------------------------------------------------------------------
// Standard scores
// ---------------------------------------------------------------------------

/// Per-category standard scores for one player, in the category order the
/// cohort was normalized with. Positive always means better than the cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScores {
    scores: Vec<(Category, f64)>,
}

impl StandardScores {
    pub fn get(&self, category: Category) -> Option<f64> {
        self.scores
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, z)| *z)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.scores.iter().copied()
    }

    /// Sum of every category score, accumulated in category order.
    pub fn total(&self) -> f64 {
        self.scores.iter().map(|(_, z)| z).sum()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a cohort of stat lines over `categories`.
///
/// Each category is scored against the cohort's mean and population standard
/// deviation. A category with no spread (identical values, a single player,
/// an empty cohort) scores 0.0 for everyone. Categories listed in `ascending`
/// are lower-is-better and have their sign flipped.
///
/// The result is index-aligned with `cohort`.
pub fn normalize(
    cohort: &[&StatLine],
    categories: &[Category],
    ascending: &[Category],
) -> Vec<StandardScores> {
    let pool: Vec<(Category, PoolStats, bool)> = categories
        .iter()
        .map(|&cat| {
            let values: Vec<f64> = cohort.iter().map(|line| cat.value(line)).collect();
            (cat, compute_pool_stats(&values), ascending.contains(&cat))
        })
        .collect();

    cohort
        .iter()
        .map(|line| StandardScores {
            scores: pool
                .iter()
                .map(|&(cat, stats, lower_is_better)| {
                    let z = compute_zscore(cat.value(line), &stats);
                    // Avoid emitting -0.0 for degenerate categories.
                    let z = if lower_is_better && z != 0.0 { -z } else { z };
                    (cat, z)
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn batter(runs: f64, hr: f64) -> StatLine {
        StatLine {
            runs,
            home_runs: hr,
            ..StatLine::default()
        }
    }

    fn pitcher(er: f64, k: f64) -> StatLine {
        StatLine {
            earned_runs: er,
            strikeouts_pitched: k,
            ..StatLine::default()
        }
    }

    #[test]
    fn identical_values_score_zero() {
        let lines = [batter(3.0, 1.0), batter(3.0, 2.0), batter(3.0, 0.0)];
        let cohort: Vec<&StatLine> = lines.iter().collect();
        let scores = normalize(&cohort, &[Category::Runs, Category::HomeRuns], &[]);
        for s in &scores {
            assert_eq!(s.get(Category::Runs), Some(0.0));
        }
        assert!(scores[1].get(Category::HomeRuns).unwrap() > 0.0);
    }

    #[test]
    fn fractional_identical_values_score_zero() {
        let lines = [batter(0.1, 0.0), batter(0.1, 0.0), batter(0.1, 0.0)];
        let cohort: Vec<&StatLine> = lines.iter().collect();
        let scores = normalize(&cohort, &[Category::Runs], &[]);
        assert!(scores.iter().all(|s| s.get(Category::Runs) == Some(0.0)));
    }

    #[test]
    fn single_player_cohort_scores_zero() {
        let line = pitcher(7.0, 12.0);
        let scores = normalize(
            &[&line],
            &[Category::EarnedRuns, Category::Strikeouts],
            &[Category::EarnedRuns],
        );
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].get(Category::EarnedRuns), Some(0.0));
        assert_eq!(scores[0].get(Category::Strikeouts), Some(0.0));
        assert_eq!(scores[0].total(), 0.0);
    }

    #[test]
    fn empty_cohort_is_empty() {
        assert!(normalize(&[], &[Category::Runs], &[]).is_empty());
    }

    #[test]
    fn known_zscores() {
        // Runs 1, 3: mean 2, population stdev 1.
        let lines = [batter(1.0, 0.0), batter(3.0, 0.0)];
        let cohort: Vec<&StatLine> = lines.iter().collect();
        let scores = normalize(&cohort, &[Category::Runs], &[]);
        assert!((scores[0].get(Category::Runs).unwrap() + 1.0).abs() < 1e-12);
        assert!((scores[1].get(Category::Runs).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ascending_category_inverts_sign() {
        let lines = [pitcher(1.0, 5.0), pitcher(4.0, 5.0), pitcher(7.0, 5.0)];
        let cohort: Vec<&StatLine> = lines.iter().collect();
        let scores = normalize(&cohort, &[Category::EarnedRuns], &[Category::EarnedRuns]);
        let a = scores[0].get(Category::EarnedRuns).unwrap();
        let b = scores[1].get(Category::EarnedRuns).unwrap();
        let c = scores[2].get(Category::EarnedRuns).unwrap();
        assert!(a > b && b > c);
        assert!(a > 0.0);
    }

    #[test]
    fn total_is_exact_sum_of_categories() {
        let lines = [pitcher(1.0, 9.0), pitcher(4.0, 3.0), pitcher(2.0, 6.0), pitcher(0.0, 1.0)];
        let cohort: Vec<&StatLine> = lines.iter().collect();
        let cats = [Category::EarnedRuns, Category::Strikeouts];
        let scores = normalize(&cohort, &cats, &[Category::EarnedRuns]);
        for s in &scores {
            let manual = s.get(Category::EarnedRuns).unwrap() + s.get(Category::Strikeouts).unwrap();
            assert_eq!(s.total(), manual);
            assert_eq!(s.iter().count(), 2);
        }
    }

    #[test]
    fn rate_categories_use_line_sums() {
        let a = StatLine {
            outs_pitched: 30.0,
            earned_runs: 2.0,
            ..StatLine::default()
        };
        let b = StatLine {
            outs_pitched: 30.0,
            earned_runs: 6.0,
            ..StatLine::default()
        };
        let scores = normalize(&[&a, &b], &[Category::Era], &[Category::Era]);
        assert!(scores[0].get(Category::Era).unwrap() > 0.0);
        assert!(scores[1].get(Category::Era).unwrap() < 0.0);
    }
}
