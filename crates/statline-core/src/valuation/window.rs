// Lookback window selection.
//
// For each candidate window W the trailing-W value at every date is paired
// with the mean over the next `horizon` dates, across every matrix player.
// The chosen window is the shortest one whose correlation keeps a fixed share
// of the best correlation seen.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::WindowConfig;
use crate::stats::PearsonAccumulator;
use crate::valuation::matrix::ValueMatrix;
use crate::valuation::rolling::{forward_mean, rolling_mean, ForwardValues};

/// The window picked by `select_window`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectedWindow {
    pub window: usize,
    pub correlation: f64,
}

/// Correlation per candidate window and the resulting selection.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    /// Only windows with a defined correlation appear here.
    pub correlations: BTreeMap<usize, f64>,
    pub max_correlation: Option<f64>,
    pub selected: Option<SelectedWindow>,
}

// ---------------------------------------------------------------------------
// Correlation per window
// ---------------------------------------------------------------------------

/// Pearson correlation between trailing-`window` and forward values over every
/// (date, player) pair where both are defined. `None` with fewer than two
/// pairs or no spread on either side.
pub fn window_correlation(
    matrix: &ValueMatrix,
    future: &ForwardValues,
    window: usize,
) -> Option<f64> {
    let past = rolling_mean(matrix, window);
    let num_players = matrix.num_players() as u64;
    let mut acc = PearsonAccumulator::new();

    for t in 0..matrix.num_dates() {
        let (Some(x_row), Some(y_row)) = (past.row(t), future.row(t)) else {
            continue;
        };

        // Merge-join two sorted sparse rows; every player absent from both
        // rows is a (0, 0) pair.
        let (mut i, mut j) = (0, 0);
        let mut nonzero = 0u64;
        while i < x_row.len() || j < y_row.len() {
            let xp = x_row.get(i).map(|&(p, _)| p);
            let yp = y_row.get(j).map(|&(p, _)| p);
            let (x, y) = match (xp, yp) {
                (Some(a), Some(b)) if a == b => {
                    let pair = (x_row[i].1, y_row[j].1);
                    i += 1;
                    j += 1;
                    pair
                }
                (Some(a), Some(b)) if a < b => {
                    let pair = (x_row[i].1, 0.0);
                    i += 1;
                    pair
                }
                (Some(_), None) => {
                    let pair = (x_row[i].1, 0.0);
                    i += 1;
                    pair
                }
                _ => {
                    let pair = (0.0, y_row[j].1);
                    j += 1;
                    pair
                }
            };
            acc.push(x, y);
            nonzero += 1;
        }
        acc.push_zeros(num_players.saturating_sub(nonzero));
    }

    acc.finish()
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick the smallest candidate whose correlation is at least
/// `retention * max`.
///
/// Candidates without a correlation are ignored. When nothing qualifies the
/// largest candidate is returned with its correlation; when no candidate has a
/// correlation at all there is no selection.
pub fn select_window(
    correlations: &BTreeMap<usize, f64>,
    candidates: &[usize],
    retention: f64,
) -> Option<SelectedWindow> {
    let max_corr = correlations
        .values()
        .copied()
        .fold(None, |best: Option<f64>, c| Some(best.map_or(c, |b| b.max(c))))?;
    let threshold = retention * max_corr;

    let mut sorted: Vec<usize> = candidates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let qualifying = sorted.iter().find_map(|w| {
        correlations
            .get(w)
            .filter(|&&c| c >= threshold)
            .map(|&c| SelectedWindow {
                window: *w,
                correlation: c,
            })
    });
    if qualifying.is_some() {
        return qualifying;
    }

    // A negative maximum can leave every correlation below the threshold.
    sorted
        .iter()
        .rev()
        .find_map(|w| correlations.get(w).map(|&c| (*w, c)))
        .map(|(window, correlation)| SelectedWindow {
            window,
            correlation,
        })
}

/// Run the full sweep over the configured candidates.
pub fn optimize_window(matrix: &ValueMatrix, config: &WindowConfig) -> WindowReport {
    let candidates = config.candidates();
    let future = forward_mean(matrix, config.horizon_days);

    let measured: Vec<(usize, Option<f64>)> = candidates
        .par_iter()
        .map(|&w| (w, window_correlation(matrix, &future, w)))
        .collect();

    let mut correlations = BTreeMap::new();
    for (w, corr) in measured {
        match corr {
            Some(c) => {
                debug!("window {}: correlation {:.4}", w, c);
                correlations.insert(w, c);
            }
            None => debug!("window {}: correlation undefined", w),
        }
    }

    let max_correlation = correlations.values().copied().reduce(f64::max);
    let selected = select_window(&correlations, &candidates, config.retention);
    match selected {
        Some(s) => info!(
            "Selected lookback window {} days (correlation {:.4}, best {:.4})",
            s.window,
            s.correlation,
            max_correlation.unwrap_or(0.0)
        ),
        None => info!(
            "No lookback window has a defined correlation ({} candidates, {} dates)",
            candidates.len(),
            matrix.num_dates()
        ),
    }

    WindowReport {
        correlations,
        max_correlation,
        selected,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
