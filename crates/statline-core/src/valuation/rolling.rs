// Trailing and forward window means over a `ValueMatrix`.
//
// The matrix has one row per calendar day, so a window of `n` rows spans
// exactly `n` days; a player with no value on a day, or a day with no stat
// rows at all, contributes 0.0. Positions without a full window of history
// are undefined (`None`), never zero.

use chrono::NaiveDate;

use crate::valuation::matrix::{row_lookup, SparseRow, ValueMatrix};

/// Mean over `rows[end + 1 - window ..= end]` for every `end >= window - 1`.
///
/// Sums are accumulated oldest date first into a dense scratch buffer, so the
/// result is independent of how the caller schedules windows.
fn window_rows(matrix: &ValueMatrix, window: usize) -> Vec<SparseRow> {
    let num_dates = matrix.num_dates();
    if window == 0 || window > num_dates {
        return Vec::new();
    }

    let mut scratch = vec![0.0f64; matrix.num_players()];
    let mut touched = vec![false; matrix.num_players()];
    let mut out = Vec::with_capacity(num_dates + 1 - window);

    for end in (window - 1)..num_dates {
        let mut keys: Vec<u32> = Vec::new();
        for t in (end + 1 - window)..=end {
            for &(p, v) in matrix.row(t) {
                let slot = p as usize;
                if !touched[slot] {
                    touched[slot] = true;
                    keys.push(p);
                }
                scratch[slot] += v;
            }
        }
        keys.sort_unstable();
        let row: SparseRow = keys
            .iter()
            .map(|&p| {
                let slot = p as usize;
                let mean = scratch[slot] / window as f64;
                scratch[slot] = 0.0;
                touched[slot] = false;
                (p, mean)
            })
            .collect();
        out.push(row);
    }
    out
}

// ---------------------------------------------------------------------------
// Trailing values
// ---------------------------------------------------------------------------

/// Trailing `window`-date mean for every (date, player) of a matrix.
#[derive(Debug, Clone)]
pub struct RollingValues<'a> {
    matrix: &'a ValueMatrix,
    window: usize,
    rows: Vec<SparseRow>,
}

/// Compute the trailing mean over `window` dates ending at each date, inclusive.
pub fn rolling_mean(matrix: &ValueMatrix, window: usize) -> RollingValues<'_> {
    RollingValues {
        matrix,
        window,
        rows: window_rows(matrix, window),
    }
}

impl<'a> RollingValues<'a> {
    pub fn matrix(&self) -> &'a ValueMatrix {
        self.matrix
    }

    /// Whether date position `t` has a full window of history.
    pub fn is_defined(&self, t: usize) -> bool {
        !self.rows.is_empty() && t + 1 >= self.window && t < self.matrix.num_dates()
    }

    /// Sparse row at date position `t`, or `None` before the window fills.
    pub fn row(&self, t: usize) -> Option<&[(u32, f64)]> {
        if !self.is_defined(t) {
            return None;
        }
        Some(&self.rows[t + 1 - self.window])
    }

    /// Trailing mean for a matrix player at date position `t`.
    pub fn get(&self, t: usize, player: u32) -> Option<f64> {
        self.row(t).map(|row| row_lookup(row, player).unwrap_or(0.0))
    }

    /// Trailing mean by date and id. `None` when the date is outside the
    /// matrix range, the window has not filled, or the player never appears.
    pub fn value_at(&self, date: NaiveDate, player_id: &str) -> Option<f64> {
        let t = self.matrix.date_index(date)?;
        let p = self.matrix.players().get(player_id)?;
        self.get(t, p)
    }

    /// Every matrix player's trailing mean on `date`, in player-index order.
    pub fn snapshot(&self, date: NaiveDate) -> Option<Vec<(u32, f64)>> {
        let t = self.matrix.date_index(date)?;
        let row = self.row(t)?;
        let mut dense = Vec::with_capacity(self.matrix.num_players());
        let mut cursor = row.iter().peekable();
        for (p, _) in self.matrix.players().iter() {
            let value = match cursor.peek() {
                Some(&&(q, v)) if q == p => {
                    cursor.next();
                    v
                }
                _ => 0.0,
            };
            dense.push((p, value));
        }
        Some(dense)
    }
}

// ---------------------------------------------------------------------------
// Forward values
// ---------------------------------------------------------------------------

/// Mean over the `horizon` dates strictly after each date.
#[derive(Debug, Clone)]
pub struct ForwardValues {
    horizon: usize,
    num_dates: usize,
    rows: Vec<SparseRow>,
}

/// Forward mean: at position `t`, the mean of positions `t+1 ..= t+horizon`.
/// Undefined for the last `horizon` dates.
pub fn forward_mean(matrix: &ValueMatrix, horizon: usize) -> ForwardValues {
    ForwardValues {
        horizon,
        num_dates: matrix.num_dates(),
        rows: window_rows(matrix, horizon),
    }
}

impl ForwardValues {
    pub fn is_defined(&self, t: usize) -> bool {
        self.horizon > 0 && t + self.horizon < self.num_dates
    }

    /// The forward window starting after `t` is the trailing window ending
    /// at `t + horizon`, which is trailing row `t + 1`.
    pub fn row(&self, t: usize) -> Option<&[(u32, f64)]> {
        if !self.is_defined(t) {
            return None;
        }
        Some(&self.rows[t + 1])
    }

    pub fn get(&self, t: usize, player: u32) -> Option<f64> {
        self.row(t).map(|row| row_lookup(row, player).unwrap_or(0.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
