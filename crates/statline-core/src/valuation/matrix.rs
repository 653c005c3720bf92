// Sparse date x player value matrix.
//
// Player ids are interned to dense `u32` indices (sorted by id, so the
// assignment does not depend on input order). The date axis is every
// calendar day from the first to the last observed date; a day without stat
// rows is an empty row. Each row holds only the players with a nonzero value,
// sorted by index; every other cell reads 0.0.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};

/// Sorted `(player index, value)` pairs for one date.
pub type SparseRow = Vec<(u32, f64)>;

/// Value for `player` in a sorted sparse row.
pub fn row_lookup(row: &[(u32, f64)], player: u32) -> Option<f64> {
    row.binary_search_by_key(&player, |&(p, _)| p)
        .ok()
        .map(|i| row[i].1)
}

// ---------------------------------------------------------------------------
// Player index
// ---------------------------------------------------------------------------

/// Bidirectional mapping between player ids and dense indices.
#[derive(Debug, Clone, Default)]
pub struct PlayerIndex {
    ids: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl PlayerIndex {
    /// Build from any set of ids; indices follow sorted id order.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let sorted: BTreeSet<&str> = ids.into_iter().collect();
        let ids: Vec<String> = sorted.into_iter().map(str::to_string).collect();
        let lookup = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as u32))
            .collect();
        PlayerIndex { ids, lookup }
    }

    pub fn get(&self, id: &str) -> Option<u32> {
        self.lookup.get(id).copied()
    }

    pub fn id(&self, index: u32) -> &str {
        &self.ids[index as usize]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.ids.iter().enumerate().map(|(i, id)| (i as u32, id.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Value matrix
// ---------------------------------------------------------------------------

/// Daily value per (date, player). Row `t` is the day `t` days after the
/// first date, so a window of `n` rows spans exactly `n` calendar days.
#[derive(Debug, Clone, Default)]
pub struct ValueMatrix {
    dates: Vec<NaiveDate>,
    players: PlayerIndex,
    rows: Vec<SparseRow>,
}

impl ValueMatrix {
    /// Build from `(date, player_id, value)` triples. Repeated cells are summed.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, S, f64)>,
        S: Into<String>,
    {
        let mut cells: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
        for (date, player, value) in values {
            *cells
                .entry(date)
                .or_default()
                .entry(player.into())
                .or_insert(0.0) += value;
        }

        let players = PlayerIndex::from_ids(cells.values().flat_map(|row| row.keys().map(String::as_str)));
        let (Some(&first), Some(&last)) = (cells.keys().next(), cells.keys().next_back()) else {
            return ValueMatrix {
                players,
                ..ValueMatrix::default()
            };
        };

        let span = (last - first).num_days() as usize + 1;
        let dates: Vec<NaiveDate> = (0..span)
            .map(|offset| first + Duration::days(offset as i64))
            .collect();
        let mut rows: Vec<SparseRow> = vec![Vec::new(); span];
        for (date, row) in &cells {
            let mut sparse: SparseRow = row
                .iter()
                .filter(|(_, v)| **v != 0.0)
                .filter_map(|(id, v)| players.get(id).map(|p| (p, *v)))
                .collect();
            sparse.sort_by_key(|&(p, _)| p);
            rows[(*date - first).num_days() as usize] = sparse;
        }

        ValueMatrix {
            dates,
            players,
            rows,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn players(&self) -> &PlayerIndex {
        &self.players
    }

    pub fn num_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Row position of `date`, if it falls within the matrix's date range.
    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        (offset < self.dates.len()).then_some(offset)
    }

    pub fn row(&self, date_index: usize) -> &[(u32, f64)] {
        &self.rows[date_index]
    }

    /// Value for a cell; 0.0 for any unobserved day or player.
    pub fn value(&self, date: NaiveDate, player_id: &str) -> f64 {
        match (self.date_index(date), self.players.get(player_id)) {
            (Some(t), Some(p)) => row_lookup(&self.rows[t], p).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// A player's value on every day of the matrix, zero-filled.
    pub fn series(&self, player_id: &str) -> Vec<f64> {
        let Some(p) = self.players.get(player_id) else {
            return vec![0.0; self.dates.len()];
        };
        self.rows
            .iter()
            .map(|row| row_lookup(row, p).unwrap_or(0.0))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
