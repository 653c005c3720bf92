// Calendar helpers for checkpoint scheduling.

use chrono::{Datelike, Duration, NaiveDate};

/// Every Monday in `[start, end]`, ascending.
pub fn mondays(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let offset = (7 - start.weekday().num_days_from_monday()) % 7;
    let mut day = start + Duration::days(i64::from(offset));
    let mut out = Vec::new();
    while day <= end {
        out.push(day);
        day += Duration::days(7);
    }
    out
}
