// League-level analyses built on daily values: keeper ranking, roster versus
// free-agent comparison, and team success against roster behavior.

pub mod behavior;
pub mod calendar;
pub mod keepers;
pub mod waivers;

use std::cmp::Ordering;

/// Order team ids numerically when both are integers, otherwise as text.
pub fn compare_team_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_numerically() {
        let mut ids = vec!["10", "2", "1", "abc"];
        ids.sort_by(|a, b| compare_team_ids(a, b));
        assert_eq!(ids, vec!["1", "2", "10", "abc"]);
    }
}
