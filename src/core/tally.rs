use crate::domain::model::CountryTally;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Count,
    Country,
}

/// Turns raw counts into tallies ordered by count descending, ties by
/// country code ascending. An empty map (total of zero) yields no entries.
pub fn rank(counts: HashMap<String, u64>, total: u64) -> Vec<CountryTally> {
    if total == 0 {
        return Vec::new();
    }

    let mut tallies: Vec<CountryTally> = counts
        .into_iter()
        .map(|(country, count)| CountryTally {
            percentage: (count as f64 / total as f64) * 100.0,
            country,
            count,
        })
        .collect();

    tallies.sort_by(canonical_order);
    tallies
}

fn canonical_order(a: &CountryTally, b: &CountryTally) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country))
}

/// Re-sorts a copy of the tallies for display; the canonical order is left alone.
pub fn sorted_view(tallies: &[CountryTally], key: SortKey, ascending: bool) -> Vec<CountryTally> {
    let mut view = tallies.to_vec();
    match key {
        SortKey::Count if ascending => {
            // 同數量時仍保持國碼升冪
            view.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.country.cmp(&b.country)));
        }
        SortKey::Count => view.sort_by(canonical_order),
        SortKey::Country => {
            view.sort_by(|a, b| a.country.cmp(&b.country));
            if !ascending {
                view.reverse();
            }
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    }

    #[test]
    fn test_rank_orders_by_count_then_code() {
        let tallies = rank(counts(&[("FR", 3), ("US", 5), ("DE", 3), ("Unknown", 1)]), 12);
        let order: Vec<&str> = tallies.iter().map(|t| t.country.as_str()).collect();
        assert_eq!(order, vec!["US", "DE", "FR", "Unknown"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let tallies = rank(counts(&[("US", 1), ("DE", 1), ("JP", 1)]), 3);
        let sum: f64 = tallies.iter().map(|t| t.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!(tallies.iter().all(|t| (0.0..=100.0).contains(&t.percentage)));
    }

    #[test]
    fn test_zero_total_has_no_entries() {
        assert!(rank(HashMap::new(), 0).is_empty());
    }

    #[test]
    fn test_sorted_view() {
        let tallies = rank(counts(&[("US", 5), ("AT", 2), ("DE", 2)]), 9);

        let asc: Vec<String> = sorted_view(&tallies, SortKey::Count, true)
            .into_iter()
            .map(|t| t.country)
            .collect();
        assert_eq!(asc, vec!["AT", "DE", "US"]);

        let by_code_desc: Vec<String> = sorted_view(&tallies, SortKey::Country, false)
            .into_iter()
            .map(|t| t.country)
            .collect();
        assert_eq!(by_code_desc, vec!["US", "DE", "AT"]);

        // canonical order untouched
        assert_eq!(tallies[0].country, "US");
        assert_eq!(tallies[1].country, "AT");
    }
}
