//! # Aggregation
//!
//! Stateless summaries over an in-memory collection. Nothing here mutates
//! its input or caches results: every call is a single pass over the slice.
//!
//! Fields are passed as accessor closures, so the same function serves every
//! record type: `total(&expenses, |e| e.amount)`.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Sum of a numeric field; 0 for an empty collection.
pub fn total<T>(records: &[T], field: impl Fn(&T) -> f64) -> f64 {
    records.iter().map(field).sum()
}

/// Mean of a numeric field; 0 for an empty collection.
pub fn average<T>(records: &[T], field: impl Fn(&T) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    total(records, field) / records.len() as f64
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-key sums, in the order each key is first seen.
pub fn group_total<T, K>(
    records: &[T],
    key: impl Fn(&T) -> K,
    value: impl Fn(&T) -> f64,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, f64)> = Vec::new();
    for record in records {
        let k = key(record);
        match positions.get(&k) {
            Some(&i) => totals[i].1 += value(record),
            None => {
                positions.insert(k.clone(), totals.len());
                totals.push((k, value(record)));
            }
        }
    }
    totals
}

/// Number of records per key, sorted by key.
pub fn count_by<T, K: Ord>(records: &[T], key: impl Fn(&T) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

/// The record with the largest (or smallest) value.
///
/// Ties go to the record seen first. `None` for an empty collection.
pub fn extremum<T>(records: &[T], field: impl Fn(&T) -> f64, mode: Extremum) -> Option<&T> {
    let mut best: Option<(&T, f64)> = None;
    for record in records {
        let v = field(record);
        let better = match best {
            None => true,
            Some((_, current)) => match mode {
                Extremum::Max => v > current,
                Extremum::Min => v < current,
            },
        };
        if better {
            best = Some((record, v));
        }
    }
    best.map(|(r, _)| r)
}

/// Matching records in their original order.
pub fn filter<'a, T>(records: &'a [T], predicate: impl Fn(&T) -> bool) -> Vec<&'a T> {
    records.iter().filter(|r| predicate(r)).collect()
}

/// A conjunction of record tests. An empty predicate matches everything.
pub struct Predicate<'a, T> {
    tests: Vec<Box<dyn Fn(&T) -> bool + 'a>>,
}

impl<'a, T> Default for Predicate<'a, T> {
    fn default() -> Self {
        Self { tests: Vec::new() }
    }
}

impl<'a, T> Predicate<'a, T> {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, test: impl Fn(&T) -> bool + 'a) -> Self {
        self.tests.push(Box::new(test));
        self
    }

    /// Add `test` only when `cond` holds. Handy for optional filters.
    pub fn and_if(self, cond: bool, test: impl Fn(&T) -> bool + 'a) -> Self {
        if cond {
            self.and(test)
        } else {
            self
        }
    }

    pub fn matches(&self, record: &T) -> bool {
        self.tests.iter().all(|t| t(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionStats {
    pub total: usize,
    pub done: usize,
    pub percentage: f64,
}

pub fn completion_stats<T>(records: &[T], done: impl Fn(&T) -> bool) -> CompletionStats {
    let total = records.len();
    let done = records.iter().filter(|r| done(r)).count();
    let percentage = if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    };
    CompletionStats {
        total,
        done,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        key: &'static str,
        day: &'static str,
        value: f64,
    }

    fn row(key: &'static str, day: &'static str, value: f64) -> Row {
        Row { key, day, value }
    }

    #[test]
    fn empty_collections_are_zero_or_none() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(total(&rows, |r| r.value), 0.0);
        assert_eq!(average(&rows, |r| r.value), 0.0);
        assert_eq!(extremum(&rows, |r| r.value, Extremum::Max), None);
        assert!(group_total(&rows, |r| r.key, |r| r.value).is_empty());
        let stats = completion_stats(&rows, |_| true);
        assert_eq!((stats.total, stats.done, stats.percentage), (0, 0, 0.0));
    }

    #[test]
    fn average_rounds_to_two_places() {
        let rows = vec![row("a", "", 8.0), row("b", "", 12.0), row("c", "", 5.0)];
        assert_eq!(round2(average(&rows, |r| r.value)), 8.33);
    }

    #[test]
    fn group_total_keeps_first_seen_order() {
        let rows = vec![
            row("food", "", 20.0),
            row("transport", "", 10.0),
            row("food", "", 5.5),
        ];
        let totals = group_total(&rows, |r| r.key, |r| r.value);
        assert_eq!(totals, vec![("food", 25.5), ("transport", 10.0)]);
    }

    #[test]
    fn extremum_picks_first_on_ties() {
        let rows = vec![row("a", "", 3.0), row("b", "", 9.0), row("c", "", 9.0)];
        assert_eq!(
            extremum(&rows, |r| r.value, Extremum::Max).unwrap().key,
            "b"
        );
        assert_eq!(
            extremum(&rows, |r| r.value, Extremum::Min).unwrap().key,
            "a"
        );
    }

    #[test]
    fn composed_predicates_preserve_order() {
        let rows = vec![
            row("food", "Monday", 1.0),
            row("food", "Tuesday", 2.0),
            row("rent", "Monday", 3.0),
            row("food", "Monday", 4.0),
        ];
        let pred = Predicate::all()
            .and(|r: &Row| r.key == "food")
            .and(|r: &Row| r.day == "Monday");
        let matched = filter(&rows, |r| pred.matches(r));
        assert_eq!(
            matched.iter().map(|r| r.value).collect::<Vec<_>>(),
            vec![1.0, 4.0]
        );

        let everything: Predicate<Row> = Predicate::all().and_if(false, |_| false);
        assert_eq!(filter(&rows, |r| everything.matches(r)).len(), 4);
    }

    #[test]
    fn count_by_sorts_keys() {
        let ages = [20u32, 18, 18];
        let counts = count_by(&ages, |a| *a);
        assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![(18, 2), (20, 1)]);
    }

    #[test]
    fn completion_percentage() {
        let flags = [true, false, true, true];
        let stats = completion_stats(&flags, |d| *d);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.done, 3);
        assert_eq!(stats.percentage, 75.0);
    }
}
