//! Selection and ordering helpers; every function returns a new collection.
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::run::{RunRecord, RunType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub run_type: Option<RunType>,
    pub tier: Option<u32>,
    /// Inclusive lower bound on the run timestamp
    pub since: Option<NaiveDateTime>,
    /// Exclusive upper bound on the run timestamp
    pub until: Option<NaiveDateTime>,
}

impl RunFilter {
    #[must_use]
    pub fn matches(&self, run: &RunRecord) -> bool {
        self.run_type.is_none_or(|t| run.run_type == t)
            && self.tier.is_none_or(|t| run.tier == t)
            && self.since.is_none_or(|since| run.timestamp >= since)
            && self.until.is_none_or(|until| run.timestamp < until)
    }
}

#[must_use]
pub fn filter_runs(runs: &[RunRecord], filter: &RunFilter) -> Vec<RunRecord> {
    runs.iter().filter(|r| filter.matches(r)).cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Timestamp,
    Tier,
    Wave,
    CoinsEarned,
    CellsEarned,
    RealTime,
    CoinsPerHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

fn compare(a: &RunRecord, b: &RunRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortKey::Tier => a.tier.cmp(&b.tier),
        SortKey::Wave => a.wave.cmp(&b.wave),
        SortKey::CoinsEarned => a.coins_earned.total_cmp(&b.coins_earned),
        SortKey::CellsEarned => a.cells_earned.total_cmp(&b.cells_earned),
        SortKey::RealTime => a.real_time.cmp(&b.real_time),
        SortKey::CoinsPerHour => crate::stats::per_hour(a.coins_earned, a.real_time)
            .total_cmp(&crate::stats::per_hour(b.coins_earned, b.real_time)),
    }
}

/// Sorted copy of `runs`; ties keep their input order.
#[must_use]
pub fn sort_runs(runs: &[RunRecord], key: SortKey, direction: SortDirection) -> Vec<RunRecord> {
    let mut sorted = runs.to_vec();
    sorted.sort_by(|a, b| match direction {
        SortDirection::Ascending => compare(a, b, key),
        SortDirection::Descending => compare(b, a, key),
    });
    sorted
}

/// Distinct tiers present, ascending.
#[must_use]
pub fn available_tiers(runs: &[RunRecord]) -> Vec<u32> {
    runs.iter()
        .map(|r| r.tier)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
