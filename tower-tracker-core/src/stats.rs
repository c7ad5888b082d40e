//! Percentiles, source breakdowns and period aggregates over runs.
use chrono::{Datelike, Duration, NaiveDate};
use num_traits::cast::cast;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::fields::{FieldRegistry, SourceGroup};
use crate::numbers::{u64_to_f64, usize_to_f64};
use crate::run::RunRecord;

/// Relative gap between a total and its accounted sources that is still
/// treated as rounding noise, in percent.
pub const DISCREPANCY_THRESHOLD_PERCENT: f64 = 1.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p.clamp(0.0, 100.0) / 100.0) * usize_to_f64(last);
    let lower = cast::<f64, usize>(rank.floor()).unwrap_or(0).min(last);
    let upper = (lower + 1).min(last);
    let weight = rank - rank.floor();
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// `p`th percentile (0-100) with linear interpolation between ranks.
///
/// Non-finite values are ignored; `None` when nothing remains.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    percentile_of_sorted(&sorted_finite(values), p)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileSummary {
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub count: usize,
}

impl PercentileSummary {
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_finite(values);
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let at = |p| percentile_of_sorted(&sorted, p).unwrap_or(max);
        Some(Self {
            p50: at(50.0),
            p75: at(75.0),
            p90: at(90.0),
            p99: at(99.0),
            max,
            min,
            mean: sorted.iter().sum::<f64>() / usize_to_f64(sorted.len()),
            count: sorted.len(),
        })
    }
}

/// Numeric values of `key` across runs, skipping runs without it.
#[must_use]
pub fn metric_values(runs: &[RunRecord], key: &str) -> Vec<f64> {
    runs.iter()
        .filter_map(|run| match key {
            "tier" => Some(f64::from(run.tier)),
            "wave" => Some(f64::from(run.wave)),
            "coinsEarned" => Some(run.coins_earned),
            "cellsEarned" => Some(run.cells_earned),
            "realTime" => Some(u64_to_f64(run.real_time)),
            other => run.number(other),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyKind {
    /// Sources explain less than the total
    Unknown,
    /// Sources add up to more than the total
    Overcounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    /// Absolute gap between the total and the accounted sum
    pub amount: f64,
    /// Gap relative to the total, rounded to two decimals
    pub percentage: f64,
}

/// Gap between a reported total and the sum of its sources.
///
/// Gaps of at most one percent, and non-positive totals, yield `None`.
#[must_use]
pub fn calculate_discrepancy(total: f64, accounted: f64) -> Option<Discrepancy> {
    if !total.is_finite() || !accounted.is_finite() || total <= 0.0 {
        return None;
    }
    let gap = total - accounted;
    let percentage = gap.abs() / total * 100.0;
    if percentage <= DISCREPANCY_THRESHOLD_PERCENT {
        return None;
    }
    Some(Discrepancy {
        kind: if gap > 0.0 {
            DiscrepancyKind::Unknown
        } else {
            DiscrepancyKind::Overcounted
        },
        amount: gap.abs(),
        percentage: round2(percentage),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceShare {
    pub key: &'static str,
    pub display_name: &'static str,
    pub color: Option<&'static str>,
    pub value: f64,
    /// Share of the group total, in percent
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakdown {
    pub group: SourceGroup,
    pub total: f64,
    pub sources: Vec<SourceShare>,
    pub discrepancy: Option<Discrepancy>,
}

/// Contribution of each source field in `group` to its total, largest first.
#[must_use]
pub fn source_breakdown(
    run: &RunRecord,
    group: SourceGroup,
    registry: &FieldRegistry,
) -> SourceBreakdown {
    let total = match group {
        SourceGroup::CoinSources => run.coins_earned,
        SourceGroup::DamageSources => run.number(group.total_key()).unwrap_or(0.0),
    };
    let mut sources: Vec<SourceShare> = registry
        .group_members(group)
        .filter_map(|field| {
            let value = run.number(field.key).filter(|v| *v > 0.0)?;
            Some(SourceShare {
                key: field.key,
                display_name: field.display_name,
                color: field.color,
                value,
                percentage: if total > 0.0 {
                    round2(value / total * 100.0)
                } else {
                    0.0
                },
            })
        })
        .collect();
    sources.sort_by(|a, b| b.value.total_cmp(&a.value));

    let accounted: f64 = sources.iter().map(|s| s.value).sum();
    SourceBreakdown {
        group,
        total,
        discrepancy: calculate_discrepancy(total, accounted),
        sources,
    }
}

/// Rate per hour of real time; zero when no time elapsed.
#[must_use]
pub fn per_hour(amount: f64, seconds: u64) -> f64 {
    if seconds == 0 {
        return 0.0;
    }
    amount / (u64_to_f64(seconds) / 3600.0)
}

/// Calendar bucket for aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    /// ISO week starting Monday
    Week,
    Month,
}

impl Period {
    #[must_use]
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAggregate {
    pub period_start: NaiveDate,
    pub run_count: usize,
    pub total_coins: f64,
    pub total_cells: f64,
    pub total_real_time: u64,
    pub coins_per_hour: f64,
    pub cells_per_hour: f64,
    pub average_wave: f64,
}

/// Totals per calendar bucket, oldest first.
#[must_use]
pub fn aggregate_by_period(runs: &[RunRecord], period: Period) -> Vec<PeriodAggregate> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&RunRecord>> = BTreeMap::new();
    for run in runs {
        buckets
            .entry(period.bucket_start(run.timestamp.date()))
            .or_default()
            .push(run);
    }

    buckets
        .into_iter()
        .map(|(period_start, bucket)| {
            let total_coins: f64 = bucket.iter().map(|r| r.coins_earned).sum();
            let total_cells: f64 = bucket.iter().map(|r| r.cells_earned).sum();
            let total_real_time = bucket
                .iter()
                .map(|r| r.real_time)
                .fold(0u64, u64::saturating_add);
            let waves: f64 = bucket.iter().map(|r| f64::from(r.wave)).sum();
            PeriodAggregate {
                period_start,
                run_count: bucket.len(),
                total_coins,
                total_cells,
                total_real_time,
                coins_per_hour: per_hour(total_coins, total_real_time),
                cells_per_hour: per_hour(total_cells, total_real_time),
                average_wave: waves / usize_to_f64(bucket.len()),
            }
        })
        .collect()
}
