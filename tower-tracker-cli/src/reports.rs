use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use tower_tracker_core::stats::metric_values;
use tower_tracker_core::{
    DisplaySettings, FieldRegistry, LocaleContext, PercentileSummary, Period, PeriodAggregate,
    RunRecord, SourceBreakdown, SourceGroup, aggregate_by_period, available_tiers, per_hour,
    source_breakdown,
};

/// Metrics summarized in every stats report, as `(field key, label)`.
const METRICS: [(&str, &str); 4] = [
    ("coinsEarned", "Coins earned"),
    ("cellsEarned", "Cells earned"),
    ("wave", "Wave"),
    ("realTime", "Real time (s)"),
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub key: &'static str,
    pub label: &'static str,
    pub summary: PercentileSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub run_count: usize,
    pub tiers: Vec<u32>,
    pub metrics: Vec<MetricSummary>,
    pub coins_per_hour: Option<PercentileSummary>,
    pub periods: Vec<PeriodAggregate>,
    pub latest_breakdown: Option<SourceBreakdown>,
}

impl StatsReport {
    pub fn build(runs: &[RunRecord], period: Period) -> Self {
        let metrics = METRICS
            .iter()
            .filter_map(|&(key, label)| {
                PercentileSummary::from_values(&metric_values(runs, key)).map(|summary| {
                    MetricSummary {
                        key,
                        label,
                        summary,
                    }
                })
            })
            .collect();
        let hourly: Vec<f64> = runs
            .iter()
            .filter(|r| r.real_time > 0)
            .map(|r| per_hour(r.coins_earned, r.real_time))
            .collect();
        let latest = runs.iter().max_by_key(|r| r.timestamp);

        Self {
            run_count: runs.len(),
            tiers: available_tiers(runs),
            metrics,
            coins_per_hour: PercentileSummary::from_values(&hourly),
            periods: aggregate_by_period(runs, period),
            latest_breakdown: latest.map(|run| {
                source_breakdown(run, SourceGroup::CoinSources, &FieldRegistry::standard())
            }),
        }
    }
}

struct Formatter<'a> {
    locale: &'a LocaleContext,
    shorthand: bool,
}

impl Formatter<'_> {
    fn value(&self, value: f64) -> String {
        if self.shorthand {
            self.locale.format_shorthand(value)
        } else {
            self.locale.format_number(value, 2)
        }
    }
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    report: &StatsReport,
    locale: &LocaleContext,
    display: &DisplaySettings,
) -> Result<()> {
    let fmt = Formatter {
        locale,
        shorthand: display.use_shorthand,
    };
    writeln!(out)?;
    writeln!(out, "{}", "📊 Run Statistics".bright_cyan().bold())?;
    writeln!(out, "{}", "=================".cyan())?;

    if report.run_count == 0 {
        writeln!(out, "No runs stored yet.")?;
        return Ok(());
    }

    writeln!(out, "Runs: {}", report.run_count.to_string().green())?;
    let tiers: Vec<String> = report.tiers.iter().map(ToString::to_string).collect();
    writeln!(out, "Tiers: {}", tiers.join(", "))?;
    writeln!(out)?;

    for metric in &report.metrics {
        let s = &metric.summary;
        writeln!(out, "{}", metric.label.bold())?;
        writeln!(
            out,
            "   p50 {}  p75 {}  p90 {}  p99 {}",
            fmt.value(s.p50),
            fmt.value(s.p75),
            fmt.value(s.p90),
            fmt.value(s.p99)
        )?;
        writeln!(
            out,
            "   min {}  max {}  mean {}",
            fmt.value(s.min),
            fmt.value(s.max).green(),
            fmt.value(s.mean)
        )?;
    }
    if let Some(hourly) = &report.coins_per_hour {
        writeln!(
            out,
            "{} median {}, best {}",
            "Coins per hour:".bold(),
            fmt.value(hourly.p50),
            fmt.value(hourly.max).green()
        )?;
    }

    if !report.periods.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "📅 By period".bright_yellow().bold())?;
        for period in &report.periods {
            writeln!(
                out,
                "   {}  runs {:>3}  coins {}  coins/h {}",
                locale.format_date(&period.period_start.and_time(chrono::NaiveTime::MIN)),
                period.run_count,
                fmt.value(period.total_coins),
                fmt.value(period.coins_per_hour)
            )?;
        }
    }

    if let Some(breakdown) = report.latest_breakdown.as_ref().filter(|b| !b.sources.is_empty()) {
        writeln!(out)?;
        writeln!(out, "{}", "🪙 Latest run coin sources".bright_yellow().bold())?;
        for source in &breakdown.sources {
            writeln!(
                out,
                "   {:<28} {:>10} {:>8}",
                source.display_name,
                fmt.value(source.value),
                locale.format_percentage(source.percentage)
            )?;
        }
        if let Some(gap) = breakdown.discrepancy {
            writeln!(
                out,
                "   {} {} ({}, {:?})",
                "⚠️  Unaccounted:".yellow(),
                fmt.value(gap.amount),
                locale.format_percentage(gap.percentage),
                gap.kind
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, report: &StatsReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    report: &StatsReport,
    locale: &LocaleContext,
    display: &DisplaySettings,
) -> Result<()> {
    let fmt = Formatter {
        locale,
        shorthand: display.use_shorthand,
    };
    writeln!(out, "# Tower Tracker Run Statistics\n")?;
    if report.run_count == 0 {
        writeln!(out, "_No runs stored._")?;
        return Ok(());
    }
    writeln!(out, "- **Runs:** {}", report.run_count)?;
    let tiers: Vec<String> = report.tiers.iter().map(ToString::to_string).collect();
    writeln!(out, "- **Tiers:** {}\n", tiers.join(", "))?;

    writeln!(out, "| Metric | P50 | P75 | P90 | P99 | Max |")?;
    writeln!(out, "|--------|-----|-----|-----|-----|-----|")?;
    for metric in &report.metrics {
        let s = &metric.summary;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            metric.label,
            fmt.value(s.p50),
            fmt.value(s.p75),
            fmt.value(s.p90),
            fmt.value(s.p99),
            fmt.value(s.max)
        )?;
    }

    if !report.periods.is_empty() {
        writeln!(out, "\n## By period\n")?;
        writeln!(out, "| Start | Runs | Coins | Coins/h |")?;
        writeln!(out, "|-------|------|-------|---------|")?;
        for period in &report.periods {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                period.period_start,
                period.run_count,
                fmt.value(period.total_coins),
                fmt.value(period.coins_per_hour)
            )?;
        }
    }
    Ok(())
}
