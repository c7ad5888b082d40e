//! Codec for the persisted run collection: one tab-delimited blob with a
//! header row, escaped cells and canonical number formatting.
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::dates::{format_iso_date, format_time};
use crate::duration::{format_duration, parse_duration};
use crate::encoding::encode_cell;
use crate::fields::{FieldRegistry, normalize_field_name};
use crate::import::{ImportResult, RunParser};
use crate::numbers::{f64_to_u64, format_canonical, parse_shorthand_number};
use crate::run::{DataType, FieldValue, RunRecord, Value};
use crate::settings::ImportFormatSettings;

const INTERNAL_COLUMNS: [&str; 6] = ["_id", "_date", "_time", "_runType", "_notes", "_rank"];

/// Fields mirrored on [`RunRecord`] that always get a column.
const CORE_COLUMNS: [&str; 5] = ["tier", "wave", "coinsEarned", "cellsEarned", "realTime"];

struct Column {
    key: String,
    header: String,
}

fn columns(runs: &[RunRecord], registry: &FieldRegistry) -> Vec<Column> {
    let mut columns: Vec<Column> = INTERNAL_COLUMNS
        .iter()
        .map(|key| Column {
            key: (*key).to_string(),
            header: (*key).to_string(),
        })
        .collect();
    columns.extend(CORE_COLUMNS.iter().map(|key| Column {
        key: (*key).to_string(),
        header: registry.display_name(key).to_string(),
    }));

    for run in runs {
        for (key, field) in &run.fields {
            if columns.iter().any(|c| c.key == *key) {
                continue;
            }
            let keeps_key = registry.canonical_key(&normalize_field_name(&field.original_key)) == *key;
            columns.push(Column {
                key: key.clone(),
                header: if keeps_key {
                    field.original_key.clone()
                } else {
                    key.clone()
                },
            });
        }
    }
    columns
}

/// A zero that came from text no parser accepted; the text is stored instead.
fn unparsed_zero(field: &FieldValue) -> bool {
    let Value::Number(n) = field.value else {
        return false;
    };
    if n.abs() >= f64::EPSILON || field.raw_value.trim().is_empty() {
        return false;
    }
    match field.data_type {
        DataType::Duration => parse_duration(&field.raw_value).is_none(),
        _ => parse_shorthand_number(&field.raw_value, &ImportFormatSettings::canonical()).is_none(),
    }
}

fn field_cell(field: &FieldValue) -> String {
    match (&field.value, field.data_type) {
        (Value::Number(n), DataType::Duration) => format_duration(f64_to_u64(*n)),
        (Value::Number(n), _) => format_canonical(*n),
        (Value::Date(ts), _) => format!("{} {}", format_iso_date(ts), format_time(ts)),
        (Value::Text(text), _) => text.clone(),
    }
}

fn cell(run: &RunRecord, key: &str) -> String {
    if let Some(field) = run.field(key)
        && key != "tier"
        && unparsed_zero(field)
    {
        return field.raw_value.clone();
    }
    match key {
        "_id" => run.id.clone(),
        "_date" => format_iso_date(&run.timestamp),
        "_time" => format_time(&run.timestamp),
        "_runType" => run.run_type.as_str().to_string(),
        "tier" => {
            let tournament = run
                .field("tier")
                .is_some_and(|f| f.raw_value.trim_end().ends_with('+'));
            format!("{}{}", run.tier, if tournament { "+" } else { "" })
        }
        "wave" => run.wave.to_string(),
        "coinsEarned" => format_canonical(run.coins_earned),
        "cellsEarned" => format_canonical(run.cells_earned),
        "realTime" => format_duration(run.real_time),
        other => run.field(other).map(field_cell).unwrap_or_default(),
    }
}

/// Serialize runs into the store blob.
#[must_use]
pub fn serialize_runs(runs: &[RunRecord]) -> String {
    let registry = FieldRegistry::standard();
    let columns = columns(runs, &registry);
    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| encode_cell(&c.header)).collect();
    out.push_str(&header.join("\t"));
    out.push('\n');
    for run in runs {
        let row: Vec<String> = columns.iter().map(|c| encode_cell(&cell(run, &c.key))).collect();
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Parse a store blob written by [`serialize_runs`].
///
/// Stored ids are kept. A blank or header-only blob is an empty collection
/// rather than a failure.
#[must_use]
pub fn deserialize_runs(blob: &str) -> ImportResult {
    if blob.lines().filter(|l| !l.trim().is_empty()).count() < 2 {
        return ImportResult::default();
    }
    let fallback: NaiveDateTime = DateTime::<Utc>::UNIX_EPOCH.naive_utc();
    RunParser::new(ImportFormatSettings::canonical(), fallback).parse_store_rows(blob)
}
