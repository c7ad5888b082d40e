//! Delimited export of runs using their source headers and raw values.
use crate::dates::{format_iso_date, format_time};
use crate::duration::format_duration;
use crate::error::ImportError;
use crate::fields::FieldRegistry;
use crate::import::Delimiter;
use crate::numbers::format_canonical;
use crate::run::RunRecord;

/// Leading columns and their headers; these re-import to the same keys.
const LEADING: [(&str, &str); 8] = [
    ("_date", "Date"),
    ("_time", "Time"),
    ("_runType", "Run Type"),
    ("tier", "Tier"),
    ("wave", "Wave"),
    ("coinsEarned", "Coins earned"),
    ("cellsEarned", "Cells Earned"),
    ("realTime", "Real Time"),
];

const TRAILING: [(&str, &str); 2] = [("_notes", "Notes"), ("_rank", "Rank")];

fn columns(runs: &[RunRecord]) -> Vec<(String, String)> {
    let registry = FieldRegistry::standard();
    let mut columns: Vec<(String, String)> = LEADING
        .iter()
        .map(|(k, h)| ((*k).to_string(), (*h).to_string()))
        .collect();
    let reserved = |key: &str| LEADING.iter().chain(TRAILING.iter()).any(|(k, _)| *k == key);

    for run in runs {
        for (key, field) in &run.fields {
            if reserved(key) || columns.iter().any(|(k, _)| k == key) {
                continue;
            }
            let header = if field.original_key.is_empty() {
                registry.display_name(key).to_string()
            } else {
                field.original_key.clone()
            };
            columns.push((key.clone(), header));
        }
    }
    columns.extend(
        TRAILING
            .iter()
            .map(|(k, h)| ((*k).to_string(), (*h).to_string())),
    );
    columns
}

fn synthesized(run: &RunRecord, key: &str) -> String {
    match key {
        "_date" => format_iso_date(&run.timestamp),
        "_time" => format_time(&run.timestamp),
        "_runType" => run.run_type.as_str().to_string(),
        "tier" => run.tier.to_string(),
        "wave" => run.wave.to_string(),
        "coinsEarned" => format_canonical(run.coins_earned),
        "cellsEarned" => format_canonical(run.cells_earned),
        "realTime" => format_duration(run.real_time),
        _ => String::new(),
    }
}

fn value(run: &RunRecord, key: &str) -> String {
    match key {
        "_runType" => run.run_type.as_str().to_string(),
        _ => run
            .field(key)
            .map_or_else(|| synthesized(run, key), |f| f.raw_value.clone()),
    }
}

/// Write `runs` as delimited text with a header row.
///
/// Values are written as they were imported, so re-importing under the same
/// settings yields the same runs.
///
/// # Errors
///
/// Returns an error if the delimiter is invalid or the writer fails.
pub fn export_runs(runs: &[RunRecord], delimiter: &Delimiter) -> Result<String, ImportError> {
    let columns = columns(runs);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte()?)
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|(_, header)| header.as_str()))?;
    for run in runs {
        writer.write_record(columns.iter().map(|(key, _)| value(run, key)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ImportError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ImportError::Export(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::generate_composite_keys_set;
    use crate::import::RunParser;
    use crate::run::{FieldValue, RunType};
    use crate::settings::ImportFormatSettings;
    use chrono::NaiveDate;

    fn parser(settings: ImportFormatSettings) -> RunParser {
        let fallback = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        RunParser::new(settings, fallback)
    }

    #[test]
    fn export_reimports_to_same_runs() {
        let settings = ImportFormatSettings::european();
        let source = "Tier;Wave;Coins earned;Real Time;Battle Date;Killed By\n\
                      10+;4.321;43,91T;7h 46m 6s;nov. 20, 2025 14:35;Boss\n\
                      8;1.200;1,5q;2h;déc. 3, 2025 09:15;Tank\n";
        let imported = parser(settings).parse_delimited(source, &Delimiter::Semicolon);
        assert_eq!(imported.success.len(), 2, "{:?}", imported.errors);
        let mut runs = imported.success;
        runs[1] = runs[1].with_field("_notes", FieldValue::text("Notes", "pushed, then \"died\""));

        let csv_text = export_runs(&runs, &Delimiter::Comma).unwrap();
        assert!(csv_text.starts_with("Date,Time,Run Type,Tier,Wave,Coins earned,Cells Earned,Real Time,"));

        let again = parser(settings).parse_delimited(&csv_text, &Delimiter::Comma);
        assert_eq!(again.success.len(), 2, "{:?}", again.errors);
        assert_eq!(
            generate_composite_keys_set(&again.success),
            generate_composite_keys_set(&runs)
        );
        assert_eq!(again.success[0].run_type, RunType::Tournament);
        assert_eq!(again.success[0].coins_earned, runs[0].coins_earned);
        assert_eq!(again.success[1].notes(), Some("pushed, then \"died\""));
        assert_eq!(again.success[1].timestamp, runs[1].timestamp);
    }

    #[test]
    fn rejects_bad_delimiter() {
        let err = export_runs(&[], &Delimiter::Custom("::".into())).unwrap_err();
        assert!(matches!(err, ImportError::InvalidDelimiter(_)));
    }
}
