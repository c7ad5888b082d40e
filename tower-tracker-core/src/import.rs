//! Turns pasted battle reports and delimited files into typed run records.
//!
//! Parsing never fails loudly on a single bad value: unparseable numbers
//! become zero and unknown run types fall back to the tier string. Whole
//! imports that cannot produce rows return an [`ImportResult`] carrying the
//! reason instead of an error.
use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dates::{format_iso_date, format_time, parse_battle_date, parse_internal_date_time};
use crate::duration::{format_duration, looks_like_duration, parse_duration};
use crate::encoding::decode_cell;
use crate::error::ImportError;
use crate::fields::{FieldRegistry, normalize_field_name, to_snake_case};
use crate::format_detect::{FormatMismatch, detect_format_mismatch};
use crate::numbers::{f64_to_u32, f64_to_u64, format_shorthand, parse_shorthand_number, u64_to_f64};
use crate::run::{DataType, FieldValue, RunRecord, RunType, Value};
use crate::settings::ImportFormatSettings;

static MULTI_SPACE_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s{2,}").ok());

const UNKNOWN_ERROR: &str = "Unknown error";

/// Column separator for delimited imports
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
    Semicolon,
    /// User-supplied separator; must be a single ASCII character
    Custom(String),
}

impl Delimiter {
    /// Single-byte form for the tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error when a custom delimiter is not one ASCII character.
    pub fn as_byte(&self) -> Result<u8, ImportError> {
        match self {
            Delimiter::Tab => Ok(b'\t'),
            Delimiter::Comma => Ok(b','),
            Delimiter::Semicolon => Ok(b';'),
            Delimiter::Custom(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => {
                        u8::try_from(c).map_err(|_| ImportError::InvalidDelimiter(text.clone()))
                    }
                    _ => Err(ImportError::InvalidDelimiter(text.clone())),
                }
            }
        }
    }

    /// Guess the delimiter from the header line, preferring tab on ties.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
        let count = |c: char| header.matches(c).count();
        let (tabs, semicolons, commas) = (count('\t'), count(';'), count(','));
        if tabs == 0 && semicolons == 0 && commas == 0 {
            return Delimiter::Tab;
        }
        if tabs >= semicolons && tabs >= commas {
            Delimiter::Tab
        } else if semicolons >= commas {
            Delimiter::Semicolon
        } else {
            Delimiter::Comma
        }
    }
}

/// How one source column was mapped to an internal field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub original_header: String,
    pub field_key: String,
    pub data_type: DataType,
    pub known: bool,
}

/// Outcome of a delimited import
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: Vec<RunRecord>,
    pub failed: usize,
    pub errors: Vec<String>,
    pub field_mappings: Vec<FieldMapping>,
    pub format_mismatch: FormatMismatch,
}

impl ImportResult {
    fn failure(err: &ImportError) -> Self {
        let reason = err.to_string();
        let reason = if reason.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            reason
        };
        log::warn!("import failed: {reason}");
        Self {
            errors: vec![format!("Failed to parse data: {reason}")],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.success.is_empty() && !self.errors.is_empty()
    }
}

/// Outcome of parsing a single pasted battle report
#[derive(Debug, Clone, Default)]
pub struct ClipboardImport {
    pub run: Option<RunRecord>,
    pub errors: Vec<String>,
    pub format_mismatch: FormatMismatch,
}

/// Split `Label<whitespace>Value` lines from a pasted battle report.
///
/// Tabs win, then runs of two or more spaces, then the longest known label
/// prefix, and finally the last whitespace when the value holds a digit.
/// Lines without a value (section headings) are skipped.
#[must_use]
pub fn parse_key_value_block(text: &str, registry: &FieldRegistry) -> Vec<(String, String)> {
    let labels = registry.labels_longest_first();
    text.lines()
        .filter_map(|line| split_label_value(line.trim(), &labels))
        .collect()
}

fn split_label_value(line: &str, labels: &[&str]) -> Option<(String, String)> {
    if line.is_empty() {
        return None;
    }
    let pair = |label: &str, value: &str| {
        let (label, value) = (label.trim(), value.trim());
        (!label.is_empty() && !value.is_empty()).then(|| (label.to_string(), value.to_string()))
    };

    if let Some((label, value)) = line.split_once('\t') {
        return pair(label, value);
    }
    if let Some(m) = MULTI_SPACE_RE.as_ref().and_then(|re| re.find(line)) {
        return pair(&line[..m.start()], &line[m.end()..]);
    }
    for label in labels {
        let Some(head) = line.get(..label.len()) else {
            continue;
        };
        let rest = &line[label.len()..];
        if head.eq_ignore_ascii_case(label) && rest.starts_with(char::is_whitespace) {
            return pair(head, rest);
        }
    }
    let (label, value) = line.rsplit_once(char::is_whitespace)?;
    if value.chars().any(|c| c.is_ascii_digit()) {
        pair(label, value)
    } else {
        None
    }
}

/// Raw values keyed by their source label plus snake_case aliases, the shape
/// the format detector looks up.
fn canary_fields(pairs: &[(String, String)]) -> HashMap<String, String> {
    let mut raw = HashMap::with_capacity(pairs.len() * 2);
    for (label, value) in pairs {
        raw.insert(label.clone(), value.clone());
        raw.insert(to_snake_case(&normalize_field_name(label)), value.clone());
    }
    raw
}

/// Run type from an explicit value, else from the tier string.
///
/// A trailing `+` on the tier (`10+`) marks a tournament run.
#[must_use]
pub fn infer_run_type(explicit: Option<&str>, tier_raw: Option<&str>) -> RunType {
    if let Some(run_type) = explicit.and_then(|raw| raw.parse::<RunType>().ok()) {
        return run_type;
    }
    match tier_raw {
        Some(tier) if tier.trim().ends_with('+') => RunType::Tournament,
        _ => RunType::Farm,
    }
}

/// Parses raw text into runs under one set of import settings
#[derive(Debug, Clone)]
pub struct RunParser {
    settings: ImportFormatSettings,
    registry: FieldRegistry,
    fallback_timestamp: NaiveDateTime,
}

impl RunParser {
    /// `fallback_timestamp` dates runs whose text carries no date at all.
    #[must_use]
    pub fn new(settings: ImportFormatSettings, fallback_timestamp: NaiveDateTime) -> Self {
        Self {
            settings,
            registry: FieldRegistry::standard(),
            fallback_timestamp,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &ImportFormatSettings {
        &self.settings
    }

    #[must_use]
    pub const fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Parse one raw value for field `key`.
    #[must_use]
    pub fn parse_field(&self, original_key: &str, key: &str, raw: &str) -> FieldValue {
        let raw = raw.trim();
        let data_type = self.field_type(key, raw);
        let (value, display_value, data_type) = match data_type {
            DataType::Number if key == "tier" => {
                let tier = parse_shorthand_number(raw.trim_end_matches('+'), &self.settings)
                    .unwrap_or(0.0);
                (Value::Number(tier), raw.to_string(), DataType::Number)
            }
            DataType::Number => match parse_shorthand_number(raw, &self.settings) {
                Some(n) => (Value::Number(n), format_shorthand(n), DataType::Number),
                None => {
                    log::debug!("field {key}: {raw:?} is not numeric, using 0");
                    (Value::Number(0.0), raw.to_string(), DataType::Number)
                }
            },
            DataType::Duration => match parse_duration(raw) {
                Some(secs) => (
                    Value::Number(u64_to_f64(secs)),
                    format_duration(secs),
                    DataType::Duration,
                ),
                None => {
                    log::debug!("field {key}: {raw:?} is not a duration, using 0");
                    (Value::Number(0.0), raw.to_string(), DataType::Duration)
                }
            },
            DataType::Date => match self.parse_date(key, raw) {
                Some(ts) => {
                    let display = if key == "_date" {
                        format_iso_date(&ts)
                    } else {
                        format!("{} {}", format_iso_date(&ts), format_time(&ts))
                    };
                    (Value::Date(ts), display, DataType::Date)
                }
                None => {
                    log::debug!("field {key}: {raw:?} is not a recognizable date");
                    (Value::Text(raw.to_string()), raw.to_string(), DataType::String)
                }
            },
            DataType::String => (Value::Text(raw.to_string()), raw.to_string(), DataType::String),
        };

        FieldValue {
            value,
            raw_value: raw.to_string(),
            display_value,
            original_key: original_key.trim().to_string(),
            data_type,
        }
    }

    /// Unregistered fields are numbers; only text that no shorthand reading
    /// accepts (`3h 2m`, `1h`) falls back to a duration.
    fn field_type(&self, key: &str, raw: &str) -> DataType {
        let data_type = self.registry.infer_data_type(key);
        if data_type == DataType::Number
            && self.registry.get(key).is_none()
            && parse_shorthand_number(raw, &self.settings).is_none()
            && looks_like_duration(raw)
        {
            return DataType::Duration;
        }
        data_type
    }

    fn parse_date(&self, key: &str, raw: &str) -> Option<NaiveDateTime> {
        if key == "_date"
            && let Some(ts) = parse_internal_date_time(raw, None)
        {
            return Some(ts);
        }
        parse_battle_date(raw, self.settings.date_format)
    }

    /// Parse `(header, raw)` pairs into a field map.
    ///
    /// Empty values are skipped. When a battle date is present but `_date` or
    /// `_time` is missing, the missing internal field is derived from it;
    /// existing internal values are kept verbatim.
    #[must_use]
    pub fn parse_fields(&self, pairs: &[(String, String)]) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        for (header, raw) in pairs {
            if raw.trim().is_empty() {
                continue;
            }
            let key = self.registry.canonical_key(&normalize_field_name(header));
            if key.is_empty() {
                continue;
            }
            let value = self.parse_field(header, &key, raw);
            fields.insert(key, value);
        }

        let battle_date = match fields.get("battleDate").map(|f| &f.value) {
            Some(Value::Date(ts)) => Some(*ts),
            _ => None,
        };
        if let Some(ts) = battle_date {
            let date = format_iso_date(&ts);
            let time = format_time(&ts);
            fields.entry("_date".to_string()).or_insert_with(|| FieldValue {
                value: Value::Date(ts.date().and_time(NaiveTime::MIN)),
                raw_value: date.clone(),
                display_value: date,
                original_key: "_date".to_string(),
                data_type: DataType::Date,
            });
            fields
                .entry("_time".to_string())
                .or_insert_with(|| FieldValue::text("_time", &time));
        }
        fields
    }

    fn timestamp(&self, fields: &BTreeMap<String, FieldValue>) -> NaiveDateTime {
        let time_raw = fields.get("_time").map(|f| f.raw_value.as_str());
        match fields.get("_date").map(|f| &f.value) {
            Some(Value::Date(date)) => {
                let time = time_raw
                    .and_then(|t| parse_internal_date_time(&format_iso_date(date), Some(t)))
                    .map_or(date.time(), |ts| ts.time());
                date.date().and_time(time)
            }
            _ => match fields.get("battleDate").map(|f| &f.value) {
                Some(Value::Date(ts)) => *ts,
                _ => self.fallback_timestamp,
            },
        }
    }

    /// Assemble a run from parsed fields.
    ///
    /// An `_id` field is consumed as the run id; otherwise a new id is made.
    ///
    /// # Errors
    ///
    /// Returns a message when the tier is missing or below 1.
    pub fn build_run(&self, mut fields: BTreeMap<String, FieldValue>) -> Result<RunRecord, String> {
        let id = fields
            .remove("_id")
            .map(|f| f.raw_value)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(RunRecord::new_id);

        let tier_raw = fields.get("tier").map(|f| f.raw_value.clone());
        let tier = fields
            .get("tier")
            .and_then(FieldValue::as_number)
            .map_or(0, f64_to_u32);
        if tier < 1 {
            return Err(match tier_raw {
                Some(raw) => format!("invalid tier {raw:?}"),
                None => "missing tier".to_string(),
            });
        }

        let number = |key: &str| fields.get(key).and_then(FieldValue::as_number).unwrap_or(0.0);
        let run_type = infer_run_type(
            fields.get("_runType").map(|f| f.raw_value.as_str()),
            tier_raw.as_deref(),
        );

        Ok(RunRecord {
            id,
            timestamp: self.timestamp(&fields),
            tier,
            wave: f64_to_u32(number("wave")),
            coins_earned: number("coinsEarned").max(0.0),
            cells_earned: number("cellsEarned").max(0.0),
            real_time: f64_to_u64(number("realTime")),
            run_type,
            fields,
        })
    }

    /// Parse one pasted battle report.
    #[must_use]
    pub fn parse_clipboard(&self, text: &str) -> ClipboardImport {
        let pairs = parse_key_value_block(text, &self.registry);
        if pairs.is_empty() {
            return ClipboardImport {
                errors: vec![format!("Failed to parse data: {}", ImportError::Empty)],
                ..ClipboardImport::default()
            };
        }
        let format_mismatch = detect_format_mismatch(&canary_fields(&pairs), &self.settings);
        match self.build_run(self.parse_fields(&pairs)) {
            Ok(run) => ClipboardImport {
                run: Some(run),
                errors: Vec::new(),
                format_mismatch,
            },
            Err(reason) => ClipboardImport {
                run: None,
                errors: vec![format!("Failed to parse data: {reason}")],
                format_mismatch,
            },
        }
    }

    /// Parse delimited text whose first line is a header row.
    #[must_use]
    pub fn parse_delimited(&self, text: &str, delimiter: &Delimiter) -> ImportResult {
        self.parse_rows(text, delimiter, false)
            .unwrap_or_else(|err| ImportResult::failure(&err))
    }

    /// Parse the escaped tab-delimited store format.
    pub(crate) fn parse_store_rows(&self, text: &str) -> ImportResult {
        self.parse_rows(text, &Delimiter::Tab, true)
            .unwrap_or_else(|err| ImportResult::failure(&err))
    }

    fn field_mapping(&self, header: &str) -> FieldMapping {
        let key = self.registry.canonical_key(&normalize_field_name(header));
        let known = self.registry.get(&key);
        FieldMapping {
            original_header: header.trim().to_string(),
            data_type: self.registry.infer_data_type(&key),
            known: known.is_some(),
            field_key: key,
        }
    }

    fn parse_rows(
        &self,
        text: &str,
        delimiter: &Delimiter,
        unescape: bool,
    ) -> Result<ImportResult, ImportError> {
        if text.trim().is_empty() {
            return Err(ImportError::Empty);
        }
        let delimiter_byte = delimiter.as_byte()?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_byte)
            .has_headers(true)
            .flexible(true)
            .quoting(!unescape)
            .trim(if unescape { csv::Trim::None } else { csv::Trim::All })
            .from_reader(text.trim_start().as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| if unescape { decode_cell(h) } else { h.to_string() })
            .collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let mut result = ImportResult {
            field_mappings: headers.iter().map(|h| self.field_mapping(h)).collect(),
            ..ImportResult::default()
        };
        let mut data_rows = 0usize;

        for (idx, record) in reader.records().enumerate() {
            let row_number = idx + 2;
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    data_rows += 1;
                    result.failed += 1;
                    result.errors.push(format!("Row {row_number}: {err}"));
                    continue;
                }
            };
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            data_rows += 1;

            let pairs: Vec<(String, String)> = headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| {
                    let cell = if unescape { decode_cell(cell) } else { cell.to_string() };
                    (header.clone(), cell)
                })
                .collect();
            if data_rows == 1 {
                result.format_mismatch = detect_format_mismatch(&canary_fields(&pairs), &self.settings);
            }

            match self.build_run(self.parse_fields(&pairs)) {
                Ok(run) => result.success.push(run),
                Err(reason) => {
                    log::debug!("skipping row {row_number}: {reason}");
                    result.failed += 1;
                    result.errors.push(format!("Row {row_number}: {reason}"));
                }
            }
        }

        if data_rows == 0 {
            return Err(ImportError::NoRows);
        }
        if result.success.is_empty() {
            let reason = ImportError::NoUsableRows(data_rows);
            log::warn!("import failed: {reason}");
            result.errors.insert(0, format!("Failed to parse data: {reason}"));
        }
        log::debug!(
            "parsed {} runs, {} failed, {} columns",
            result.success.len(),
            result.failed,
            result.field_mappings.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fallback() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn parser() -> RunParser {
        RunParser::new(ImportFormatSettings::default(), fallback())
    }

    const REPORT: &str = "Battle Report\n\
        Battle Date\tNov 20, 2025 14:35\n\
        Game Time\t1d 13h 24m 51s\n\
        Real Time\t7h 46m 6s\n\
        Tier\t10+\n\
        Wave\t4,321\n\
        Killed By\tBoss\n\
        Coins earned\t43.91T\n\
        Cells Earned\t12.5K\n\
        Damage dealt\t1.2aa\n";

    #[test]
    fn splits_pasted_lines() {
        let registry = FieldRegistry::standard();
        let pairs = parse_key_value_block(
            "Combat\nCoins earned    1.13T\nKilled By Boss\nWave 120\nBattle Report\n",
            &registry,
        );
        assert_eq!(
            pairs,
            vec![
                ("Coins earned".to_string(), "1.13T".to_string()),
                ("Killed By".to_string(), "Boss".to_string()),
                ("Wave".to_string(), "120".to_string()),
            ]
        );
    }

    #[test]
    fn parses_full_report() {
        let parsed = parser().parse_clipboard(REPORT);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let run = parsed.run.unwrap();
        assert_eq!(run.tier, 10);
        assert_eq!(run.wave, 4321);
        assert_eq!(run.run_type, RunType::Tournament);
        assert_eq!(run.coins_earned, 43_910_000_000_000.0);
        assert_eq!(run.cells_earned, 12_500.0);
        assert_eq!(run.real_time, 27_966);
        assert_eq!(run.number("gameTime"), Some(131_091.0));
        assert_eq!(
            run.timestamp,
            NaiveDate::from_ymd_opt(2025, 11, 20)
                .unwrap()
                .and_hms_opt(14, 35, 0)
                .unwrap()
        );
        assert_eq!(run.field("_date").unwrap().raw_value, "2025-11-20");
        assert_eq!(run.field("_time").unwrap().raw_value, "14:35:00");
        assert_eq!(run.field("coinsEarned").unwrap().display_value, "43.91T");
        assert_eq!(run.field("coinsEarned").unwrap().original_key, "Coins earned");
        assert!(!parsed.format_mismatch.any());
    }

    #[test]
    fn explicit_date_fields_are_preserved() {
        let pairs = vec![
            ("Tier".to_string(), "3".to_string()),
            ("Battle Date".to_string(), "Nov 20, 2025 14:35".to_string()),
            ("_date".to_string(), "2025-11-19".to_string()),
            ("_time".to_string(), "23:59:00".to_string()),
        ];
        let p = parser();
        let fields = p.parse_fields(&pairs);
        assert_eq!(fields["_date"].raw_value, "2025-11-19");
        assert_eq!(fields["_time"].raw_value, "23:59:00");
        let run = p.build_run(fields).unwrap();
        assert_eq!(
            run.timestamp,
            NaiveDate::from_ymd_opt(2025, 11, 19)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap()
        );
    }

    #[test]
    fn run_type_inference() {
        assert_eq!(infer_run_type(Some("Milestone"), Some("10+")), RunType::Milestone);
        assert_eq!(infer_run_type(Some("weekly"), Some("10+")), RunType::Tournament);
        assert_eq!(infer_run_type(None, Some("10")), RunType::Farm);
        assert_eq!(infer_run_type(None, None), RunType::Farm);
    }

    #[test]
    fn missing_values_default_to_zero() {
        let pairs = vec![
            ("Tier".to_string(), "5".to_string()),
            ("Coins earned".to_string(), "lots".to_string()),
        ];
        let run = parser().build_run(parser().parse_fields(&pairs)).unwrap();
        assert_eq!(run.coins_earned, 0.0);
        assert_eq!(run.wave, 0);
        assert_eq!(run.real_time, 0);
        assert_eq!(run.timestamp, fallback());
        assert_eq!(run.field("coinsEarned").unwrap().raw_value, "lots");
    }

    #[test]
    fn clipboard_without_tier_reports_error() {
        let parsed = parser().parse_clipboard("Coins earned\t1.13T\n");
        assert!(parsed.run.is_none());
        assert_eq!(parsed.errors, vec!["Failed to parse data: missing tier".to_string()]);

        let empty = parser().parse_clipboard("   \n");
        assert_eq!(empty.errors, vec!["Failed to parse data: No data provided".to_string()]);
    }

    #[test]
    fn clipboard_flags_comma_decimals() {
        let parsed = parser().parse_clipboard("Tier\t8\nCoins earned\t43,91T\n");
        assert!(parsed.format_mismatch.number_mismatch);
    }

    #[test]
    fn detects_delimiters() {
        assert_eq!(Delimiter::detect("Tier\tWave\tCoins earned"), Delimiter::Tab);
        assert_eq!(Delimiter::detect("Tier;Wave;Coins earned"), Delimiter::Semicolon);
        assert_eq!(Delimiter::detect("Tier,Wave,Coins earned"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("Tier"), Delimiter::Tab);
    }

    #[test]
    fn parses_csv_with_quoted_comma_decimals() {
        let text = "Tier,Wave,Coins earned,Real Time,Notes\n\
                    12,5000,\"43,91T\",7h 46m 6s,first\n\
                    ,,,,\n\
                    0,10,1K,1m,bad tier\n";
        let p = RunParser::new(ImportFormatSettings::european(), fallback());
        let result = p.parse_delimited(text, &Delimiter::Comma);
        assert_eq!(result.success.len(), 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors, vec!["Row 4: invalid tier \"0\"".to_string()]);
        let run = &result.success[0];
        assert_eq!(run.coins_earned, 43_910_000_000_000.0);
        assert_eq!(run.notes(), Some("first"));
        let notes = result
            .field_mappings
            .iter()
            .find(|m| m.original_header == "Notes")
            .unwrap();
        assert_eq!(notes.field_key, "_notes");
        assert!(notes.known);
    }

    #[test]
    fn hard_failures_become_error_results() {
        let p = parser();
        let empty = p.parse_delimited("", &Delimiter::Tab);
        assert!(empty.is_failure());
        assert_eq!(empty.errors, vec!["Failed to parse data: No data provided".to_string()]);

        let header_only = p.parse_delimited("Tier\tWave\n", &Delimiter::Tab);
        assert!(header_only.success.is_empty());
        assert_eq!(
            header_only.errors,
            vec!["Failed to parse data: No data rows found".to_string()]
        );

        let bad_delim = p.parse_delimited("Tier||Wave\n1||2", &Delimiter::Custom("||".into()));
        assert!(bad_delim.errors[0].starts_with("Failed to parse data: Unsupported delimiter"));
    }

    #[test]
    fn all_rows_failing_is_reported_as_parse_failure() {
        let result = parser().parse_delimited("Wave\tCoins earned\n100\t1K\n200\t2K\n", &Delimiter::Tab);
        assert!(result.is_failure());
        assert_eq!(result.failed, 2);
        assert_eq!(
            result.errors,
            vec![
                "Failed to parse data: None of the 2 data rows could be parsed".to_string(),
                "Row 2: missing tier".to_string(),
                "Row 3: missing tier".to_string(),
            ]
        );

        let partial = parser().parse_delimited("Tier\tWave\n4\t100\n\t200\n", &Delimiter::Tab);
        assert_eq!(partial.success.len(), 1);
        assert!(partial.errors.iter().all(|e| e.starts_with("Row ")));
    }

    #[test]
    fn unregistered_fields_keep_shorthand_numbers() {
        let parsed = parser().parse_clipboard(
            "Tier\t5\nCoins From Golden Bot\t12M\nNew Metric\t5s\nOdd Stat\t2D\nHuge Stat\t1.5aa\nThird Stat\t3d\n",
        );
        let run = parsed.run.unwrap();
        let golden = run.field("coinsFromGoldenBot").unwrap();
        assert_eq!(golden.data_type, DataType::Number);
        assert_eq!(golden.value, Value::Number(12_000_000.0));
        assert_eq!(run.number("newMetric"), Some(5e21));
        assert_eq!(run.number("oddStat"), Some(2e33));
        assert_eq!(run.number("hugeStat"), Some(1.5e36));
        assert_eq!(run.number("thirdStat"), Some(3e33));
        assert_eq!(run.field("newMetric").unwrap().data_type, DataType::Number);
    }

    #[test]
    fn unregistered_timer_text_becomes_duration() {
        let parsed = parser().parse_clipboard("Tier\t5\nMystery Timer\t3h 2m\n");
        let timer = parsed.run.unwrap().field("mysteryTimer").cloned().unwrap();
        assert_eq!(timer.data_type, DataType::Duration);
        assert_eq!(timer.value, Value::Number(10_920.0));
    }

    #[test]
    fn custom_delimiter() {
        let result = parser().parse_delimited("Tier|Wave\n4|900\n", &Delimiter::Custom("|".into()));
        assert_eq!(result.success.len(), 1);
        assert_eq!(result.success[0].wave, 900);
    }
}
