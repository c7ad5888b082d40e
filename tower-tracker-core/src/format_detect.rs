//! Infers the decimal separator and date format actually used by imported
//! data so the user can be warned when it disagrees with their settings.
//!
//! Detection is advisory: it never changes parsed output, and a value that
//! carries no evidence (`100K`, a missing field) never counts as a mismatch.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::settings::{DateFormat, DecimalSeparator, ImportFormatSettings};

/// Digit, separator, one or two fraction digits, then a magnitude suffix.
static SUFFIXED_DECIMAL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\d([.,])\d{1,2}\s*[A-Za-z]+").ok());

static MONTH_FIRST_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\p{Lu}\p{L}{2,}\s\d").ok());

static MONTH_FIRST_LOWERCASE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\p{Ll}\p{L}*\.?.*\d").ok());

const COINS_KEYS: [&str; 2] = ["coins_earned", "Coins earned"];
const DAMAGE_KEYS: [&str; 2] = ["damage_dealt", "Damage dealt"];
const BATTLE_DATE_KEYS: [&str; 2] = ["battle_date", "Battle Date"];

/// Decimal separator implied by a suffixed value such as `43,91T`.
#[must_use]
pub fn detect_decimal_separator_from_value(raw: Option<&str>) -> Option<DecimalSeparator> {
    let raw = raw?.trim();
    let caps = SUFFIXED_DECIMAL_RE.as_ref()?.captures(raw)?;
    let sep = caps.get(1)?.as_str().chars().next()?;
    DecimalSeparator::from_char(sep)
}

/// Date format implied by the leading month token of a battle date.
#[must_use]
pub fn detect_date_format_from_value(raw: Option<&str>) -> Option<DateFormat> {
    let raw = raw?.trim();
    if MONTH_FIRST_RE.as_ref()?.is_match(raw) {
        return Some(DateFormat::MonthFirst);
    }
    if MONTH_FIRST_LOWERCASE_RE.as_ref()?.is_match(raw) {
        return Some(DateFormat::MonthFirstLowercase);
    }
    None
}

/// Outcome of comparing detected formats against configured settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatMismatch {
    pub number_mismatch: bool,
    pub date_mismatch: bool,
    pub detected_decimal_separator: Option<DecimalSeparator>,
    pub detected_date_format: Option<DateFormat>,
}

impl FormatMismatch {
    #[must_use]
    pub const fn any(&self) -> bool {
        self.number_mismatch || self.date_mismatch
    }
}

fn lookup<'a>(raw: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| raw.get(*k)).map(String::as_str)
}

/// Compare the formats found in one raw record with `settings`.
///
/// Coins earned is the decimal canary, with damage dealt as fallback when
/// coins are absent or carry no fractional part; battle date is the date
/// canary.
#[must_use]
pub fn detect_format_mismatch(
    raw_fields: &HashMap<String, String>,
    settings: &ImportFormatSettings,
) -> FormatMismatch {
    let detected_decimal_separator =
        detect_decimal_separator_from_value(lookup(raw_fields, &COINS_KEYS))
            .or_else(|| detect_decimal_separator_from_value(lookup(raw_fields, &DAMAGE_KEYS)));
    let detected_date_format =
        detect_date_format_from_value(lookup(raw_fields, &BATTLE_DATE_KEYS));

    let number_mismatch =
        detected_decimal_separator.is_some_and(|sep| sep != settings.decimal_separator);
    let date_mismatch = detected_date_format.is_some_and(|fmt| fmt != settings.date_format);

    if number_mismatch || date_mismatch {
        log::warn!(
            "import format mismatch: detected decimal {detected_decimal_separator:?}, date {detected_date_format:?}; configured {settings:?}"
        );
    }

    FormatMismatch {
        number_mismatch,
        date_mismatch,
        detected_decimal_separator,
        detected_date_format,
    }
}
