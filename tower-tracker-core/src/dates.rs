//! Battle date parsing across the English, French and German game exports.
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::settings::DateFormat;

static MONTH_FIRST_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\p{L}+)\.?\s+(\d{1,2}),?\s+(\d{4})(?:,?\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp])?\.?[Mm]?\.?)?\s*$",
    )
    .ok()
});

static ISO_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4})-(\d{2})-(\d{2})(?:[T\s](\d{2}):(\d{2})(?::(\d{2}))?)?\s*$").ok()
});

/// Month tokens after lowercasing and dropping a trailing period.
const MONTHS: &[(&str, u32)] = &[
    // English
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
    // French
    ("janv", 1),
    ("janvier", 1),
    ("févr", 2),
    ("fevr", 2),
    ("février", 2),
    ("fevrier", 2),
    ("mars", 3),
    ("avr", 4),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juil", 7),
    ("juillet", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("déc", 12),
    ("décembre", 12),
    ("decembre", 12),
    // German
    ("januar", 1),
    ("februar", 2),
    ("mär", 3),
    ("märz", 3),
    ("maerz", 3),
    ("mrz", 3),
    ("juni", 6),
    ("juli", 7),
    ("okt", 10),
    ("oktober", 10),
    ("dez", 12),
    ("dezember", 12),
];

/// Month number for an English, French or German month token.
#[must_use]
pub fn month_from_token(token: &str) -> Option<u32> {
    let normalized = token.trim().trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, month)| *month)
}

fn to_24h(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some("a") if hour == 12 => 0,
        Some("p") if hour < 12 => hour + 12,
        _ => hour,
    }
}

fn capture_u32(caps: &regex::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

fn parse_month_first(raw: &str, lowercase_month: bool) -> Option<NaiveDateTime> {
    let caps = MONTH_FIRST_RE.as_ref()?.captures(raw)?;
    let token = caps.get(1)?.as_str();
    let first = token.chars().next()?;
    if first.is_lowercase() != lowercase_month {
        return None;
    }
    let month = month_from_token(token)?;
    let day = capture_u32(&caps, 2)?;
    let year = i32::try_from(capture_u32(&caps, 3)?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let hour = capture_u32(&caps, 4).unwrap_or(0);
    let minute = capture_u32(&caps, 5).unwrap_or(0);
    let second = capture_u32(&caps, 6).unwrap_or(0);
    let hour = to_24h(hour, caps.get(7).map(|m| m.as_str()));
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(date.and_time(time))
}

fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    let caps = ISO_RE.as_ref()?.captures(raw)?;
    let year = i32::try_from(capture_u32(&caps, 1)?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, capture_u32(&caps, 2)?, capture_u32(&caps, 3)?)?;
    let time = NaiveTime::from_hms_opt(
        capture_u32(&caps, 4).unwrap_or(0),
        capture_u32(&caps, 5).unwrap_or(0),
        capture_u32(&caps, 6).unwrap_or(0),
    )?;
    Some(date.and_time(time))
}

/// Parse a combined battle date such as `Nov 20, 2025 14:35`.
///
/// The grammar for `format` is tried first, then the other month casing,
/// then ISO `YYYY-MM-DD[ HH:MM[:SS]]`.
#[must_use]
pub fn parse_battle_date(raw: &str, format: DateFormat) -> Option<NaiveDateTime> {
    let lowercase = matches!(format, DateFormat::MonthFirstLowercase);
    if let Some(parsed) = parse_month_first(raw, lowercase) {
        return Some(parsed);
    }
    if let Some(parsed) = parse_month_first(raw, !lowercase) {
        log::debug!("battle date {raw:?} does not use configured {format} casing");
        return Some(parsed);
    }
    parse_iso(raw)
}

/// Parse the internal `_date` / `_time` pair written by the store.
#[must_use]
pub fn parse_internal_date_time(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time
        .and_then(|t| {
            NaiveTime::parse_from_str(t.trim(), "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t.trim(), "%H:%M"))
                .ok()
        })
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

#[must_use]
pub fn format_iso_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

#[must_use]
pub fn format_time(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_english_month_first() {
        assert_eq!(
            parse_battle_date("Nov 20, 2025 14:35", DateFormat::MonthFirst),
            Some(dt(2025, 11, 20, 14, 35, 0))
        );
        assert_eq!(
            parse_battle_date("Nov 20, 2025 2:35 PM", DateFormat::MonthFirst),
            Some(dt(2025, 11, 20, 14, 35, 0))
        );
        assert_eq!(
            parse_battle_date("Jan 1, 2025 12:05 am", DateFormat::MonthFirst),
            Some(dt(2025, 1, 1, 0, 5, 0))
        );
    }

    #[test]
    fn parses_lowercase_locales() {
        assert_eq!(
            parse_battle_date("déc. 3, 2025 09:15:30", DateFormat::MonthFirstLowercase),
            Some(dt(2025, 12, 3, 9, 15, 30))
        );
        assert_eq!(
            parse_battle_date("févr. 14 2025 20:00", DateFormat::MonthFirstLowercase),
            Some(dt(2025, 2, 14, 20, 0, 0))
        );
    }

    #[test]
    fn german_tokens_resolve() {
        assert_eq!(month_from_token("Okt."), Some(10));
        assert_eq!(month_from_token("März"), Some(3));
        assert_eq!(month_from_token("Dez"), Some(12));
        assert_eq!(month_from_token("Smarch"), None);
    }

    #[test]
    fn falls_back_to_other_casing_and_iso() {
        assert_eq!(
            parse_battle_date("nov 20, 2025 14:35", DateFormat::MonthFirst),
            Some(dt(2025, 11, 20, 14, 35, 0))
        );
        assert_eq!(
            parse_battle_date("2025-11-20 14:35:00", DateFormat::MonthFirst),
            Some(dt(2025, 11, 20, 14, 35, 0))
        );
        assert_eq!(parse_battle_date("yesterday", DateFormat::MonthFirst), None);
        assert_eq!(parse_battle_date("Feb 30, 2025 10:00", DateFormat::MonthFirst), None);
    }

    #[test]
    fn internal_pair_round_trips() {
        let ts = dt(2025, 11, 20, 14, 35, 9);
        let parsed = parse_internal_date_time(&format_iso_date(&ts), Some(&format_time(&ts)));
        assert_eq!(parsed, Some(ts));
        assert_eq!(
            parse_internal_date_time("2025-11-20", None),
            Some(dt(2025, 11, 20, 0, 0, 0))
        );
    }
}
