//! Shorthand number handling (`43.91T`) and safe numeric casts.

use num_traits::cast::cast;

use crate::settings::ImportFormatSettings;

/// Single-letter magnitude suffixes in ascending order, with their power of ten.
const SINGLE_SUFFIXES: [(&str, i32); 11] = [
    ("K", 3),
    ("M", 6),
    ("B", 9),
    ("T", 12),
    ("q", 15),
    ("Q", 18),
    ("s", 21),
    ("S", 24),
    ("O", 27),
    ("N", 30),
    ("D", 33),
];

/// Exponent of `aa`; each following double-letter tier adds three.
const FIRST_DOUBLE_EXPONENT: i32 = 36;

/// Largest power of ten an `f64` can hold.
const MAX_EXPONENT: i32 = 306;

/// Power of ten represented by a magnitude suffix.
///
/// Exact case wins, so `q` (quadrillion) and `Q` (quintillion) stay distinct.
/// Letters without a case twin also match case-insensitively (`k`, `t`), as
/// do double-letter tiers (`aa`, `AB`).
#[must_use]
pub fn suffix_exponent(suffix: &str) -> Option<i32> {
    if let Some((_, exp)) = SINGLE_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some(*exp);
    }
    let mut chars = suffix.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, None) => {
            let upper = c.to_ascii_uppercase();
            if matches!(upper, 'Q' | 'S') {
                return None;
            }
            SINGLE_SUFFIXES
                .iter()
                .find(|(s, _)| s.starts_with(upper))
                .map(|(_, exp)| *exp)
        }
        (Some(a), Some(b), None) if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
            let first = i32::from(a.to_ascii_lowercase() as u8 - b'a');
            let second = i32::from(b.to_ascii_lowercase() as u8 - b'a');
            let exp = FIRST_DOUBLE_EXPONENT + 3 * (first * 26 + second);
            (exp <= MAX_EXPONENT).then_some(exp)
        }
        _ => None,
    }
}

fn suffix_for_exponent(exp: i32) -> Option<String> {
    if exp < FIRST_DOUBLE_EXPONENT {
        return SINGLE_SUFFIXES
            .iter()
            .find(|(_, e)| *e == exp)
            .map(|(s, _)| (*s).to_string());
    }
    let index = (exp - FIRST_DOUBLE_EXPONENT) / 3;
    let first = u8::try_from(index / 26).ok()?;
    let second = u8::try_from(index % 26).ok()?;
    if first >= 26 {
        return None;
    }
    Some(format!("{}{}", char::from(b'a' + first), char::from(b'a' + second)))
}

/// Split `43.91T` into `("43.91", "T")`.
fn split_suffix(token: &str) -> (&str, &str) {
    let start = token
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphabetic())
        .last()
        .map_or(token.len(), |(idx, _)| idx);
    let (number, suffix) = token.split_at(start);
    (number.trim_end(), suffix)
}

/// Rewrite a mantissa into `[-]digits[.digits]` using the configured separators.
fn normalize_mantissa(number: &str, settings: &ImportFormatSettings) -> Option<String> {
    let decimal = settings.decimal_separator.as_char();
    let thousands = settings
        .thousands_separator
        .as_char()
        .filter(|sep| *sep != decimal);

    let mut out = String::with_capacity(number.len());
    for c in number.chars() {
        if Some(c) == thousands || (thousands == Some(' ') && matches!(c, '\u{a0}' | '\u{202f}'))
        {
            continue;
        }
        if c == decimal {
            out.push('.');
        } else {
            out.push(c);
        }
    }

    let body = out.strip_prefix('-').unwrap_or(&out);
    let mut parts = body.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();
    let valid_int = int_part.chars().all(|c| c.is_ascii_digit());
    let valid_frac = frac_part.is_none_or(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()));
    if int_part.is_empty() && frac_part.is_none() {
        return None;
    }
    (valid_int && valid_frac).then_some(out)
}

/// Multiply a normalized decimal mantissa by `10^exp` without binary rounding
/// error whenever the result fits in a `u128`.
fn scale_decimal(mantissa: &str, exp: i32) -> Option<f64> {
    let (negative, body) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let frac_len = i32::try_from(frac_part.len()).ok()?;
    let shift = exp - frac_len;
    let digits = format!("{int_part}{frac_part}");

    let exact = if shift >= 0 {
        digits
            .parse::<u128>()
            .ok()
            .and_then(|d| 10_u128.checked_pow(u32::try_from(shift).ok()?).and_then(|p| d.checked_mul(p)))
            .and_then(|v| cast::<u128, f64>(v))
    } else {
        None
    };

    let magnitude = match exact {
        Some(v) => v,
        None => body.parse::<f64>().ok()? * 10_f64.powi(exp),
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a possibly suffixed number such as `43.91T`, `1,234` or `7.5aa`.
///
/// Returns `None` when the text is not a number under `settings`.
#[must_use]
pub fn parse_shorthand_number(raw: &str, settings: &ImportFormatSettings) -> Option<f64> {
    let token = raw.trim().trim_start_matches('$').trim();
    if token.is_empty() {
        return None;
    }
    let (number, suffix) = split_suffix(token);
    let exp = if suffix.is_empty() {
        0
    } else {
        suffix_exponent(suffix)?
    };
    let mantissa = normalize_mantissa(number, settings)?;
    let value = scale_decimal(&mantissa, exp)?;
    value.is_finite().then_some(value)
}

/// Parse an optional numeric field, substituting zero for anything unparseable.
#[must_use]
pub fn parse_number_or_zero(raw: Option<&str>, settings: &ImportFormatSettings) -> f64 {
    raw.and_then(|r| parse_shorthand_number(r, settings))
        .unwrap_or(0.0)
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{value:.2}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Canonical shorthand rendering, e.g. `43910000000000.0` → `43.91T`.
#[must_use]
pub fn format_shorthand(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let abs = value.abs();
    if abs < 1000.0 {
        return trim_decimals(value);
    }
    let mut exp = 3 * (round_f64_to_i32(abs.log10().floor()) / 3);
    loop {
        let Some(suffix) = suffix_for_exponent(exp) else {
            return format!("{value:e}");
        };
        let mantissa = value / 10_f64.powi(exp);
        if (mantissa.abs() * 100.0).round() / 100.0 >= 1000.0 && suffix_for_exponent(exp + 3).is_some() {
            exp += 3;
            continue;
        }
        return format!("{}{suffix}", trim_decimals(mantissa));
    }
}

/// Exact decimal text used by the persisted store.
#[must_use]
pub fn format_canonical(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        "0".to_string()
    }
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Round a f64 into a u32, returning 0 for negative or non-finite values.
#[must_use]
pub fn f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(value.min(max).round()).unwrap_or(0)
}

/// Round a f64 into a u64, returning 0 for negative or non-finite values.
#[must_use]
pub fn f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    cast::<f64, u64>(value.min(max).round()).unwrap_or(0)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DecimalSeparator, ThousandsSeparator};

    fn comma_decimal() -> ImportFormatSettings {
        ImportFormatSettings {
            decimal_separator: DecimalSeparator::Comma,
            thousands_separator: ThousandsSeparator::Period,
            ..ImportFormatSettings::default()
        }
    }

    #[test]
    fn expands_suffixes_exactly() {
        let settings = ImportFormatSettings::default();
        assert_eq!(parse_shorthand_number("1.13T", &settings), Some(1_130_000_000_000.0));
        assert_eq!(parse_shorthand_number("43.91T", &settings), Some(43_910_000_000_000.0));
        assert_eq!(parse_shorthand_number("100K", &settings), Some(100_000.0));
        assert_eq!(parse_shorthand_number("2.5m", &settings), Some(2_500_000.0));
    }

    #[test]
    fn comma_decimal_matches_period_decimal() {
        let period = parse_shorthand_number("43.91T", &ImportFormatSettings::default());
        let comma = parse_shorthand_number("43,91T", &comma_decimal());
        assert_eq!(period, comma);
        assert_eq!(parse_shorthand_number("1.234,5", &comma_decimal()), Some(1234.5));
    }

    #[test]
    fn thousands_separators_are_stripped() {
        let settings = ImportFormatSettings::default();
        assert_eq!(parse_shorthand_number("1,234,567", &settings), Some(1_234_567.0));
        let spaced = ImportFormatSettings {
            decimal_separator: DecimalSeparator::Comma,
            thousands_separator: ThousandsSeparator::Space,
            ..ImportFormatSettings::default()
        };
        assert_eq!(parse_shorthand_number("12 345,5", &spaced), Some(12_345.5));
    }

    #[test]
    fn case_twins_stay_distinct() {
        assert_eq!(suffix_exponent("q"), Some(15));
        assert_eq!(suffix_exponent("Q"), Some(18));
        assert_eq!(suffix_exponent("s"), Some(21));
        assert_eq!(suffix_exponent("S"), Some(24));
        assert_eq!(suffix_exponent("k"), Some(3));
    }

    #[test]
    fn double_letter_tiers_continue_progression() {
        assert_eq!(suffix_exponent("aa"), Some(36));
        assert_eq!(suffix_exponent("ab"), Some(39));
        assert_eq!(suffix_exponent("AC"), Some(42));
        assert_eq!(suffix_exponent("ba"), Some(36 + 78));
        let value = parse_shorthand_number("2aa", &ImportFormatSettings::default()).unwrap();
        assert!((value / 2e36 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_garbage() {
        let settings = ImportFormatSettings::default();
        assert_eq!(parse_shorthand_number("", &settings), None);
        assert_eq!(parse_shorthand_number("abc", &settings), None);
        assert_eq!(parse_shorthand_number("12X", &settings), None);
        assert_eq!(parse_shorthand_number("1.2.3", &settings), None);
        assert_eq!(parse_number_or_zero(Some("n/a"), &settings), 0.0);
        assert_eq!(parse_number_or_zero(None, &settings), 0.0);
    }

    #[test]
    fn formats_shorthand() {
        assert_eq!(format_shorthand(43_910_000_000_000.0), "43.91T");
        assert_eq!(format_shorthand(1_000_000.0), "1M");
        assert_eq!(format_shorthand(999.5), "999.5");
        assert_eq!(format_shorthand(999_999.0), "1M");
        assert_eq!(format_shorthand(3e36), "3aa");
    }

    #[test]
    fn casts_clamp_and_zero_out() {
        assert_eq!(f64_to_u32(-4.0), 0);
        assert_eq!(f64_to_u32(f64::NAN), 0);
        assert_eq!(f64_to_u32(12.6), 13);
        assert_eq!(f64_to_u64(1e30), u64::MAX);
        assert_eq!(round_f64_to_i32(1.6), 2);
    }
}
