//! Game-time and real-time durations such as `1d 13h 24m 51s`.
use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d+)\s*d)?\s*(?:(\d+)\s*h)?\s*(?:(\d+)\s*m)?\s*(?:(\d+)\s*s)?\s*$").ok()
});

const UNIT_SECONDS: [u64; 4] = [86_400, 3_600, 60, 1];

/// Parse a duration into whole seconds.
///
/// Units must appear in `d h m s` order; any subset is accepted and missing
/// units count as zero. Returns `None` when no unit is present.
#[must_use]
pub fn parse_duration(raw: &str) -> Option<u64> {
    let caps = DURATION_RE.as_ref()?.captures(raw)?;
    let mut total: u64 = 0;
    let mut matched = false;
    for (idx, unit) in UNIT_SECONDS.iter().enumerate() {
        if let Some(m) = caps.get(idx + 1) {
            matched = true;
            let amount: u64 = m.as_str().parse().ok()?;
            total = total.saturating_add(amount.saturating_mul(*unit));
        }
    }
    matched.then_some(total)
}

#[must_use]
pub fn looks_like_duration(raw: &str) -> bool {
    parse_duration(raw).is_some()
}

/// Canonical lowercase form, omitting zero units (`0s` for zero).
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let mut remaining = seconds;
    let mut parts = Vec::with_capacity(4);
    for (unit, label) in UNIT_SECONDS.iter().zip(["d", "h", "m", "s"]) {
        let amount = remaining / unit;
        remaining %= unit;
        if amount > 0 {
            parts.push(format!("{amount}{label}"));
        }
    }
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_duration() {
        assert_eq!(parse_duration("1d 13h 24m 51s"), Some(131_091));
        assert_eq!(parse_duration("7h 46m 6s"), Some(27_966));
    }

    #[test]
    fn unit_letters_are_case_insensitive() {
        assert_eq!(parse_duration("7H 46M 6S"), parse_duration("7h 46m 6s"));
        assert_eq!(parse_duration("7h46m6s"), Some(27_966));
    }

    #[test]
    fn subsets_default_missing_units() {
        assert_eq!(parse_duration("45m"), Some(2_700));
        assert_eq!(parse_duration("2d 5s"), Some(172_805));
    }

    #[test]
    fn rejects_non_durations() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("43.91T"), None);
        assert_eq!(parse_duration("6s 7h"), None);
        assert!(!looks_like_duration("1234"));
    }

    #[test]
    fn formats_canonically() {
        assert_eq!(format_duration(131_091), "1d 13h 24m 51s");
        assert_eq!(format_duration(3_605), "1h 5s");
        assert_eq!(format_duration(0), "0s");
    }
}
