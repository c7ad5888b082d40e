//! Locale-aware display formatting.
//!
//! [`LocaleContext`] is owned by the caller and passed to whatever renders
//! numbers and dates. Its number formatter is built on first use and reused
//! until [`LocaleContext::set_locale`] switches to a different locale.
use chrono::NaiveDateTime;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numbers::format_shorthand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLocale {
    #[default]
    En,
    De,
    Fr,
}

impl DisplayLocale {
    pub const ALL: [DisplayLocale; 3] = [DisplayLocale::En, DisplayLocale::De, DisplayLocale::Fr];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            DisplayLocale::En => "en",
            DisplayLocale::De => "de",
            DisplayLocale::Fr => "fr",
        }
    }

    /// Native language name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DisplayLocale::En => "English",
            DisplayLocale::De => "Deutsch",
            DisplayLocale::Fr => "Français",
        }
    }
}

impl fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        DisplayLocale::ALL
            .into_iter()
            .find(|l| l.code() == primary)
            .ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

/// Separator rules for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormatter {
    pub group_separator: char,
    pub decimal_separator: char,
}

impl NumberFormatter {
    #[must_use]
    pub const fn for_locale(locale: DisplayLocale) -> Self {
        match locale {
            DisplayLocale::En => Self {
                group_separator: ',',
                decimal_separator: '.',
            },
            DisplayLocale::De => Self {
                group_separator: '.',
                decimal_separator: ',',
            },
            DisplayLocale::Fr => Self {
                group_separator: '\u{202f}',
                decimal_separator: ',',
            },
        }
    }

    /// Group the integer part and localize the decimal point of a
    /// `.`-decimal number string.
    fn localize(&self, plain: &str) -> String {
        let (sign, digits) = plain
            .strip_prefix('-')
            .map_or(("", plain), |rest| ("-", rest));
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 1);
        out.push_str(sign);
        let len = int_part.chars().count();
        for (idx, c) in int_part.chars().enumerate() {
            if idx > 0 && (len - idx) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(c);
        }
        if !frac_part.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }

    /// Format with up to `max_fraction_digits`, dropping trailing zeros.
    #[must_use]
    pub fn format(&self, value: f64, max_fraction_digits: usize) -> String {
        if !value.is_finite() {
            return "0".to_string();
        }
        let fixed = format!("{value:.max_fraction_digits$}");
        let trimmed = if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.')
        } else {
            fixed.as_str()
        };
        let trimmed = if trimmed == "-0" { "0" } else { trimmed };
        self.localize(trimmed)
    }
}

/// Display locale plus its cached formatter
#[derive(Debug, Default)]
pub struct LocaleContext {
    locale: DisplayLocale,
    formatter: OnceCell<NumberFormatter>,
    generation: u64,
}

impl LocaleContext {
    #[must_use]
    pub fn new(locale: DisplayLocale) -> Self {
        Self {
            locale,
            formatter: OnceCell::new(),
            generation: 0,
        }
    }

    #[must_use]
    pub const fn locale(&self) -> DisplayLocale {
        self.locale
    }

    /// Number of locale changes applied so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.formatter.get().is_some()
    }

    /// Switch locale, dropping the cached formatter. Returns whether the
    /// locale actually changed.
    pub fn set_locale(&mut self, locale: DisplayLocale) -> bool {
        if locale == self.locale {
            return false;
        }
        log::debug!("display locale changed {} -> {}", self.locale, locale);
        self.locale = locale;
        self.formatter.take();
        self.generation += 1;
        true
    }

    #[must_use]
    pub fn formatter(&self) -> &NumberFormatter {
        self.formatter
            .get_or_init(|| NumberFormatter::for_locale(self.locale))
    }

    #[must_use]
    pub fn format_number(&self, value: f64, max_fraction_digits: usize) -> String {
        self.formatter().format(value, max_fraction_digits)
    }

    /// Shorthand (`43.91T`) with the locale's decimal separator.
    #[must_use]
    pub fn format_shorthand(&self, value: f64) -> String {
        let decimal = self.formatter().decimal_separator;
        format_shorthand(value).replace('.', &decimal.to_string())
    }

    #[must_use]
    pub fn format_percentage(&self, percent: f64) -> String {
        let number = self.format_number(percent, 2);
        match self.locale {
            DisplayLocale::En => format!("{number}%"),
            DisplayLocale::De | DisplayLocale::Fr => format!("{number}\u{a0}%"),
        }
    }

    #[must_use]
    pub fn format_date(&self, timestamp: &NaiveDateTime) -> String {
        let pattern = match self.locale {
            DisplayLocale::En => "%b %-d, %Y",
            DisplayLocale::De => "%d.%m.%Y",
            DisplayLocale::Fr => "%d/%m/%Y",
        };
        timestamp.format(pattern).to_string()
    }
}
