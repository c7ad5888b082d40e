//! Import and display configuration persisted alongside the run store.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::locale::DisplayLocale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecimalSeparator {
    #[default]
    Period,
    Comma,
}

impl DecimalSeparator {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            DecimalSeparator::Period => '.',
            DecimalSeparator::Comma => ',',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(DecimalSeparator::Period),
            ',' => Some(DecimalSeparator::Comma),
            _ => None,
        }
    }
}

impl fmt::Display for DecimalSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThousandsSeparator {
    #[default]
    Comma,
    Period,
    Space,
    None,
}

impl ThousandsSeparator {
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self {
            ThousandsSeparator::Comma => Some(','),
            ThousandsSeparator::Period => Some('.'),
            ThousandsSeparator::Space => Some(' '),
            ThousandsSeparator::None => None,
        }
    }
}

/// Shape of battle dates in incoming text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// `Nov 20, 2025 14:35`
    #[default]
    MonthFirst,
    /// `nov. 20, 2025 14:35`
    MonthFirstLowercase,
}

impl DateFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DateFormat::MonthFirst => "month-first",
            DateFormat::MonthFirstLowercase => "month-first-lowercase",
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month-first" => Ok(DateFormat::MonthFirst),
            "month-first-lowercase" => Ok(DateFormat::MonthFirstLowercase),
            other => Err(format!("unknown date format: {other}")),
        }
    }
}

/// Describes how incoming run text is formatted.
///
/// Read before every parse; changing it never re-parses stored runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFormatSettings {
    pub decimal_separator: DecimalSeparator,
    pub thousands_separator: ThousandsSeparator,
    pub date_format: DateFormat,
}

impl ImportFormatSettings {
    /// Fixed format used for the persisted run store.
    #[must_use]
    pub const fn canonical() -> Self {
        Self {
            decimal_separator: DecimalSeparator::Period,
            thousands_separator: ThousandsSeparator::None,
            date_format: DateFormat::MonthFirst,
        }
    }

    /// Comma-decimal European layout (`43,91T`, `1.234,5`).
    #[must_use]
    pub const fn european() -> Self {
        Self {
            decimal_separator: DecimalSeparator::Comma,
            thousands_separator: ThousandsSeparator::Period,
            date_format: DateFormat::MonthFirstLowercase,
        }
    }
}

/// Presentation preferences for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    #[serde(default)]
    pub locale: DisplayLocale,
    #[serde(default = "default_use_shorthand")]
    pub use_shorthand: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            locale: DisplayLocale::default(),
            use_shorthand: default_use_shorthand(),
        }
    }
}

const fn default_use_shorthand() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let json = serde_json::to_string(&ImportFormatSettings::european()).unwrap();
        assert_eq!(
            json,
            r#"{"decimalSeparator":"comma","thousandsSeparator":"period","dateFormat":"month-first-lowercase"}"#
        );
        let back: ImportFormatSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ImportFormatSettings::european());
    }

    #[test]
    fn display_settings_fill_missing_shorthand_flag() {
        let parsed: DisplaySettings = serde_json::from_str(r#"{"locale":"de"}"#).unwrap();
        assert!(parsed.use_shorthand);
        assert_eq!(parsed.locale, DisplayLocale::De);
    }
}
