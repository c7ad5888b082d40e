//! Run records and the typed field bag attached to each run.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of session a run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    /// Regular coin/cell farming run
    #[default]
    Farm,
    /// Tournament bracket run (tier exported with a trailing `+`)
    Tournament,
    /// Milestone push
    Milestone,
}

impl RunType {
    pub const ALL: [RunType; 3] = [RunType::Farm, RunType::Tournament, RunType::Milestone];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RunType::Farm => "farm",
            RunType::Tournament => "tournament",
            RunType::Milestone => "milestone",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farm" => Ok(RunType::Farm),
            "tournament" => Ok(RunType::Tournament),
            "milestone" => Ok(RunType::Milestone),
            _ => Err(()),
        }
    }
}

/// How a field's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Number,
    String,
    Date,
    /// Whole seconds stored as a number
    Duration,
}

/// Semantic value of a parsed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl Value {
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One parsed data point within a run.
///
/// `value` and `display_value` are derived from `raw_value` using the import
/// settings active when the field was parsed. Instances are never edited in
/// place; an edit replaces the whole `FieldValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Value,
    pub raw_value: String,
    pub display_value: String,
    pub original_key: String,
    pub data_type: DataType,
}

impl FieldValue {
    /// Plain text field whose raw, display and semantic values coincide.
    #[must_use]
    pub fn text(original_key: &str, text: &str) -> Self {
        Self {
            value: Value::Text(text.to_string()),
            raw_value: text.to_string(),
            display_value: text.to_string(),
            original_key: original_key.to_string(),
            data_type: DataType::String,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        self.value.as_number()
    }
}

/// One play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub tier: u32,
    pub wave: u32,
    pub coins_earned: f64,
    pub cells_earned: f64,
    /// Elapsed real-world duration in whole seconds
    pub real_time: u64,
    pub run_type: RunType,
    pub fields: BTreeMap<String, FieldValue>,
}

impl RunRecord {
    /// Fresh random identifier for a newly imported run.
    #[must_use]
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Numeric value of a field, if present and numeric.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(FieldValue::as_number)
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.fields.get("_notes").and_then(|f| f.value.as_text())
    }

    #[must_use]
    pub fn rank(&self) -> Option<&str> {
        self.fields.get("_rank").map(|f| f.raw_value.as_str())
    }

    /// Copy of this run with `key` replaced by `value`.
    #[must_use]
    pub fn with_field(&self, key: &str, value: FieldValue) -> Self {
        let mut next = self.clone();
        next.fields.insert(key.to_string(), value);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_type_parses_case_insensitively() {
        assert_eq!("Tournament".parse::<RunType>(), Ok(RunType::Tournament));
        assert_eq!(" MILESTONE ".parse::<RunType>(), Ok(RunType::Milestone));
        assert!("weekly".parse::<RunType>().is_err());
        assert_eq!(RunType::Farm.to_string(), "farm");
    }

    #[test]
    fn with_field_leaves_original_untouched() {
        let run = RunRecord {
            id: "a".into(),
            timestamp: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            tier: 1,
            wave: 10,
            coins_earned: 0.0,
            cells_earned: 0.0,
            real_time: 0,
            run_type: RunType::Farm,
            fields: BTreeMap::new(),
        };
        let edited = run.with_field("_notes", FieldValue::text("_notes", "great run"));
        assert!(run.notes().is_none());
        assert_eq!(edited.notes(), Some("great run"));
    }
}
