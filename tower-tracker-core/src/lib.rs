//! Tower Tracker Core
//!
//! Platform-agnostic run statistics engine for The Tower tracker.
//! Parses pasted battle reports and delimited files into typed runs, flags
//! format mismatches and duplicates, computes statistics and encodes the
//! persisted run collection. Storage and display live behind small seams so
//! any front end can provide them.

pub mod dates;
pub mod duplicates;
pub mod duration;
pub mod encoding;
pub mod error;
pub mod export;
pub mod fields;
pub mod filters;
pub mod format_detect;
pub mod import;
pub mod locale;
pub mod numbers;
pub mod run;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use duplicates::{
    BatchDuplicateResult, CompositeKey, DuplicateCheck, DuplicatePair, DuplicateResolution,
    MergeOutcome, detect_batch_duplicates, detect_duplicate, generate_composite_key,
    generate_composite_keys_set, merge_import,
};
pub use duration::{format_duration, parse_duration};
pub use encoding::{decode_cell, encode_cell};
pub use error::{ImportError, StorageError};
pub use export::export_runs;
pub use fields::{FieldRegistry, KnownField, SourceGroup, normalize_field_name};
pub use filters::{RunFilter, SortDirection, SortKey, available_tiers, filter_runs, sort_runs};
pub use format_detect::{
    FormatMismatch, detect_date_format_from_value, detect_decimal_separator_from_value,
    detect_format_mismatch,
};
pub use import::{
    ClipboardImport, Delimiter, FieldMapping, ImportResult, RunParser, infer_run_type,
    parse_key_value_block,
};
pub use locale::{DisplayLocale, LocaleContext, NumberFormatter};
pub use numbers::{format_shorthand, parse_shorthand_number};
pub use run::{DataType, FieldValue, RunRecord, RunType, Value};
pub use settings::{
    DateFormat, DecimalSeparator, DisplaySettings, ImportFormatSettings, ThousandsSeparator,
};
pub use stats::{
    Discrepancy, DiscrepancyKind, PercentileSummary, Period, PeriodAggregate, SourceBreakdown,
    SourceShare, aggregate_by_period, calculate_discrepancy, percentile, per_hour,
    source_breakdown,
};
pub use storage::{KeyValueStore, MemoryStore, RunStore};
pub use store::{deserialize_runs, serialize_runs};
