use thiserror::Error;

/// Failures inside the delimited import path.
///
/// Public import functions fold these into an [`crate::import::ImportResult`]
/// rather than returning them.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No data provided")]
    Empty,
    #[error("No header row found")]
    MissingHeader,
    #[error("No data rows found")]
    NoRows,
    #[error("None of the {0} data rows could be parsed")]
    NoUsableRows(usize),
    #[error("Unsupported delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(String),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("Could not finish writing export: {0}")]
    Export(String),
}

/// Failures talking to the key-value store backing the run collection
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("stored settings under {key} are corrupt: {source}")]
    CorruptSettings {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored runs could not be read: {0}")]
    CorruptRuns(String),
}
