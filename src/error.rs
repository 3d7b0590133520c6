//! Error types for every stage of the cell data pipeline.
//!
//! The library never panics on bad input: shape problems in raw tables or
//! metadata, failed remote lookups, and normalization inconsistencies all
//! surface as one of the enums below. Binaries wrap these in `anyhow` at the
//! edges.

use thiserror::Error;

/// Failures while parsing a tab-delimited raw data file into a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to parse tab-delimited data: {0}")]
    Csv(#[from] csv::Error),

    /// Column names must be unique once cleaned; duplicates would make
    /// lookups by name ambiguous.
    #[error("duplicate column '{name}' after header cleanup")]
    DuplicateColumn { name: String },

    #[error("no data rows remain after dropping fully-empty rows")]
    Empty,
}

/// Shape failures in a metadata partition (one spreadsheet tab).
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("partition '{partition}' is empty or missing headers")]
    EmptyPartition { partition: String },

    #[error(
        "partition '{partition}' is missing required header(s) {missing:?}; found: {found:?}"
    )]
    MissingHeaders {
        partition: String,
        missing: Vec<String>,
        found: Vec<String>,
    },
}

/// Pre-normalization checks on a raw table / metadata record pair.
///
/// Validation is fail-fast: the first failing check aborts the whole
/// operation for that cell.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing column '{column}' in raw data; available: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("non-numeric value '{value}' in column '{column}' at row {row}")]
    NonNumericData {
        column: String,
        row: usize,
        value: String,
    },

    #[error("missing field '{field}' in metadata")]
    MissingField { field: String },

    #[error("mass value '{value}' for field '{field}' is not numeric")]
    NonNumericMass { field: String, value: String },

    #[error("mass must be greater than 0 mg to normalize capacity, got {value}")]
    NonPositiveMass { field: String, value: f64 },
}

/// Post-coercion consistency failure while computing normalized capacity.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid capacity '{value}' at row {row}: {reason}")]
    InvalidCapacity {
        row: usize,
        value: String,
        reason: String,
    },
}

/// Failures raised by the remote collaborators (Drive, Sheets) or their
/// in-memory stand-ins. Transport details stay typed so batch callers never
/// see a bare client exception.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cell '{id}' not found")]
    NotFound { id: String },

    #[error("metadata partition '{partition}' not found")]
    PartitionNotFound { partition: String },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Per-cell outcome error: which pipeline stage failed and why.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Normalization(#[from] NormalizeError),
}
