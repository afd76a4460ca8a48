//! Pipeline error taxonomy.
//!
//! Every pipeline stage returns these typed errors to its immediate caller;
//! nothing is logged-and-swallowed or retried inside the pipeline itself.
//! An empty result set (e.g. a filter that excludes every row) is not an
//! error; renderers handle empty tables by showing "no data".

use thiserror::Error;

/// Errors raised by the data preparation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The sales data source is absent or unreadable. Fatal to the run;
    /// retrying without operator intervention cannot succeed.
    #[error("cannot read sales data from '{path}'")]
    Ingestion {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The source header lacks a column the schema requires.
    #[error("sales data at '{path}' is missing required column '{column}'")]
    MissingColumn { path: String, column: &'static str },

    /// A structurally invalid record, e.g. a ragged field count. The csv
    /// position is preserved for diagnosis.
    #[error("malformed record in '{path}': {source}")]
    Malformed {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A surviving row's numeric field is not a non-negative whole number.
    /// `row` is the 1-based data row in the raw source (header excluded).
    #[error("row {row}: cannot coerce {field} value '{value}' to a whole number")]
    TypeCoercion {
        row: usize,
        field: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
