use std::path::PathBuf;

use thiserror::Error;

use super::type_lib::NumericData;

#[derive(Debug, Error)]
pub enum ComparatorError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path} contains no data rows")]
    EmptyTable { path: PathBuf },

    /// The file has fewer columns than the schema references.
    #[error("schema mismatch in {path}: expected at least {expected} columns, found {found}")]
    SchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("no files matching '{pattern}' in {run_dir}")]
    NoSliceFiles { run_dir: PathBuf, pattern: String },

    #[error("invalid value in {path} at row {row}: {message}")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        message: String,
    },

    #[error("run '{run}' has non-positive value {value} at sample {index}, cannot use a log axis")]
    NonPositiveValue {
        run: String,
        index: usize,
        value: NumericData,
    },

    #[error("run '{run}' has non-finite value {value} at sample {index}")]
    NonFiniteValue {
        run: String,
        index: usize,
        value: NumericData,
    },

    #[error("no x-axis bound configured for problem '{0}'")]
    UnknownProblem(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("plotting error: {0}")]
    Plot(String),
}

impl ComparatorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComparatorError::Io { path: path.into(), source }
    }

    pub fn plot<E: std::fmt::Display>(err: E) -> Self {
        ComparatorError::Plot(err.to_string())
    }
}

pub type ComparatorResult<T> = Result<T, ComparatorError>;
