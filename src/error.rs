//! Error types for the query engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for query engine operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Main error type for the query engine
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read table {}: {source}", path.display())]
    TableAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {table}.{column} at line {line}")]
    InvalidField {
        table: &'static str,
        column: &'static str,
        line: u64,
        value: String,
    },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Null value in required column: {0}")]
    NullValue(String),

    #[error("Cannot write result to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl From<rayon::ThreadPoolBuildError> for QueryError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        QueryError::Execution(format!("failed to build worker pool: {}", e))
    }
}
