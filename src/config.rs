//! Query parameters and execution settings
//!
//! Everything here is validated up front so that a bad parameter fails the
//! run before any table is touched.

use crate::error::{QueryError, Result};
use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Canonical, fixed-width date layout used for every date in the dataset
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default morsel size (number of line items per morsel)
pub const DEFAULT_MORSEL_SIZE: usize = 16 * 1024;

/// Substitution parameters of the local supplier volume query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query5Params {
    /// Exact region name to match (e.g. "ASIA")
    pub region_name: String,
    /// Inclusive lower bound of the order date interval
    pub start_date: String,
    /// Exclusive upper bound of the order date interval
    pub end_date: String,
}

impl Default for Query5Params {
    /// The TPC-H validation parameters: ASIA, 1994
    fn default() -> Self {
        Self {
            region_name: "ASIA".to_string(),
            start_date: "1994-01-01".to_string(),
            end_date: "1995-01-01".to_string(),
        }
    }
}

impl Query5Params {
    pub fn try_new(
        region_name: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Result<Self> {
        let region_name = region_name.into();
        let start_date = start_date.into();
        let end_date = end_date.into();

        if region_name.is_empty() {
            return Err(QueryError::Config("region name must not be empty".to_string()));
        }
        validate_date("start_date", &start_date)?;
        validate_date("end_date", &end_date)?;

        if start_date >= end_date {
            warn!(
                start_date = %start_date,
                end_date = %end_date,
                "date interval is empty, no order can qualify"
            );
        }

        Ok(Self {
            region_name,
            start_date,
            end_date,
        })
    }

    /// Half-open interval test on canonical date strings
    #[inline]
    pub fn contains_date(&self, date: &str) -> bool {
        date >= self.start_date.as_str() && date < self.end_date.as_str()
    }
}

/// Dates are compared as strings, so only the zero-padded form is accepted
fn validate_date(name: &str, value: &str) -> Result<()> {
    let parsed = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        QueryError::Config(format!("{} '{}' is not a valid date: {}", name, value, e))
    })?;

    if parsed.format(DATE_FORMAT).to_string() != value {
        return Err(QueryError::Config(format!(
            "{} '{}' must be written as YYYY-MM-DD",
            name, value
        )));
    }
    Ok(())
}

/// How the line item relation is divided among workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partitioning {
    /// One contiguous range per worker, remainder in the last range
    #[default]
    Static,
    /// Fixed-size morsels pulled from a shared cursor
    Morsel { morsel_size: usize },
}

impl fmt::Display for Partitioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partitioning::Static => write!(f, "static"),
            Partitioning::Morsel { morsel_size } => write!(f, "morsel({})", morsel_size),
        }
    }
}

/// Settings for the parallel phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    threads: usize,
    partitioning: Partitioning,
}

impl ExecutionConfig {
    pub fn try_new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(QueryError::Config(
                "thread count must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            threads,
            partitioning: Partitioning::Static,
        })
    }

    /// Use the machine's available parallelism
    pub fn from_available_parallelism() -> Self {
        Self {
            threads: rayon::current_num_threads().max(1),
            partitioning: Partitioning::Static,
        }
    }

    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Result<Self> {
        if let Partitioning::Morsel { morsel_size: 0 } = partitioning {
            return Err(QueryError::Config(
                "morsel size must be a positive integer".to_string(),
            ));
        }
        self.partitioning = partitioning;
        Ok(self)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn partitioning(&self) -> Partitioning {
        self.partitioning
    }
}

/// On-disk layout of the six relations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    /// `|`-delimited text as produced by dbgen
    #[default]
    Tbl,
    Parquet,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Tbl => "tbl",
            TableFormat::Parquet => "parquet",
        }
    }

    /// Location of `table` under `dir`
    pub fn table_path(&self, dir: &Path, table: &str) -> PathBuf {
        dir.join(format!("{}.{}", table, self.extension()))
    }
}
