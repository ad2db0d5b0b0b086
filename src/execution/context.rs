//! Execution context - main entry point for running Q5

use crate::config::{ExecutionConfig, Query5Params, TableFormat};
use crate::error::Result;
use crate::execution::aggregate::aggregate_revenue;
use crate::execution::filter::{FilterStats, Q5Lookups};
use crate::execution::merge::{merge_partials, rank, NationRevenue};
use crate::output::{self, OutputFormat, OutputFormatter};
use crate::storage;
use crate::tpch::TpchTables;
use arrow::record_batch::RecordBatch;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Query execution result
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Nations ranked by revenue, highest first
    pub rows: Vec<NationRevenue>,
    /// Execution metrics
    pub metrics: QueryMetrics,
    /// Cardinalities seen along the way
    pub stats: ExecutionStats,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Result as an Arrow batch (`n_name`, `revenue`)
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        output::result_batch(&self.rows)
    }
}

/// Query execution metrics
#[derive(Debug, Clone, Default)]
pub struct QueryMetrics {
    /// Time spent reading tables (zero when tables were registered)
    pub load_time: Duration,
    /// Time spent building lookup tables
    pub filter_time: Duration,
    /// Time spent in the parallel scan
    pub aggregate_time: Duration,
    /// Time spent merging and ranking
    pub merge_time: Duration,
    /// Total time
    pub total_time: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub filter: FilterStats,
    /// Number of partitions (or morsels) scanned
    pub partitions: usize,
    pub lineitems_scanned: usize,
    pub lineitems_matched: usize,
}

/// Execution context - owns the row store and runs the query against it
pub struct ExecutionContext {
    tables: TpchTables,
    config: ExecutionConfig,
    load_time: Duration,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            tables: TpchTables::default(),
            config: ExecutionConfig::from_available_parallelism(),
            load_time: Duration::ZERO,
        }
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Register in-memory tables, replacing any previous ones
    pub fn register_tables(&mut self, tables: TpchTables) {
        self.tables = tables;
        self.load_time = Duration::ZERO;
    }

    /// Read the six relations from `dir`
    pub fn load_tables(&mut self, dir: impl AsRef<Path>, format: TableFormat) -> Result<()> {
        let start = Instant::now();
        self.tables = storage::load_tables(dir.as_ref(), format)?;
        self.load_time = start.elapsed();
        Ok(())
    }

    pub fn tables(&self) -> &TpchTables {
        &self.tables
    }

    /// Run the local supplier volume query
    pub fn query5(&self, params: &Query5Params) -> Result<QueryResult> {
        let start = Instant::now();

        let lookups = Q5Lookups::build(&self.tables, params);
        let filter_time = start.elapsed();
        if lookups.is_empty() {
            debug!(region = %params.region_name, "no order or supplier qualifies");
        }

        let aggregate_start = Instant::now();
        let partials = aggregate_revenue(&self.tables.lineitem, &lookups, &self.config)?;
        let aggregate_time = aggregate_start.elapsed();

        let stats = ExecutionStats {
            filter: lookups.stats(),
            partitions: partials.len(),
            lineitems_scanned: partials.iter().map(|p| p.scanned).sum(),
            lineitems_matched: partials.iter().map(|p| p.matched).sum(),
        };

        let merge_start = Instant::now();
        let rows = rank(merge_partials(partials));
        let merge_time = merge_start.elapsed();

        let metrics = QueryMetrics {
            load_time: self.load_time,
            filter_time,
            aggregate_time,
            merge_time,
            total_time: self.load_time + start.elapsed(),
        };

        info!(
            threads = self.config.threads(),
            partitioning = %self.config.partitioning(),
            scanned = stats.lineitems_scanned,
            matched = stats.lineitems_matched,
            nations = rows.len(),
            filter = ?metrics.filter_time,
            aggregate = ?metrics.aggregate_time,
            merge = ?metrics.merge_time,
            "query finished"
        );

        Ok(QueryResult {
            rows,
            metrics,
            stats,
        })
    }
}

/// Print timings and the ranked rows as a table on stdout
pub fn print_results(result: &QueryResult) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "Row count: {}", result.row_count())?;
    writeln!(
        out,
        "Timing: load={:?}, filter={:?}, aggregate={:?}, merge={:?}, total={:?}",
        result.metrics.load_time,
        result.metrics.filter_time,
        result.metrics.aggregate_time,
        result.metrics.merge_time,
        result.metrics.total_time
    )?;
    writeln!(out)?;

    OutputFormatter::new(OutputFormat::Table).write(&mut out, &result.rows)
}
