//! Parallel TPC-H Query 5 engine
//!
//! Answers the local supplier volume query: for one region and an order
//! date interval, the net revenue each nation earned from orders where the
//! customer and the supplier are in that same nation. The join graph is
//! fixed; the large line item relation is scanned in parallel against hash
//! tables built from the five small relations.

pub mod config;
pub mod error;
pub mod execution;
pub mod output;
pub mod storage;
pub mod tpch;

// Re-export main types
pub use config::{ExecutionConfig, Partitioning, Query5Params, TableFormat};
pub use error::{QueryError, Result};
pub use execution::{ExecutionContext, NationRevenue, QueryResult};
pub use tpch::{TpchGenerator, TpchTables};
