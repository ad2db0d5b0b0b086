//! Query execution module
//!
//! Data flows strictly downstream: the filter stage builds lookup tables,
//! the aggregator probes them in parallel, and the merge step folds and
//! ranks the partial results.

pub mod aggregate;
mod context;
pub mod filter;
pub mod merge;
pub mod partition;

pub use aggregate::{aggregate_partition, aggregate_revenue, qualifying_nation, PartialRevenue};
pub use context::*;
pub use filter::{FilterStats, Q5Lookups};
pub use merge::{merge_partials, rank, NationRevenue};
