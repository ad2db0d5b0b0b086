//! Parallel revenue aggregation over line items
//!
//! Implements the probe side of the Q5 join using a dedicated rayon pool:
//! - The line item relation is split into partitions (static ranges or
//!   morsels claimed from a shared queue)
//! - Each partition is scanned in index order into its own hash table
//! - Partial tables are handed back to the caller, tagged with their
//!   partition id, for a single-threaded merge
//!
//! Workers share only the read-only [`Q5Lookups`]; there is no lock on the
//! scan path.

use crate::config::{ExecutionConfig, Partitioning};
use crate::error::Result;
use crate::execution::filter::Q5Lookups;
use crate::execution::partition::{static_ranges, MorselQueue};
use crate::tpch::LineItem;
use hashbrown::HashMap;
use rayon::prelude::*;
use tracing::debug;

/// Revenue accumulated by one partition, keyed by nation name
#[derive(Debug, Clone, Default)]
pub struct PartialRevenue<'a> {
    /// Position of the partition in the line item relation
    pub partition: usize,
    pub totals: HashMap<&'a str, f64>,
    pub scanned: usize,
    pub matched: usize,
}

/// Resolve the nation a line item's revenue belongs to
///
/// `None` unless the order qualifies, the supplier qualifies and the
/// ordering customer lives in the supplier's nation.
#[inline]
pub fn qualifying_nation<'a>(lookups: &'a Q5Lookups, item: &LineItem) -> Option<&'a str> {
    let custkey = lookups.order_customers.get(&item.orderkey)?;
    let supplier_nation = lookups.supplier_nations.get(&item.suppkey)?;
    let customer_nation = lookups.customer_nations.get(custkey)?;

    if customer_nation != supplier_nation {
        return None;
    }
    lookups
        .nation_names
        .get(supplier_nation)
        .map(String::as_str)
}

/// Scan one partition in index order
pub fn aggregate_partition<'a>(
    partition: usize,
    items: &[LineItem],
    lookups: &'a Q5Lookups,
) -> PartialRevenue<'a> {
    let mut partial = PartialRevenue {
        partition,
        scanned: items.len(),
        ..Default::default()
    };

    for item in items {
        if let Some(nation) = qualifying_nation(lookups, item) {
            *partial.totals.entry(nation).or_insert(0.0) += item.revenue();
            partial.matched += 1;
        }
    }

    partial
}

/// Aggregate all line items on `config.threads()` workers
///
/// Returns one partial per partition. Their order is unspecified; the merge
/// step orders them by partition id.
pub fn aggregate_revenue<'a>(
    lineitems: &[LineItem],
    lookups: &'a Q5Lookups,
    config: &ExecutionConfig,
) -> Result<Vec<PartialRevenue<'a>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads())
        .thread_name(|i| format!("q5-worker-{}", i))
        .build()?;

    let partials = match config.partitioning() {
        Partitioning::Static => {
            let ranges = static_ranges(lineitems.len(), config.threads());
            debug!(
                partitions = ranges.len(),
                rows = lineitems.len(),
                "static partitioning"
            );

            pool.install(|| {
                ranges
                    .into_par_iter()
                    .enumerate()
                    .map(|(id, range)| aggregate_partition(id, &lineitems[range], lookups))
                    .collect::<Vec<_>>()
            })
        }
        Partitioning::Morsel { morsel_size } => {
            let queue = MorselQueue::new(lineitems.len(), morsel_size);
            debug!(
                morsels = queue.len(),
                morsel_size,
                rows = lineitems.len(),
                "morsel partitioning"
            );

            if queue.is_empty() {
                return Ok(Vec::new());
            }

            // Each worker drains the shared queue into its own list
            let per_worker: Vec<Vec<PartialRevenue<'a>>> = pool.install(|| {
                (0..config.threads())
                    .into_par_iter()
                    .map(|_worker| {
                        let mut done = Vec::new();
                        while let Some((id, range)) = queue.next_morsel() {
                            done.push(aggregate_partition(id, &lineitems[range], lookups));
                        }
                        done
                    })
                    .collect()
            });
            per_worker.into_iter().flatten().collect()
        }
    };

    for partial in &partials {
        debug!(
            partition = partial.partition,
            scanned = partial.scanned,
            matched = partial.matched,
            "partition done"
        );
    }

    Ok(partials)
}
