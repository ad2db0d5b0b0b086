//! Merge of partial aggregates and final ranking

use crate::execution::aggregate::PartialRevenue;
use hashbrown::HashMap;
use std::cmp::Ordering;

/// One output row: a nation and its net revenue
#[derive(Debug, Clone, PartialEq)]
pub struct NationRevenue {
    pub nation: String,
    pub revenue: f64,
}

/// Fold partials into one table, in ascending partition order
///
/// For a given partitioning the floating point additions per nation always
/// happen in the same order, so the sums are reproducible run to run.
pub fn merge_partials<'a>(mut partials: Vec<PartialRevenue<'a>>) -> HashMap<&'a str, f64> {
    partials.sort_by_key(|p| p.partition);

    let mut totals: HashMap<&'a str, f64> = HashMap::new();
    for partial in &partials {
        for (&nation, &revenue) in &partial.totals {
            *totals.entry(nation).or_insert(0.0) += revenue;
        }
    }
    totals
}

/// Revenue descending, ties by nation name ascending
pub fn rank(totals: HashMap<&str, f64>) -> Vec<NationRevenue> {
    let mut rows: Vec<NationRevenue> = totals
        .into_iter()
        .map(|(nation, revenue)| NationRevenue {
            nation: nation.to_string(),
            revenue,
        })
        .collect();
    rows.sort_by(compare_rows);
    rows
}

fn compare_rows(a: &NationRevenue, b: &NationRevenue) -> Ordering {
    b.revenue
        .total_cmp(&a.revenue)
        .then_with(|| a.nation.cmp(&b.nation))
}
