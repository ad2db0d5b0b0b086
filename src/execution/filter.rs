//! Filter stage and join planning
//!
//! Narrows the five small relations down to the hash tables the parallel
//! phase probes: region → nation → {customer, supplier} → orders. Every
//! step is a single pass building an independent table; nothing here is
//! mutated after [`Q5Lookups::build`] returns.

use crate::config::Query5Params;
use crate::tpch::{Customer, Nation, Order, Region, Supplier, TpchTables};
use hashbrown::{HashMap, HashSet};
use tracing::info;

/// Build-side tables shared read-only by all aggregation workers
#[derive(Debug, Clone, Default)]
pub struct Q5Lookups {
    /// Keys of regions whose name matched
    pub region_keys: HashSet<i64>,
    /// Nation key -> nation name, nations inside a qualifying region
    pub nation_names: HashMap<i64, String>,
    /// Customer key -> nation key, customers of a qualifying nation
    pub customer_nations: HashMap<i64, i64>,
    /// Supplier key -> nation key, suppliers of a qualifying nation
    pub supplier_nations: HashMap<i64, i64>,
    /// Order key -> customer key, qualifying customer and date in range
    pub order_customers: HashMap<i64, i64>,
}

/// Cardinalities of the lookup tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub regions: usize,
    pub nations: usize,
    pub customers: usize,
    pub suppliers: usize,
    pub orders: usize,
}

impl Q5Lookups {
    pub fn build(tables: &TpchTables, params: &Query5Params) -> Self {
        let region_keys = filter_regions(&tables.region, &params.region_name);
        let nation_names = filter_nations(&tables.nation, &region_keys);
        let customer_nations = filter_customers(&tables.customer, &nation_names);
        let supplier_nations = filter_suppliers(&tables.supplier, &nation_names);
        let order_customers = filter_orders(&tables.orders, params, &customer_nations);

        let lookups = Self {
            region_keys,
            nation_names,
            customer_nations,
            supplier_nations,
            order_customers,
        };

        let stats = lookups.stats();
        info!(
            region = %params.region_name,
            regions = stats.regions,
            nations = stats.nations,
            customers = stats.customers,
            suppliers = stats.suppliers,
            orders = stats.orders,
            "built lookup tables"
        );
        lookups
    }

    pub fn stats(&self) -> FilterStats {
        FilterStats {
            regions: self.region_keys.len(),
            nations: self.nation_names.len(),
            customers: self.customer_nations.len(),
            suppliers: self.supplier_nations.len(),
            orders: self.order_customers.len(),
        }
    }

    /// No line item can qualify without a qualifying order and supplier
    pub fn is_empty(&self) -> bool {
        self.order_customers.is_empty() || self.supplier_nations.is_empty()
    }
}

/// Region names are matched exactly; any number of regions may match
pub fn filter_regions(regions: &[Region], name: &str) -> HashSet<i64> {
    regions
        .iter()
        .filter(|r| r.name == name)
        .map(|r| r.regionkey)
        .collect()
}

pub fn filter_nations(nations: &[Nation], region_keys: &HashSet<i64>) -> HashMap<i64, String> {
    nations
        .iter()
        .filter(|n| region_keys.contains(&n.regionkey))
        .map(|n| (n.nationkey, n.name.clone()))
        .collect()
}

pub fn filter_customers(
    customers: &[Customer],
    nation_names: &HashMap<i64, String>,
) -> HashMap<i64, i64> {
    customers
        .iter()
        .filter(|c| nation_names.contains_key(&c.nationkey))
        .map(|c| (c.custkey, c.nationkey))
        .collect()
}

pub fn filter_suppliers(
    suppliers: &[Supplier],
    nation_names: &HashMap<i64, String>,
) -> HashMap<i64, i64> {
    suppliers
        .iter()
        .filter(|s| nation_names.contains_key(&s.nationkey))
        .map(|s| (s.suppkey, s.nationkey))
        .collect()
}

/// Orders dated in `[start_date, end_date)` placed by a qualifying customer
pub fn filter_orders(
    orders: &[Order],
    params: &Query5Params,
    customer_nations: &HashMap<i64, i64>,
) -> HashMap<i64, i64> {
    orders
        .iter()
        .filter(|o| params.contains_date(&o.orderdate))
        .filter(|o| customer_nations.contains_key(&o.custkey))
        .map(|o| (o.orderkey, o.custkey))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(region: &str) -> Query5Params {
        Query5Params::try_new(region, "1995-01-01", "1996-01-01").unwrap()
    }

    fn nation(nationkey: i64, name: &str, regionkey: i64) -> Nation {
        Nation {
            nationkey,
            name: name.to_string(),
            regionkey,
        }
    }

    fn order(orderkey: i64, custkey: i64, date: &str) -> Order {
        Order {
            orderkey,
            custkey,
            orderdate: date.to_string(),
        }
    }

    #[test]
    fn test_region_filter_tolerates_duplicates() {
        let regions = vec![
            Region {
                regionkey: 2,
                name: "ASIA".to_string(),
            },
            Region {
                regionkey: 3,
                name: "EUROPE".to_string(),
            },
            Region {
                regionkey: 7,
                name: "ASIA".to_string(),
            },
        ];

        let keys = filter_regions(&regions, "ASIA");
        assert_eq!(keys, HashSet::from([2, 7]));

        assert!(filter_regions(&regions, "asia").is_empty());
        assert!(filter_regions(&regions, "ATLANTIS").is_empty());
    }

    #[test]
    fn test_nation_customer_supplier_chain() {
        let nations = vec![
            nation(9, "INDONESIA", 2),
            nation(18, "CHINA", 2),
            nation(6, "FRANCE", 3),
        ];
        let names = filter_nations(&nations, &HashSet::from([2]));
        assert_eq!(names.len(), 2);
        assert_eq!(names[&9], "INDONESIA");
        assert!(!names.contains_key(&6));

        let customers = vec![
            Customer {
                custkey: 100,
                nationkey: 9,
            },
            Customer {
                custkey: 101,
                nationkey: 6,
            },
        ];
        let customer_nations = filter_customers(&customers, &names);
        assert_eq!(customer_nations, HashMap::from([(100, 9)]));

        let suppliers = vec![
            Supplier {
                suppkey: 200,
                nationkey: 18,
            },
            Supplier {
                suppkey: 201,
                nationkey: 24,
            },
        ];
        let supplier_nations = filter_suppliers(&suppliers, &names);
        assert_eq!(supplier_nations, HashMap::from([(200, 18)]));
    }

    #[test]
    fn test_order_date_boundaries() {
        let customer_nations = HashMap::from([(100, 9)]);
        let orders = vec![
            order(1, 100, "1995-01-01"),
            order(2, 100, "1995-12-31"),
            order(3, 100, "1996-01-01"),
            order(4, 100, "1994-12-31"),
            order(5, 999, "1995-06-01"),
        ];

        let qualifying = filter_orders(&orders, &params("ASIA"), &customer_nations);
        assert_eq!(qualifying, HashMap::from([(1, 100), (2, 100)]));
    }

    #[test]
    fn test_lookups_never_leave_the_region() {
        let tables = TpchTables {
            region: vec![
                Region {
                    regionkey: 2,
                    name: "ASIA".to_string(),
                },
                Region {
                    regionkey: 3,
                    name: "EUROPE".to_string(),
                },
            ],
            nation: vec![nation(9, "INDONESIA", 2), nation(6, "FRANCE", 3)],
            customer: vec![
                Customer {
                    custkey: 1,
                    nationkey: 9,
                },
                Customer {
                    custkey: 2,
                    nationkey: 6,
                },
            ],
            supplier: vec![
                Supplier {
                    suppkey: 1,
                    nationkey: 6,
                },
                Supplier {
                    suppkey: 2,
                    nationkey: 9,
                },
            ],
            orders: vec![order(10, 1, "1995-03-01"), order(11, 2, "1995-03-01")],
            lineitem: vec![],
        };

        let lookups = Q5Lookups::build(&tables, &params("ASIA"));
        for nationkey in lookups
            .customer_nations
            .values()
            .chain(lookups.supplier_nations.values())
        {
            assert!(lookups.nation_names.contains_key(nationkey));
        }
        assert_eq!(
            lookups.stats(),
            FilterStats {
                regions: 1,
                nations: 1,
                customers: 1,
                suppliers: 1,
                orders: 1,
            }
        );
        assert!(!lookups.is_empty());

        let none = Q5Lookups::build(&tables, &params("ATLANTIS"));
        assert!(none.is_empty());
        assert_eq!(none.stats(), FilterStats::default());
    }
}
