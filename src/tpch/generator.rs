//! TPC-H data generator
//!
//! Produces a small, deterministic dataset with the real region/nation
//! dimension and random customers, suppliers, orders and line items sized
//! by scale factor. It is not dbgen: value distributions are uniform and
//! only the columns Q5 reads carry meaningful data.

use crate::config::{TableFormat, DATE_FORMAT};
use crate::error::Result;
use crate::storage;
use crate::tpch::schema::TpchRowCounts;
use crate::tpch::tables::*;
use chrono::{Days, NaiveDate};
use rand::prelude::*;
use std::path::Path;
use tracing::info;

const REGIONS: [(i64, &str); 5] = [
    (0, "AFRICA"),
    (1, "AMERICA"),
    (2, "ASIA"),
    (3, "EUROPE"),
    (4, "MIDDLE EAST"),
];

const NATIONS: [(i64, &str, i64); 25] = [
    (0, "ALGERIA", 0),
    (1, "ARGENTINA", 1),
    (2, "BRAZIL", 1),
    (3, "CANADA", 1),
    (4, "EGYPT", 4),
    (5, "ETHIOPIA", 0),
    (6, "FRANCE", 3),
    (7, "GERMANY", 3),
    (8, "INDIA", 2),
    (9, "INDONESIA", 2),
    (10, "IRAN", 4),
    (11, "IRAQ", 4),
    (12, "JAPAN", 2),
    (13, "JORDAN", 4),
    (14, "KENYA", 0),
    (15, "MOROCCO", 0),
    (16, "MOZAMBIQUE", 0),
    (17, "PERU", 1),
    (18, "CHINA", 2),
    (19, "ROMANIA", 3),
    (20, "SAUDI ARABIA", 4),
    (21, "VIETNAM", 2),
    (22, "RUSSIA", 3),
    (23, "UNITED KINGDOM", 3),
    (24, "UNITED STATES", 1),
];

/// Order dates span 1992-01-01 ..= 1998-08-02
const ORDER_DATE_SPAN_DAYS: u64 = 2405;

/// TPC-H data generator
pub struct TpchGenerator {
    scale_factor: f64,
    rng: StdRng,
}

impl TpchGenerator {
    pub fn new(scale_factor: f64) -> Self {
        Self::with_seed(scale_factor, 42)
    }

    pub fn with_seed(scale_factor: f64, seed: u64) -> Self {
        Self {
            scale_factor,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate all six relations
    pub fn generate(&mut self) -> TpchTables {
        let counts = TpchRowCounts::for_scale_factor(self.scale_factor);

        let tables = TpchTables {
            region: Self::generate_region(),
            nation: Self::generate_nation(),
            customer: self.generate_customer(counts.customer),
            supplier: self.generate_supplier(counts.supplier),
            orders: self.generate_orders(counts.orders, counts.customer),
            lineitem: self.generate_lineitem(counts.lineitem, counts.orders, counts.supplier),
        };

        info!(
            scale_factor = self.scale_factor,
            customers = tables.customer.len(),
            suppliers = tables.supplier.len(),
            orders = tables.orders.len(),
            lineitems = tables.lineitem.len(),
            "generated TPC-H data"
        );
        tables
    }

    /// Generate all relations and write them under `output_dir`
    pub fn generate_to(&mut self, output_dir: &Path, format: TableFormat) -> Result<TpchTables> {
        let tables = self.generate();
        storage::store_tables(output_dir, format, &tables)?;
        Ok(tables)
    }

    fn generate_region() -> Vec<Region> {
        REGIONS
            .iter()
            .map(|&(regionkey, name)| Region {
                regionkey,
                name: name.to_string(),
            })
            .collect()
    }

    fn generate_nation() -> Vec<Nation> {
        NATIONS
            .iter()
            .map(|&(nationkey, name, regionkey)| Nation {
                nationkey,
                name: name.to_string(),
                regionkey,
            })
            .collect()
    }

    fn generate_customer(&mut self, count: usize) -> Vec<Customer> {
        (0..count)
            .map(|i| Customer {
                custkey: (i + 1) as i64,
                nationkey: self.rng.gen_range(0..NATIONS.len()) as i64,
            })
            .collect()
    }

    fn generate_supplier(&mut self, count: usize) -> Vec<Supplier> {
        (0..count)
            .map(|i| Supplier {
                suppkey: (i + 1) as i64,
                nationkey: self.rng.gen_range(0..NATIONS.len()) as i64,
            })
            .collect()
    }

    fn generate_orders(&mut self, count: usize, cust_count: usize) -> Vec<Order> {
        let base_date = NaiveDate::from_ymd_opt(1992, 1, 1).expect("valid base date");

        (0..count)
            .map(|i| {
                let offset = self.rng.gen_range(0..=ORDER_DATE_SPAN_DAYS);
                let orderdate = base_date
                    .checked_add_days(Days::new(offset))
                    .unwrap_or(base_date)
                    .format(DATE_FORMAT)
                    .to_string();
                Order {
                    orderkey: (i + 1) as i64,
                    custkey: self.rng.gen_range(1..=cust_count) as i64,
                    orderdate,
                }
            })
            .collect()
    }

    fn generate_lineitem(
        &mut self,
        count: usize,
        order_count: usize,
        supp_count: usize,
    ) -> Vec<LineItem> {
        let mut lineitems = Vec::with_capacity(count);
        let mut current_order: usize = 1;

        for i in 0..count {
            // Move to next order periodically
            if i > 0 && self.rng.gen_bool(0.25) {
                current_order = (current_order % order_count) + 1;
            }

            // Prices and discounts carry two decimals, as in dbgen
            let extendedprice = self.rng.gen_range(90_000..10_000_000) as f64 / 100.0;
            let discount = self.rng.gen_range(0..=10) as f64 / 100.0;

            lineitems.push(LineItem {
                orderkey: current_order as i64,
                suppkey: self.rng.gen_range(1..=supp_count) as i64,
                extendedprice,
                discount,
            });
        }

        lineitems
    }
}
