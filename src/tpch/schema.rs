//! TPC-H table schemas for the relations touched by Q5

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

pub const REGION: &str = "region";
pub const NATION: &str = "nation";
pub const CUSTOMER: &str = "customer";
pub const SUPPLIER: &str = "supplier";
pub const ORDERS: &str = "orders";
pub const LINEITEM: &str = "lineitem";

fn schema(fields: Vec<Field>) -> SchemaRef {
    Arc::new(Schema::new(fields))
}

fn key(name: &str) -> Field {
    Field::new(name, DataType::Int64, false)
}

fn int(name: &str) -> Field {
    Field::new(name, DataType::Int32, false)
}

fn decimal(name: &str) -> Field {
    Field::new(name, DataType::Float64, false)
}

fn text(name: &str) -> Field {
    Field::new(name, DataType::Utf8, false)
}

fn date(name: &str) -> Field {
    Field::new(name, DataType::Date32, false)
}

// Free-text columns are the only nullable ones
fn comment(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

pub fn region_schema() -> SchemaRef {
    schema(vec![key("r_regionkey"), text("r_name"), comment("r_comment")])
}

pub fn nation_schema() -> SchemaRef {
    schema(vec![
        key("n_nationkey"),
        text("n_name"),
        key("n_regionkey"),
        comment("n_comment"),
    ])
}

pub fn customer_schema() -> SchemaRef {
    schema(vec![
        key("c_custkey"),
        text("c_name"),
        text("c_address"),
        key("c_nationkey"),
        text("c_phone"),
        decimal("c_acctbal"),
        text("c_mktsegment"),
        comment("c_comment"),
    ])
}

pub fn supplier_schema() -> SchemaRef {
    schema(vec![
        key("s_suppkey"),
        text("s_name"),
        text("s_address"),
        key("s_nationkey"),
        text("s_phone"),
        decimal("s_acctbal"),
        comment("s_comment"),
    ])
}

pub fn orders_schema() -> SchemaRef {
    schema(vec![
        key("o_orderkey"),
        key("o_custkey"),
        text("o_orderstatus"),
        decimal("o_totalprice"),
        date("o_orderdate"),
        text("o_orderpriority"),
        text("o_clerk"),
        int("o_shippriority"),
        comment("o_comment"),
    ])
}

/// dbgen column order; dates are Date32 on disk
pub fn lineitem_schema() -> SchemaRef {
    schema(vec![
        key("l_orderkey"),
        key("l_partkey"),
        key("l_suppkey"),
        int("l_linenumber"),
        decimal("l_quantity"),
        decimal("l_extendedprice"),
        decimal("l_discount"),
        decimal("l_tax"),
        text("l_returnflag"),
        text("l_linestatus"),
        date("l_shipdate"),
        date("l_commitdate"),
        date("l_receiptdate"),
        text("l_shipinstruct"),
        text("l_shipmode"),
        comment("l_comment"),
    ])
}

/// Scale factor row counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TpchRowCounts {
    pub region: usize,
    pub nation: usize,
    pub customer: usize,
    pub supplier: usize,
    pub orders: usize,
    pub lineitem: usize,
}

impl TpchRowCounts {
    /// Get row counts for a given scale factor (at least one row per table)
    pub fn for_scale_factor(sf: f64) -> Self {
        let scaled = |base: f64| ((base * sf) as usize).max(1);
        Self {
            region: 5,
            nation: 25,
            customer: scaled(150_000.0),
            supplier: scaled(10_000.0),
            orders: scaled(1_500_000.0),
            lineitem: scaled(6_000_000.0),
        }
    }
}
