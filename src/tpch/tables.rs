//! In-memory row store for the six Q5 relations
//!
//! Each relation is a `Vec` of a small typed record holding only the
//! attributes the query reads. Keys are resolved to integers once, at load
//! time, so every join downstream is a hash lookup on an `i64`.

use crate::error::Result;
use crate::tpch::schema::*;
use arrow::datatypes::SchemaRef;

/// How a retained column is decoded from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer join key
    Key,
    /// Floating point measure (price, discount)
    Decimal,
    /// Verbatim text
    Text,
    /// Canonical `YYYY-MM-DD` text
    Date,
}

/// A column kept in the typed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

/// A single retained value, as handed to the writers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Key(i64),
    Decimal(f64),
    Text(&'a str),
}

/// Positional access to one stored row
///
/// `index` refers to the record's `COLUMNS` list, not to the full schema.
pub trait FieldAccess {
    fn key(&self, index: usize) -> Result<i64>;
    fn decimal(&self, index: usize) -> Result<f64>;
    fn text(&self, index: usize) -> Result<&str>;
}

/// A typed row of one TPC-H relation
pub trait TpchRecord: Sized + Send + Sync {
    /// Relation name, also the file stem on disk
    const TABLE: &'static str;
    /// Retained columns, in decode/encode order
    const COLUMNS: &'static [ColumnSpec];

    /// Full dbgen schema of the relation
    fn schema() -> SchemaRef;

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self>;

    /// Values of `COLUMNS`, same order
    fn encode(&self) -> Vec<FieldValue<'_>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub regionkey: i64,
    pub name: String,
}

impl TpchRecord for Region {
    const TABLE: &'static str = REGION;
    const COLUMNS: &'static [ColumnSpec] = &[
        col("r_regionkey", ColumnKind::Key),
        col("r_name", ColumnKind::Text),
    ];

    fn schema() -> SchemaRef {
        region_schema()
    }

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self> {
        Ok(Self {
            regionkey: row.key(0)?,
            name: row.text(1)?.to_string(),
        })
    }

    fn encode(&self) -> Vec<FieldValue<'_>> {
        vec![FieldValue::Key(self.regionkey), FieldValue::Text(&self.name)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nation {
    pub nationkey: i64,
    pub name: String,
    pub regionkey: i64,
}

impl TpchRecord for Nation {
    const TABLE: &'static str = NATION;
    const COLUMNS: &'static [ColumnSpec] = &[
        col("n_nationkey", ColumnKind::Key),
        col("n_name", ColumnKind::Text),
        col("n_regionkey", ColumnKind::Key),
    ];

    fn schema() -> SchemaRef {
        nation_schema()
    }

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self> {
        Ok(Self {
            nationkey: row.key(0)?,
            name: row.text(1)?.to_string(),
            regionkey: row.key(2)?,
        })
    }

    fn encode(&self) -> Vec<FieldValue<'_>> {
        vec![
            FieldValue::Key(self.nationkey),
            FieldValue::Text(&self.name),
            FieldValue::Key(self.regionkey),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub custkey: i64,
    pub nationkey: i64,
}

impl TpchRecord for Customer {
    const TABLE: &'static str = CUSTOMER;
    const COLUMNS: &'static [ColumnSpec] = &[
        col("c_custkey", ColumnKind::Key),
        col("c_nationkey", ColumnKind::Key),
    ];

    fn schema() -> SchemaRef {
        customer_schema()
    }

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self> {
        Ok(Self {
            custkey: row.key(0)?,
            nationkey: row.key(1)?,
        })
    }

    fn encode(&self) -> Vec<FieldValue<'_>> {
        vec![FieldValue::Key(self.custkey), FieldValue::Key(self.nationkey)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub suppkey: i64,
    pub nationkey: i64,
}

impl TpchRecord for Supplier {
    const TABLE: &'static str = SUPPLIER;
    const COLUMNS: &'static [ColumnSpec] = &[
        col("s_suppkey", ColumnKind::Key),
        col("s_nationkey", ColumnKind::Key),
    ];

    fn schema() -> SchemaRef {
        supplier_schema()
    }

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self> {
        Ok(Self {
            suppkey: row.key(0)?,
            nationkey: row.key(1)?,
        })
    }

    fn encode(&self) -> Vec<FieldValue<'_>> {
        vec![FieldValue::Key(self.suppkey), FieldValue::Key(self.nationkey)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub orderkey: i64,
    pub custkey: i64,
    /// Canonical `YYYY-MM-DD`
    pub orderdate: String,
}

impl TpchRecord for Order {
    const TABLE: &'static str = ORDERS;
    const COLUMNS: &'static [ColumnSpec] = &[
        col("o_orderkey", ColumnKind::Key),
        col("o_custkey", ColumnKind::Key),
        col("o_orderdate", ColumnKind::Date),
    ];

    fn schema() -> SchemaRef {
        orders_schema()
    }

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self> {
        Ok(Self {
            orderkey: row.key(0)?,
            custkey: row.key(1)?,
            orderdate: row.text(2)?.to_string(),
        })
    }

    fn encode(&self) -> Vec<FieldValue<'_>> {
        vec![
            FieldValue::Key(self.orderkey),
            FieldValue::Key(self.custkey),
            FieldValue::Text(&self.orderdate),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub orderkey: i64,
    pub suppkey: i64,
    pub extendedprice: f64,
    pub discount: f64,
}

impl LineItem {
    /// Net revenue of this line: `extendedprice * (1 - discount)`
    #[inline]
    pub fn revenue(&self) -> f64 {
        self.extendedprice * (1.0 - self.discount)
    }
}

impl TpchRecord for LineItem {
    const TABLE: &'static str = LINEITEM;
    const COLUMNS: &'static [ColumnSpec] = &[
        col("l_orderkey", ColumnKind::Key),
        col("l_suppkey", ColumnKind::Key),
        col("l_extendedprice", ColumnKind::Decimal),
        col("l_discount", ColumnKind::Decimal),
    ];

    fn schema() -> SchemaRef {
        lineitem_schema()
    }

    fn decode<A: FieldAccess + ?Sized>(row: &A) -> Result<Self> {
        Ok(Self {
            orderkey: row.key(0)?,
            suppkey: row.key(1)?,
            extendedprice: row.decimal(2)?,
            discount: row.decimal(3)?,
        })
    }

    fn encode(&self) -> Vec<FieldValue<'_>> {
        vec![
            FieldValue::Key(self.orderkey),
            FieldValue::Key(self.suppkey),
            FieldValue::Decimal(self.extendedprice),
            FieldValue::Decimal(self.discount),
        ]
    }
}

/// The six relations of one dataset
///
/// Immutable once built; the executor only ever borrows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TpchTables {
    pub region: Vec<Region>,
    pub nation: Vec<Nation>,
    pub customer: Vec<Customer>,
    pub supplier: Vec<Supplier>,
    pub orders: Vec<Order>,
    pub lineitem: Vec<LineItem>,
}

impl TpchTables {
    pub fn row_counts(&self) -> TpchRowCounts {
        TpchRowCounts {
            region: self.region.len(),
            nation: self.nation.len(),
            customer: self.customer.len(),
            supplier: self.supplier.len(),
            orders: self.orders.len(),
            lineitem: self.lineitem.len(),
        }
    }
}
