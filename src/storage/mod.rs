//! Storage for the Q5 relations
//!
//! This module reads and writes the row store in either layout:
//! - dbgen `.tbl` files (`<dir>/<table>.tbl`)
//! - Parquet files (`<dir>/<table>.parquet`)

mod parquet;
mod tbl;

pub use self::parquet::{read_parquet, to_record_batch, write_parquet};
pub use self::tbl::{read_tbl, write_tbl, TBL_DELIMITER};

use crate::config::TableFormat;
use crate::error::Result;
use crate::tpch::{TpchRecord, TpchTables};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Load one relation from `dir`
pub fn load_table<T: TpchRecord>(dir: &Path, format: TableFormat) -> Result<Vec<T>> {
    let path = format.table_path(dir, T::TABLE);
    match format {
        TableFormat::Tbl => read_tbl(&path),
        TableFormat::Parquet => read_parquet(&path),
    }
}

/// Store one relation under `dir`
pub fn store_table<T: TpchRecord>(dir: &Path, format: TableFormat, rows: &[T]) -> Result<()> {
    let path = format.table_path(dir, T::TABLE);
    match format {
        TableFormat::Tbl => write_tbl(&path, rows),
        TableFormat::Parquet => write_parquet(&path, rows),
    }
}

/// Load all six relations; the first unreadable one aborts the load
pub fn load_tables(dir: &Path, format: TableFormat) -> Result<TpchTables> {
    let start = Instant::now();

    let tables = TpchTables {
        region: load_table(dir, format)?,
        nation: load_table(dir, format)?,
        customer: load_table(dir, format)?,
        supplier: load_table(dir, format)?,
        orders: load_table(dir, format)?,
        lineitem: load_table(dir, format)?,
    };

    info!(
        dir = %dir.display(),
        format = format.extension(),
        elapsed = ?start.elapsed(),
        "loaded all tables"
    );
    Ok(tables)
}

/// Write all six relations, creating `dir` if needed
pub fn store_tables(dir: &Path, format: TableFormat, tables: &TpchTables) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    store_table(dir, format, &tables.region)?;
    store_table(dir, format, &tables.nation)?;
    store_table(dir, format, &tables.customer)?;
    store_table(dir, format, &tables.supplier)?;
    store_table(dir, format, &tables.orders)?;
    store_table(dir, format, &tables.lineitem)?;

    info!(dir = %dir.display(), format = format.extension(), "wrote all tables");
    Ok(())
}
