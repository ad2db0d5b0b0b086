//! Reader and writer for dbgen `.tbl` files
//!
//! Rows are `|`-delimited with no header and usually a trailing `|`. A row
//! with fewer fields than the relation's schema is skipped; a retained
//! numeric field that does not parse aborts the load.

use crate::error::{QueryError, Result};
use crate::tpch::{ColumnSpec, FieldAccess, FieldValue, TpchRecord};
use arrow::datatypes::{DataType, SchemaRef};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};

pub const TBL_DELIMITER: u8 = b'|';

/// Read every row of a `.tbl` file into typed records
pub fn read_tbl<T: TpchRecord>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|source| QueryError::TableAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(TBL_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(BufReader::new(file));

    let schema = T::schema();
    let column_count = schema.fields().len();
    let positions = retained_positions::<T>(&schema)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut record = StringRecord::new();

    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let fields = field_count(&record);
        if fields < column_count {
            debug!(
                table = T::TABLE,
                line,
                fields,
                expected = column_count,
                "skipping short row"
            );
            skipped += 1;
            continue;
        }

        let row = TblRow {
            record: &record,
            positions: &positions,
            columns: T::COLUMNS,
            table: T::TABLE,
            line,
        };
        rows.push(T::decode(&row)?);
    }

    if skipped > 0 {
        warn!(table = T::TABLE, skipped, "rows with missing fields were skipped");
    }
    info!(table = T::TABLE, rows = rows.len(), path = %path.display(), "loaded table");

    Ok(rows)
}

/// Write typed records as a `.tbl` file
///
/// Columns the record does not retain are filled with a neutral value of
/// the schema type so that the file has the full dbgen layout.
pub fn write_tbl<T: TpchRecord>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).map_err(|source| QueryError::Output {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = WriterBuilder::new()
        .delimiter(TBL_DELIMITER)
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(BufWriter::new(file));

    let schema = T::schema();
    let positions = retained_positions::<T>(&schema)?;

    // Trailing empty field produces the terminating `|`
    let mut fields: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| filler_value(f.data_type()).to_string())
        .chain(std::iter::once(String::new()))
        .collect();

    for row in rows {
        for (value, &pos) in row.encode().into_iter().zip(&positions) {
            fields[pos] = match value {
                FieldValue::Key(v) => v.to_string(),
                FieldValue::Decimal(v) => v.to_string(),
                FieldValue::Text(v) => v.to_string(),
            };
        }
        writer.write_record(&fields)?;
    }

    writer.flush().map_err(|source| QueryError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(table = T::TABLE, rows = rows.len(), path = %path.display(), "wrote table");
    Ok(())
}

/// Number of fields on the line; the terminating `|` does not open a field
fn field_count(record: &StringRecord) -> usize {
    match record.iter().last() {
        Some("") => record.len() - 1,
        _ => record.len(),
    }
}

/// Schema positions of the record's retained columns
fn retained_positions<T: TpchRecord>(schema: &SchemaRef) -> Result<Vec<usize>> {
    T::COLUMNS
        .iter()
        .map(|spec| {
            schema
                .index_of(spec.name)
                .map_err(|_| QueryError::ColumnNotFound(format!("{}.{}", T::TABLE, spec.name)))
        })
        .collect()
}

fn filler_value(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Int32 | DataType::Int64 => "0",
        DataType::Float64 => "0.00",
        DataType::Date32 => "1970-01-01",
        _ => "",
    }
}

/// One accepted row of a `.tbl` file
struct TblRow<'a> {
    record: &'a StringRecord,
    positions: &'a [usize],
    columns: &'static [ColumnSpec],
    table: &'static str,
    line: u64,
}

impl TblRow<'_> {
    fn raw(&self, index: usize) -> &str {
        // Row length was checked against the schema before decoding
        self.record.get(self.positions[index]).unwrap_or("")
    }

    fn invalid(&self, index: usize, value: &str) -> QueryError {
        QueryError::InvalidField {
            table: self.table,
            column: self.columns[index].name,
            line: self.line,
            value: value.to_string(),
        }
    }
}

impl FieldAccess for TblRow<'_> {
    fn key(&self, index: usize) -> Result<i64> {
        let raw = self.raw(index);
        raw.trim().parse().map_err(|_| self.invalid(index, raw))
    }

    fn decimal(&self, index: usize) -> Result<f64> {
        let raw = self.raw(index);
        raw.trim().parse().map_err(|_| self.invalid(index, raw))
    }

    fn text(&self, index: usize) -> Result<&str> {
        Ok(self.raw(index))
    }
}
