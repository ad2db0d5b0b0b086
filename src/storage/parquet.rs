//! Parquet reader and writer for the Q5 relations
//!
//! Only the retained columns are projected on read. Each is cast to the
//! type its record expects, so files written by other tools (Int32 keys,
//! Utf8 dates, ...) load the same way as our own.

use crate::error::{QueryError, Result};
use crate::tpch::{ColumnKind, ColumnSpec, FieldAccess, FieldValue, TpchRecord};
use arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::{ArrowWriter, ProjectionMask};
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Read the retained columns of a Parquet file into typed records
pub fn read_parquet<T: TpchRecord>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|source| QueryError::TableAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let file_schema = builder.schema().clone();
    let indices = T::COLUMNS
        .iter()
        .map(|spec| {
            file_schema
                .index_of(spec.name)
                .map_err(|_| QueryError::ColumnNotFound(format!("{}.{}", T::TABLE, spec.name)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mask = ProjectionMask::roots(builder.parquet_schema(), indices);
    let reader = builder.with_projection(mask).build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let columns = T::COLUMNS
            .iter()
            .map(|spec| -> Result<TypedColumn> {
                let array = batch.column_by_name(spec.name).ok_or_else(|| {
                    QueryError::ColumnNotFound(format!("{}.{}", T::TABLE, spec.name))
                })?;
                TypedColumn::try_new(array, spec)
            })
            .collect::<Result<Vec<_>>>()?;

        rows.reserve(batch.num_rows());
        for row in 0..batch.num_rows() {
            let access = BatchRow {
                columns: &columns,
                specs: T::COLUMNS,
                table: T::TABLE,
                row,
            };
            rows.push(T::decode(&access)?);
        }
    }

    info!(table = T::TABLE, rows = rows.len(), path = %path.display(), "loaded table");
    Ok(rows)
}

/// Write typed records as a Parquet file with the relation's full schema
pub fn write_parquet<T: TpchRecord>(path: &Path, rows: &[T]) -> Result<()> {
    let batch = to_record_batch(rows)?;

    let file = File::create(path).map_err(|source| QueryError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!(table = T::TABLE, rows = rows.len(), path = %path.display(), "wrote table");
    Ok(())
}

/// Build a full-schema batch, filling unretained columns with neutral values
pub fn to_record_batch<T: TpchRecord>(rows: &[T]) -> Result<RecordBatch> {
    let schema = T::schema();
    let encoded: Vec<Vec<FieldValue<'_>>> = rows.iter().map(|r| r.encode()).collect();

    let columns = schema
        .fields()
        .iter()
        .map(|field| -> Result<ArrayRef> {
            match T::COLUMNS.iter().position(|spec| spec.name == field.name()) {
                Some(idx) => {
                    let natural = natural_array(&encoded, idx);
                    Ok(cast(&natural, field.data_type())?)
                }
                None => Ok(filler_array(field.data_type(), rows.len())),
            }
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Array of the value's own type, cast to the schema type afterwards
fn natural_array(encoded: &[Vec<FieldValue<'_>>], idx: usize) -> ArrayRef {
    match encoded.first().map(|values| values[idx]) {
        Some(FieldValue::Key(_)) => Arc::new(
            encoded
                .iter()
                .map(|values| match values[idx] {
                    FieldValue::Key(v) => Some(v),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        Some(FieldValue::Decimal(_)) => Arc::new(
            encoded
                .iter()
                .map(|values| match values[idx] {
                    FieldValue::Decimal(v) => Some(v),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        Some(FieldValue::Text(_)) | None => Arc::new(
            encoded
                .iter()
                .map(|values| match values[idx] {
                    FieldValue::Text(v) => Some(v),
                    _ => None,
                })
                .collect::<StringArray>(),
        ),
    }
}

fn filler_array(data_type: &DataType, len: usize) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(Int64Array::from(vec![0i64; len])),
        DataType::Int32 => Arc::new(Int32Array::from(vec![0i32; len])),
        DataType::Float64 => Arc::new(Float64Array::from(vec![0.0f64; len])),
        DataType::Date32 => Arc::new(Date32Array::from(vec![0i32; len])),
        DataType::Utf8 => Arc::new(StringArray::from(vec![""; len])),
        other => arrow::array::new_null_array(other, len),
    }
}

/// A projected column cast to the type its record decodes
enum TypedColumn {
    Key(Int64Array),
    Decimal(Float64Array),
    Text(StringArray),
}

impl TypedColumn {
    fn try_new(array: &ArrayRef, spec: &ColumnSpec) -> Result<Self> {
        Ok(match spec.kind {
            ColumnKind::Key => {
                TypedColumn::Key(cast(array, &DataType::Int64)?.as_primitive::<Int64Type>().clone())
            }
            ColumnKind::Decimal => TypedColumn::Decimal(
                cast(array, &DataType::Float64)?
                    .as_primitive::<Float64Type>()
                    .clone(),
            ),
            // Date32 casts to the canonical YYYY-MM-DD form
            ColumnKind::Text | ColumnKind::Date => {
                TypedColumn::Text(cast(array, &DataType::Utf8)?.as_string::<i32>().clone())
            }
        })
    }
}

struct BatchRow<'a> {
    columns: &'a [TypedColumn],
    specs: &'static [ColumnSpec],
    table: &'static str,
    row: usize,
}

impl BatchRow<'_> {
    fn null(&self, index: usize) -> QueryError {
        QueryError::NullValue(format!("{}.{}", self.table, self.specs[index].name))
    }

    fn mismatch(&self, index: usize) -> QueryError {
        QueryError::ColumnNotFound(format!(
            "{}.{} with the expected type",
            self.table, self.specs[index].name
        ))
    }
}

impl FieldAccess for BatchRow<'_> {
    fn key(&self, index: usize) -> Result<i64> {
        match &self.columns[index] {
            TypedColumn::Key(a) if a.is_valid(self.row) => Ok(a.value(self.row)),
            TypedColumn::Key(_) => Err(self.null(index)),
            _ => Err(self.mismatch(index)),
        }
    }

    fn decimal(&self, index: usize) -> Result<f64> {
        match &self.columns[index] {
            TypedColumn::Decimal(a) if a.is_valid(self.row) => Ok(a.value(self.row)),
            TypedColumn::Decimal(_) => Err(self.null(index)),
            _ => Err(self.mismatch(index)),
        }
    }

    fn text(&self, index: usize) -> Result<&str> {
        match &self.columns[index] {
            TypedColumn::Text(a) if a.is_valid(self.row) => Ok(a.value(self.row)),
            TypedColumn::Text(_) => Err(self.null(index)),
            _ => Err(self.mismatch(index)),
        }
    }
}
