//! Rendering of the ranked nation revenue rows
//!
//! The result file always uses the pipe layout, one `NATION|revenue` line
//! per nation. The table rendering is for the console.

use crate::error::{QueryError, Result};
use crate::execution::NationRevenue;
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Fractional digits printed for revenue
pub const REVENUE_SCALE: usize = 4;

/// How ranked rows are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `NATION|revenue` lines
    #[default]
    Pipe,
    /// Arrow pretty-printed table
    Table,
}

/// Formatter for outputting ranked revenue rows
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format rows and write to the given writer
    pub fn write<W: Write>(&self, writer: &mut W, rows: &[NationRevenue]) -> io::Result<()> {
        match self.format {
            OutputFormat::Pipe => {
                for row in rows {
                    writeln!(writer, "{}", format_result_line(row))?;
                }
                Ok(())
            }
            OutputFormat::Table => self.write_table(writer, rows),
        }
    }

    fn write_table<W: Write>(&self, writer: &mut W, rows: &[NationRevenue]) -> io::Result<()> {
        let batch = result_batch(rows).map_err(|e| io::Error::other(e.to_string()))?;
        let display = arrow::util::pretty::pretty_format_batches(&[batch])
            .map_err(|e| io::Error::other(e.to_string()))?;
        writeln!(writer, "{}", display)
    }
}

/// One result line: `NATION|950.0000`
pub fn format_result_line(row: &NationRevenue) -> String {
    format!("{}|{:.prec$}", row.nation, row.revenue, prec = REVENUE_SCALE)
}

/// Write ranked rows to the result file
pub fn write_results(path: &Path, rows: &[NationRevenue]) -> Result<()> {
    let to_output_error = |source: io::Error| QueryError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_output_error)?;
    let mut writer = BufWriter::new(file);
    OutputFormatter::new(OutputFormat::Pipe)
        .write(&mut writer, rows)
        .map_err(to_output_error)?;
    writer.flush().map_err(to_output_error)?;

    info!(path = %path.display(), rows = rows.len(), "wrote result");
    Ok(())
}

/// Schema of the result batch
pub fn result_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("n_name", DataType::Utf8, false),
        Field::new("revenue", DataType::Float64, false),
    ]))
}

pub fn result_batch(rows: &[NationRevenue]) -> Result<RecordBatch> {
    let names: StringArray = rows.iter().map(|r| Some(r.nation.as_str())).collect();
    let revenue: Float64Array = rows.iter().map(|r| Some(r.revenue)).collect();

    Ok(RecordBatch::try_new(
        result_schema(),
        vec![Arc::new(names), Arc::new(revenue)],
    )?)
}
