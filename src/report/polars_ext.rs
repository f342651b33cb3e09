use polars::prelude::{DataFrame, JsonFormat, JsonWriter, SerWriter};
use serde_json::Value;

use crate::error::{DataError, IoError, PlotError, PlotResult};

pub(super) fn polars_to_plot_error(report: &str, e: polars::error::PolarsError) -> PlotError {
    PlotError::Data(DataError::DataFrame(format!(
        "Error while building {report}: {e}"
    )))
}

pub trait DataFrameExt {
    fn to_json_rows(&self) -> PlotResult<Vec<serde_json::Map<String, Value>>>;
}

impl DataFrameExt for DataFrame {
    fn to_json_rows(&self) -> PlotResult<Vec<serde_json::Map<String, Value>>> {
        let height = self.height();
        if height == 0 {
            return Ok(Vec::new());
        }

        let estimated_row_size = self.width() * (1 << 6);
        let mut buf = Vec::with_capacity(height * estimated_row_size);

        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut self.clone())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        let json_val: Value = serde_json::from_slice(&buf).map_err(IoError::Json)?;

        match json_val {
            Value::Array(rows) => Ok(rows
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            _ => Err(DataError::DataFrame("Polars JSON output was not an array".to_string()).into()),
        }
    }
}
