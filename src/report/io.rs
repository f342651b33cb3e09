use std::{
    fs::{self, File},
    path::Path,
};

use polars::{
    frame::DataFrame,
    prelude::{CsvWriter, SchemaRef, SerWriter},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::{
    error::{DataError, IoError, PlotResult},
    report::polars_ext::DataFrameExt,
};

// ================================================================================================
// Traits
// ================================================================================================

/// Common interface of tabular summaries.
pub trait Report {
    fn as_df(&self) -> &DataFrame;
}

pub trait ReportName {
    fn base_name(&self) -> String;

    fn filename(&self, ext: FileExtension) -> String {
        format!("{}.{}", self.base_name(), ext)
    }
}

pub trait ToSchema {
    /// Returns the canonical schema for this report type.
    fn to_schema() -> SchemaRef;
}

pub trait ToJson {
    /// Serializes the report to a generic JSON value.
    /// Returns a `Value::Array` containing one object per row, keyed by column name.
    fn to_json(&self) -> PlotResult<Value>;
}

pub trait ToCsv {
    /// Writes the report to a CSV file in the target directory.
    ///
    /// # Formatting
    /// - Column order follows the canonical schema defined in `ToSchema`.
    /// - A header row is always written.
    ///
    /// # Arguments
    /// - `dir`: Target directory. Created if it doesn't exist.
    ///
    /// # Side Effects
    /// - Creates the directory if missing.
    /// - Writes `<dir>/<base_name>.csv`, overwriting the file if it exists.
    fn to_csv(&self, dir: impl AsRef<Path>) -> PlotResult<()>;
}

// ================================================================================================
// Blanket Implementations
// ================================================================================================

impl<T> ToJson for T
where
    T: Report,
{
    fn to_json(&self) -> PlotResult<Value> {
        let rows = self.as_df().to_json_rows()?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

impl<T> ToCsv for T
where
    T: Report + ReportName,
{
    fn to_csv(&self, dir: impl AsRef<Path>) -> PlotResult<()> {
        let dir = dir.as_ref();
        let file_path = dir.join(self.filename(FileExtension::Csv));

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                IoError::FileSystem(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = File::create(&file_path).map_err(IoError::Io)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut self.as_df().clone())
            .map_err(|e| {
                DataError::DataFrame(format!(
                    "Failed to write CSV to '{}': {e}",
                    file_path.display()
                ))
            })?;

        debug!(path = %file_path.display(), "Report written");
        Ok(())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum FileExtension {
    Csv,
    Json,
}
