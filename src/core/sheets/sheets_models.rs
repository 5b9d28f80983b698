// Sheets domain models. These mirror the Sheets v4 JSON shapes closely enough
// to be (de)serialized directly, but carry no HTTP types.

use serde::{Deserialize, Serialize};

use super::range_builder::RangeError;

/// A block of cells, rows of columns.
pub type ValueBlock = Vec<Vec<serde_json::Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MajorDimension {
    #[default]
    Rows,
    Columns,
}

impl MajorDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            MajorDimension::Rows => "ROWS",
            MajorDimension::Columns => "COLUMNS",
        }
    }
}

/// Where a block of values should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeTarget {
    /// A range string passed through untouched, e.g. `Sheet1!A1:C3`.
    Explicit(String),
    /// A 1-indexed top-left anchor; the extent is derived from the values.
    Anchor {
        sheet_name: String,
        start_row: u32,
        start_col: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub major_dimension: MajorDimension,
    #[serde(default)]
    pub values: ValueBlock,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetResponse {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u32>,
    #[serde(default)]
    pub updated_columns: Option<u32>,
    #[serde(default)]
    pub updated_cells: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Sheets request failed: {0}")]
    Http(String),
    #[error("Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Invalid Sheets URL: {0}")]
    Url(String),
}
