// Sheets core - range arithmetic and the value shapes the infra client sends.

pub mod range_builder;
pub mod sheets_models;

pub use range_builder::{build_range, column_letters, RangeDescriptor, RangeError};
pub use sheets_models::{
    BatchGetResponse, MajorDimension, RangeTarget, SheetsError, UpdateValuesResponse, ValueBlock,
    ValueRange,
};
