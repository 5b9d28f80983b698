use std::fmt;

use thiserror::Error;

/// Errors raised while deriving a target range from a block of values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid value block shape: {0}")]
    InvalidShape(String),
    #[error("Start coordinates are 1-indexed, got row {row} col {col}")]
    InvalidStart { row: u32, col: u32 },
    #[error("Block of {rows}x{cols} at row {row} col {col} runs past the last addressable cell")]
    OutOfBounds {
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    },
}

/// Inclusive, 1-indexed rectangle on a named sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDescriptor {
    pub sheet_name: String,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl RangeDescriptor {
    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    /// Renders the same rectangle in A1 notation, e.g. `Sheet1!A1:B3`.
    pub fn to_a1(&self) -> String {
        format!(
            "{}!{}{}:{}{}",
            self.sheet_name,
            column_letters(self.start_col),
            self.start_row,
            column_letters(self.end_col),
            self.end_row
        )
    }
}

impl fmt::Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!R{}C{}:R{}C{}",
            self.sheet_name, self.start_row, self.start_col, self.end_row, self.end_col
        )
    }
}

/// Computes the range a rectangular block occupies when its top-left cell is
/// placed at (`start_row`, `start_col`).
///
/// The block must have at least one row, at least one column, and every row
/// must be the same length.
pub fn build_range<T>(
    sheet_name: &str,
    values: &[Vec<T>],
    start_row: u32,
    start_col: u32,
) -> Result<RangeDescriptor, RangeError> {
    if start_row == 0 || start_col == 0 {
        return Err(RangeError::InvalidStart {
            row: start_row,
            col: start_col,
        });
    }

    let (rows, cols) = block_dimensions(values)?;
    let out_of_bounds = || RangeError::OutOfBounds {
        row: start_row,
        col: start_col,
        rows,
        cols,
    };

    // rows and cols are at least 1, so `start + (n - 1)` is the inclusive end.
    let end_row = start_row.checked_add(rows - 1).ok_or_else(out_of_bounds)?;
    let end_col = start_col.checked_add(cols - 1).ok_or_else(out_of_bounds)?;

    Ok(RangeDescriptor {
        sheet_name: sheet_name.to_string(),
        start_row,
        start_col,
        end_row,
        end_col,
    })
}

/// Returns `(rows, cols)` for a non-empty rectangular block.
pub fn block_dimensions<T>(values: &[Vec<T>]) -> Result<(u32, u32), RangeError> {
    let first = values
        .first()
        .ok_or_else(|| RangeError::InvalidShape("block has no rows".to_string()))?;

    if first.is_empty() {
        return Err(RangeError::InvalidShape("block has no columns".to_string()));
    }

    if let Some((index, row)) = values
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != first.len())
    {
        return Err(RangeError::InvalidShape(format!(
            "row {} has {} cells, expected {}",
            index,
            row.len(),
            first.len()
        )));
    }

    let rows = u32::try_from(values.len())
        .map_err(|_| RangeError::InvalidShape("too many rows".to_string()))?;
    let cols = u32::try_from(first.len())
        .map_err(|_| RangeError::InvalidShape("too many columns".to_string()))?;

    Ok((rows, cols))
}

/// Converts a 1-indexed column number to its letter form (1 -> A, 27 -> AA).
pub fn column_letters(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
