//! Sparse in-memory worksheet.
//!
//! Cells are keyed by 1-based `(row, col)`. Blank values are never stored, so the
//! used extent is always the extent of the non-empty cells.

use std::collections::BTreeMap;

use crate::spec::{EnumCellValue, XlsxIoError};
use crate::util::validate_cell_bounds;

static VAL_BLANK: EnumCellValue = EnumCellValue::None;

/// One named worksheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XlsxWorksheet {
    name: String,
    dict_cells: BTreeMap<(u32, u32), EnumCellValue>,
}

impl XlsxWorksheet {
    /// Create an empty worksheet. Name validation is the workbook's job.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dict_cells: BTreeMap::new(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value at `(row, col)`; blank when the cell was never written.
    pub fn get_value(&self, row: u32, col: u32) -> &EnumCellValue {
        self.dict_cells.get(&(row, col)).unwrap_or(&VAL_BLANK)
    }

    /// True when `(row, col)` holds no value.
    pub fn is_blank(&self, row: u32, col: u32) -> bool {
        self.get_value(row, col).is_empty()
    }

    /// Write one value. Blank values (and empty strings) clear the cell.
    pub fn set_value(
        &mut self,
        row: u32,
        col: u32,
        value: impl Into<EnumCellValue>,
    ) -> Result<(), XlsxIoError> {
        validate_cell_bounds(&self.name, row, col)?;
        let value = value.into();
        if value.is_empty() {
            self.dict_cells.remove(&(row, col));
        } else {
            self.dict_cells.insert((row, col), value);
        }
        Ok(())
    }

    /// Clear one cell.
    pub fn clear_value(&mut self, row: u32, col: u32) {
        self.dict_cells.remove(&(row, col));
    }

    /// Number of non-blank cells.
    pub fn len(&self) -> usize {
        self.dict_cells.len()
    }

    /// True when the sheet holds no value.
    pub fn is_empty(&self) -> bool {
        self.dict_cells.is_empty()
    }

    /// Highest used row, `0` for an empty sheet.
    pub fn highest_row(&self) -> u32 {
        self.dict_cells
            .keys()
            .next_back()
            .map_or(0, |(row, _)| *row)
    }

    /// Highest used column, `0` for an empty sheet.
    pub fn highest_column(&self) -> u32 {
        self.dict_cells.keys().map(|(_, col)| *col).max().unwrap_or(0)
    }

    /// Non-blank cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &EnumCellValue)> {
        self.dict_cells.iter().map(|(pos, value)| (*pos, value))
    }

    /// Delete `count` rows starting at `row`, shifting the rows below upward.
    pub fn remove_rows(&mut self, row: u32, count: u32) {
        if row == 0 || count == 0 {
            return;
        }
        let n_row_end = row.saturating_add(count);
        let dict_cells = std::mem::take(&mut self.dict_cells);
        self.dict_cells = dict_cells
            .into_iter()
            .filter_map(|((n_row, n_col), value)| {
                if n_row < row {
                    Some(((n_row, n_col), value))
                } else if n_row >= n_row_end {
                    Some(((n_row - count, n_col), value))
                } else {
                    None
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_value() {
        let mut sheet = XlsxWorksheet::new("S");
        sheet.set_value(2, 3, "x").unwrap();
        sheet.set_value(4, 1, 7.5).unwrap();

        assert_eq!(sheet.get_value(2, 3), &EnumCellValue::String("x".to_string()));
        assert_eq!(sheet.get_value(4, 1), &EnumCellValue::Number(7.5));
        assert_eq!(sheet.get_value(9, 9), &EnumCellValue::None);
        assert_eq!(sheet.highest_row(), 4);
        assert_eq!(sheet.highest_column(), 3);
    }

    #[test]
    fn test_blank_write_clears_cell() {
        let mut sheet = XlsxWorksheet::new("S");
        sheet.set_value(1, 1, "x").unwrap();
        sheet.set_value(1, 1, EnumCellValue::None).unwrap();
        sheet.set_value(1, 2, "").unwrap();
        assert!(sheet.is_empty());
        assert_eq!(sheet.highest_row(), 0);
    }

    #[test]
    fn test_non_finite_numbers_are_not_stored() {
        let mut sheet = XlsxWorksheet::new("S");
        sheet.set_value(1, 1, f64::NAN).unwrap();
        sheet.set_value(1, 2, EnumCellValue::Number(f64::INFINITY)).unwrap();
        sheet.set_value(1, 3, f64::NEG_INFINITY).unwrap();
        assert!(sheet.is_empty());
        assert_eq!(EnumCellValue::Number(f64::NAN).as_f64(), None);
    }

    #[test]
    fn test_set_value_rejects_row_zero() {
        let mut sheet = XlsxWorksheet::new("S");
        assert!(matches!(
            sheet.set_value(0, 1, 1.0),
            Err(XlsxIoError::CellOutOfBounds { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_remove_rows_shifts_up() {
        let mut sheet = XlsxWorksheet::new("S");
        for n_row in 1..=5 {
            sheet.set_value(n_row, 1, n_row as i64).unwrap();
        }
        sheet.remove_rows(2, 2);

        assert_eq!(sheet.get_value(1, 1), &EnumCellValue::Number(1.0));
        assert_eq!(sheet.get_value(2, 1), &EnumCellValue::Number(4.0));
        assert_eq!(sheet.get_value(3, 1), &EnumCellValue::Number(5.0));
        assert_eq!(sheet.highest_row(), 3);
    }
}
