//! Workbook loader backed by `calamine`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::spec::{EnumCellValue, XlsxIoError};
use crate::worksheet::XlsxWorksheet;

/// Read every sheet of `path` into memory, preserving sheet order.
///
/// Formulas are loaded as their cached values; styles are dropped.
pub fn read_worksheets(path: &Path) -> Result<Vec<XlsxWorksheet>, XlsxIoError> {
    let derive_err = |message: String| XlsxIoError::Read {
        path: path.to_path_buf(),
        message,
    };

    if !path.exists() {
        return Err(derive_err("file not found".to_string()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|err| derive_err(err.to_string()))?;
    let l_sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut l_sheets = Vec::with_capacity(l_sheet_names.len());
    for sheet_name in l_sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| derive_err(format!("sheet '{sheet_name}': {err}")))?;

        let mut sheet = XlsxWorksheet::new(sheet_name.clone());
        let (n_row_start, n_col_start) = range.start().unwrap_or_default();
        for (n_row, n_col, data) in range.used_cells() {
            let value = derive_cell_value_from_data(data);
            if value.is_empty() {
                continue;
            }
            // calamine is 0-based and relative to the range start
            let n_row_abs = n_row_start + n_row as u32 + 1;
            let n_col_abs = n_col_start + n_col as u32 + 1;
            sheet.set_value(n_row_abs, n_col_abs, value)?;
        }
        debug!(
            "loaded sheet {sheet_name:?}: {} cells from {}",
            sheet.len(),
            path.display()
        );
        l_sheets.push(sheet);
    }

    Ok(l_sheets)
}

/// Map one calamine cell onto the shared value model.
pub fn derive_cell_value_from_data(data: &Data) -> EnumCellValue {
    match data {
        Data::Empty => EnumCellValue::None,
        Data::String(s) => EnumCellValue::String(s.clone()),
        Data::Float(f) => EnumCellValue::Number(*f),
        Data::Int(i) => EnumCellValue::Number(*i as f64),
        Data::Bool(b) => EnumCellValue::Boolean(*b),
        // Excel serial number; formatting is out of scope
        Data::DateTime(dt) => EnumCellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => EnumCellValue::String(s.clone()),
        Data::DurationIso(s) => EnumCellValue::String(s.clone()),
        Data::Error(err) => EnumCellValue::String(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_cell_value_from_data() {
        assert_eq!(derive_cell_value_from_data(&Data::Empty), EnumCellValue::None);
        assert_eq!(
            derive_cell_value_from_data(&Data::Int(25)),
            EnumCellValue::Number(25.0)
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::Bool(true)),
            EnumCellValue::Boolean(true)
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::String("Name".to_string())),
            EnumCellValue::String("Name".to_string())
        );
    }

    #[test]
    fn test_read_missing_file_fails() {
        let err = read_worksheets(Path::new("/nonexistent/dir/book.xlsx")).unwrap_err();
        assert!(matches!(err, XlsxIoError::Read { .. }));
    }
}
