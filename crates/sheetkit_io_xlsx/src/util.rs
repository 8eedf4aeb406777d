//! Stateless helper utilities used by the workbook store, reader and writer.

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::XlsxIoError;

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Reject names Excel would refuse instead of silently rewriting them.
pub fn validate_sheet_name(name: &str) -> Result<(), XlsxIoError> {
    let derive_err = |reason: String| XlsxIoError::InvalidSheetName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(derive_err("name must not be blank".to_string()));
    }
    if name.chars().count() > N_LEN_EXCEL_SHEET_NAME_MAX {
        return Err(derive_err(format!(
            "name must be at most {N_LEN_EXCEL_SHEET_NAME_MAX} characters"
        )));
    }
    if let Some(c_illegal) = TUP_EXCEL_ILLEGAL.iter().find(|c| name.contains(**c)) {
        return Err(derive_err(format!("name must not contain {c_illegal:?}")));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(derive_err(
            "name must not start or end with an apostrophe".to_string(),
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridBounds

/// Check a 1-based coordinate against the Excel grid.
pub fn validate_cell_bounds(sheet_name: &str, row: u32, col: u32) -> Result<(), XlsxIoError> {
    if row == 0 || col == 0 || row > N_NROWS_EXCEL_MAX || col > N_NCOLS_EXCEL_MAX {
        return Err(XlsxIoError::CellOutOfBounds {
            sheet_name: sheet_name.to_string(),
            row,
            col,
        });
    }
    Ok(())
}

/// 1-based row to the 0-based `u32` row used by `rust_xlsxwriter`.
pub fn cast_row_num(row: u32) -> Result<u32, String> {
    row.checked_sub(1)
        .ok_or_else(|| format!("row index underflow: {row}"))
}

/// 1-based column to the 0-based `u16` column used by `rust_xlsxwriter`.
pub fn cast_col_num(col: u32) -> Result<u16, String> {
    let n_col = col
        .checked_sub(1)
        .ok_or_else(|| format!("column index underflow: {col}"))?;
    u16::try_from(n_col).map_err(|_| format!("column index overflow: {col}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
