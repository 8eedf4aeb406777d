//! Workbook serializer backed by `rust_xlsxwriter`.

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::spec::{EnumCellValue, XlsxIoError};
use crate::util::{cast_col_num, cast_row_num};
use crate::worksheet::XlsxWorksheet;

/// Serialize `sheets` (in order) into a fresh XLSX file at `path`.
///
/// The file is rebuilt from the in-memory values; nothing is written until every
/// sheet has been converted.
pub fn write_worksheets(sheets: &[XlsxWorksheet], path: &Path) -> Result<(), XlsxIoError> {
    let derive_err = |message: String| XlsxIoError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet.name())
            .map_err(|err| derive_err(derive_xlsx_error_text(err)))?;

        for ((n_row, n_col), value) in sheet.cells() {
            write_cell(worksheet, n_row, n_col, value).map_err(&derive_err)?;
        }
        debug!("serialized sheet {:?}: {} cells", sheet.name(), sheet.len());
    }

    workbook
        .save(path)
        .map_err(|err| derive_err(derive_xlsx_error_text(err)))?;
    debug!("workbook saved to {}", path.display());
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u32,
    value: &EnumCellValue,
) -> Result<(), String> {
    let n_row = cast_row_num(row)?;
    let n_col = cast_col_num(col)?;
    match value {
        _ if value.is_empty() => {}
        EnumCellValue::None => {}
        EnumCellValue::String(val) => {
            worksheet
                .write_string(n_row, n_col, val)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number(n_row, n_col, *val)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet
                .write_boolean(n_row, n_col, *val)
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}
