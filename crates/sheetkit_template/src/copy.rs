//! Range copy with optional transpose and per-cell coercion.
//!
//! Copies are planned in full against the source before the destination is touched,
//! so a coercion failure leaves the destination unchanged and a sheet can be copied
//! onto itself.

use sheetkit_io_xlsx::{EnumCellValue, XlsxWorksheet};
use tracing::debug;

use crate::addr::{CellRange, Coordinate, offset};
use crate::spec::{
    EnumCoerceKind, SpecCopyOptions, SpecWritePlan, TemplateError, TemplateResult,
};

/// Convert one value to `kind`. Blank values stay blank.
pub fn coerce_value(
    value: &EnumCellValue,
    kind: EnumCoerceKind,
    cell: Coordinate,
) -> TemplateResult<EnumCellValue> {
    if value.is_empty() {
        return Ok(EnumCellValue::None);
    }
    let derive_err = || TemplateError::CoercionError {
        cell: cell.label(),
        value: value.to_text(),
        kind,
    };
    let derive_number = || match value {
        EnumCellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => value.as_f64(),
    };

    match kind {
        EnumCoerceKind::None => Ok(value.clone()),
        EnumCoerceKind::Integer => derive_number()
            .map(|n| EnumCellValue::Number(n.trunc()))
            .ok_or_else(derive_err),
        EnumCoerceKind::Float => derive_number()
            .map(EnumCellValue::Number)
            .ok_or_else(derive_err),
        EnumCoerceKind::String => Ok(EnumCellValue::String(value.to_text())),
    }
}

/// Destination of source cell `coord` when `range` is copied to `anchor`.
pub fn derive_destination(
    range: &CellRange,
    coord: Coordinate,
    anchor: Coordinate,
    if_transpose: bool,
) -> TemplateResult<Coordinate> {
    let d_row = i64::from(coord.row) - i64::from(range.top_left.row);
    let d_col = i64::from(coord.col) - i64::from(range.top_left.col);
    if if_transpose {
        offset(anchor, d_col, d_row)
    } else {
        offset(anchor, d_row, d_col)
    }
}

/// Compute every destination write without touching any sheet.
pub fn plan_copy(
    source: &XlsxWorksheet,
    range: &CellRange,
    anchor: Coordinate,
    options: &SpecCopyOptions,
) -> TemplateResult<SpecWritePlan> {
    let mut plan = SpecWritePlan::default();
    for coord in range.iter_coordinates() {
        let value = source.get_value(coord.row, coord.col);
        if value.is_empty() && options.if_skip_empty {
            plan.n_cells_skipped += 1;
            continue;
        }
        let dest = derive_destination(range, coord, anchor, options.if_transpose)?;
        let value = coerce_value(value, options.coerce, coord)?;
        plan.writes.push((dest, value));
    }
    debug!(
        "planned copy of {range} from {:?} to {anchor}: {} writes, {} skipped (transpose: {}, coerce: {})",
        source.name(),
        plan.writes.len(),
        plan.n_cells_skipped,
        options.if_transpose,
        options.coerce
    );
    Ok(plan)
}

/// Write a computed plan into `dest`.
pub fn apply_write_plan(dest: &mut XlsxWorksheet, plan: &SpecWritePlan) -> TemplateResult<()> {
    for (coord, value) in &plan.writes {
        dest.set_value(coord.row, coord.col, value.clone())?;
    }
    Ok(())
}

/// Copy `range` of `source` into `dest` at `anchor`.
pub fn copy_range(
    source: &XlsxWorksheet,
    range: &CellRange,
    dest: &mut XlsxWorksheet,
    anchor: Coordinate,
    options: &SpecCopyOptions,
) -> TemplateResult<SpecWritePlan> {
    let plan = plan_copy(source, range, anchor, options)?;
    apply_write_plan(dest, &plan)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::{resolve_range, to_coordinate};

    fn derive_source() -> XlsxWorksheet {
        let mut sheet = XlsxWorksheet::new("Sheet1");
        sheet.set_value(1, 1, "First row").unwrap();
        sheet.set_value(2, 1, "Second row").unwrap();
        for (n_row, l_values) in [(2u32, [25i64, 26]), (3, [27, 28]), (4, [29, 30])] {
            sheet.set_value(n_row, 2, l_values[0]).unwrap();
            sheet.set_value(n_row, 3, l_values[1]).unwrap();
        }
        sheet.set_value(5, 2, "1234.56").unwrap();
        sheet
    }

    fn value_at(sheet: &XlsxWorksheet, label: &str) -> EnumCellValue {
        let coord = to_coordinate(label).unwrap();
        sheet.get_value(coord.row, coord.col).clone()
    }

    #[test]
    fn test_identity_copy_preserves_relative_positions() {
        let source = derive_source();
        let mut dest = XlsxWorksheet::new("Dest");
        let range = resolve_range("A1:C4").unwrap();

        let plan = copy_range(
            &source,
            &range,
            &mut dest,
            to_coordinate("E10").unwrap(),
            &SpecCopyOptions::default(),
        )
        .unwrap();
        assert_eq!(value_at(&dest, "E10"), EnumCellValue::from("First row"));
        assert_eq!(value_at(&dest, "F11"), EnumCellValue::Number(25.0));
        assert_eq!(value_at(&dest, "G13"), EnumCellValue::Number(30.0));
        // B1, C1, A3, A4 are blank in the source.
        assert_eq!(plan.n_cells_skipped, 4);
        assert_eq!(plan.footprint().unwrap().label(), "E10:G13");
    }

    #[test]
    fn test_transpose_swaps_rows_and_columns() {
        let source = derive_source();
        let mut dest = XlsxWorksheet::new("Dest");
        let range = resolve_range(((1, 1), (5, 3))).unwrap();
        let options = SpecCopyOptions {
            if_transpose: true,
            ..Default::default()
        };

        copy_range(&source, &range, &mut dest, Coordinate::new(10, 20), &options).unwrap();
        assert_eq!(value_at(&dest, "T10"), EnumCellValue::from("First row"));
        assert_eq!(value_at(&dest, "U10"), EnumCellValue::from("Second row"));
        assert_eq!(value_at(&dest, "U11"), EnumCellValue::Number(25.0));
        assert_eq!(value_at(&dest, "U12"), EnumCellValue::Number(26.0));
        assert_eq!(value_at(&dest, "W11"), EnumCellValue::Number(29.0));
        assert_eq!(value_at(&dest, "X11"), EnumCellValue::from("1234.56"));
    }

    #[test]
    fn test_integer_coercion_truncates() {
        let source = derive_source();
        let mut dest = XlsxWorksheet::new("Dest");
        let range = resolve_range("B2:C5").unwrap();
        let options = SpecCopyOptions {
            coerce: EnumCoerceKind::Integer,
            ..Default::default()
        };

        copy_range(&source, &range, &mut dest, Coordinate::new(1, 1), &options).unwrap();
        assert_eq!(value_at(&dest, "A4"), EnumCellValue::Number(1234.0));
        assert_eq!(value_at(&dest, "B1"), EnumCellValue::Number(26.0));
    }

    #[test]
    fn test_coercion_failure_leaves_destination_unchanged() {
        let source = derive_source();
        let mut dest = XlsxWorksheet::new("Dest");
        dest.set_value(1, 1, "keep").unwrap();
        let before = dest.clone();
        let range = resolve_range("A1:C4").unwrap();
        let options = SpecCopyOptions {
            coerce: EnumCoerceKind::Float,
            ..Default::default()
        };

        let err = copy_range(&source, &range, &mut dest, Coordinate::new(1, 1), &options)
            .unwrap_err();
        assert!(matches!(
            &err,
            TemplateError::CoercionError { cell, kind: EnumCoerceKind::Float, .. } if cell == "A1"
        ));
        assert_eq!(dest, before);
    }

    #[test]
    fn test_coerce_value_kinds() {
        let cell = Coordinate::new(1, 1);
        assert_eq!(
            coerce_value(&EnumCellValue::Boolean(true), EnumCoerceKind::Integer, cell).unwrap(),
            EnumCellValue::Number(1.0)
        );
        assert_eq!(
            coerce_value(&EnumCellValue::Number(-2.7), EnumCoerceKind::Integer, cell).unwrap(),
            EnumCellValue::Number(-2.0)
        );
        assert_eq!(
            coerce_value(&EnumCellValue::Number(25.0), EnumCoerceKind::String, cell).unwrap(),
            EnumCellValue::from("25")
        );
        assert_eq!(
            coerce_value(&EnumCellValue::None, EnumCoerceKind::Float, cell).unwrap(),
            EnumCellValue::None
        );
    }

    #[test]
    fn test_blank_sources_clear_when_not_skipped() {
        let source = derive_source();
        let mut dest = XlsxWorksheet::new("Dest");
        dest.set_value(1, 2, "stale").unwrap();
        let options = SpecCopyOptions {
            if_skip_empty: false,
            ..Default::default()
        };

        copy_range(&source, &resolve_range("A1:B1").unwrap(), &mut dest, Coordinate::new(1, 1), &options)
            .unwrap();
        assert_eq!(value_at(&dest, "B1"), EnumCellValue::None);
    }

    #[test]
    fn test_destination_outside_sheet_is_rejected() {
        let source = derive_source();
        let range = resolve_range("A1:C4").unwrap();
        let anchor = Coordinate::new(sheetkit_io_xlsx::N_NROWS_EXCEL_MAX, 1);
        assert!(matches!(
            plan_copy(&source, &range, anchor, &SpecCopyOptions::default()),
            Err(TemplateError::InvalidReference(_))
        ));
    }
}
