//! Fill a sheet from a normalized table.
//!
//! Named fills align columns with the header labels found at `options.header`;
//! positional fills write columns in declaration order from `options.anchor`.
//! Records run downward (row orientation) or rightward (column orientation).

use std::collections::BTreeSet;

use sheetkit_io_xlsx::util::validate_cell_bounds;
use sheetkit_io_xlsx::XlsxWorksheet;
use tracing::debug;

use crate::addr::Coordinate;
use crate::conf::TUP_DEFAULT_ANCHOR;
use crate::header::{
    derive_cell_position, match_columns, plan_positional, read_header_labels, split_coordinate,
};
use crate::spec::{
    EnumOrientation, SpecFillOptions, SpecFillReport, TemplateError, TemplateResult,
};
use crate::table::SpecTable;

/// Write `table` into `sheet` according to `options`.
///
/// All positions are validated before the first write, so a failing call leaves the
/// sheet unchanged.
pub fn fill(
    sheet: &mut XlsxWorksheet,
    table: &SpecTable,
    options: &SpecFillOptions,
) -> TemplateResult<SpecFillReport> {
    let orientation = options.orientation;
    let mut report = SpecFillReport {
        sheet_name: sheet.name().to_string(),
        n_records: table.height(),
        ..Default::default()
    };

    // Record index of the header (or the one before the positional anchor).
    let (idx_header_record, l_placements) = match options.header {
        Some(header) => {
            let (idx_header_record, idx_field_start) = split_coordinate(orientation, header);
            let l_placements = if table.is_named() {
                let l_labels =
                    read_header_labels(sheet, header, orientation, options.header_stop);
                let matched = match_columns(sheet.name(), &l_labels, table, options)?;
                report.fields_skipped = matched.fields_skipped;
                report.warnings = matched.warnings;
                matched.placements
            } else {
                plan_positional(idx_field_start, table)?
            };
            if let Some(n_start) = options.start_row.filter(|n| *n <= idx_header_record) {
                return Err(TemplateError::InvalidPosition(format!(
                    "start_row must be greater than header_row ({n_start} <= {idx_header_record})"
                )));
            }
            (idx_header_record, l_placements)
        }
        None => {
            let anchor = options
                .anchor
                .unwrap_or_else(|| Coordinate::from(TUP_DEFAULT_ANCHOR));
            let (idx_record, idx_field_start) = split_coordinate(orientation, anchor);
            if options.start_row == Some(0) {
                return Err(TemplateError::InvalidPosition(
                    "start_row must be at least 1".to_string(),
                ));
            }
            (idx_record.saturating_sub(1), plan_positional(idx_field_start, table)?)
        }
    };

    let set_fields: BTreeSet<u32> = l_placements.iter().map(|p| p.idx_field).collect();
    let idx_last_record = derive_last_record(sheet, orientation, idx_header_record, &set_fields);
    let idx_record_start = if options.if_overwrite {
        options.start_row.unwrap_or(idx_header_record + 1)
    } else {
        // Appends never land on existing data.
        options
            .start_row
            .unwrap_or(0)
            .max(idx_last_record + 1)
    };
    report.idx_record_start = idx_record_start;

    let n_height = u32::try_from(table.height()).map_err(|_| {
        TemplateError::InvalidPosition(format!("{} records exceed the sheet", table.height()))
    })?;
    if n_height > 0 {
        validate_footprint(sheet.name(), orientation, idx_record_start, n_height, &set_fields)?;
    }

    debug!(
        "fill {:?}: {} records x {} fields from record {idx_record_start} ({orientation}, last record {idx_last_record})",
        sheet.name(),
        n_height,
        l_placements.len()
    );

    for placement in &l_placements {
        let l_values = &table.columns[placement.idx_table_col].values;
        for (idx_record, value) in (idx_record_start..).zip(l_values) {
            if value.is_empty() && options.if_skip_null {
                continue;
            }
            let (n_row, n_col) = derive_cell_position(orientation, idx_record, placement.idx_field);
            sheet.set_value(n_row, n_col, value.clone())?;
            report.n_cells_written += 1;
        }
    }

    if options.if_overwrite {
        // Records past the new data that belonged to the previous fill.
        let idx_new_end = idx_record_start + n_height - 1;
        for placement in &l_placements {
            for idx_record in (idx_new_end + 1)..=idx_last_record {
                let (n_row, n_col) =
                    derive_cell_position(orientation, idx_record, placement.idx_field);
                if !sheet.is_blank(n_row, n_col) {
                    sheet.clear_value(n_row, n_col);
                    report.n_cells_cleared += 1;
                }
            }
        }
    }

    report.fields_written = l_placements;
    Ok(report)
}

/// Last record holding a value in any of `fields`, or `idx_header_record` when none.
fn derive_last_record(
    sheet: &XlsxWorksheet,
    orientation: EnumOrientation,
    idx_header_record: u32,
    fields: &BTreeSet<u32>,
) -> u32 {
    sheet
        .cells()
        .filter(|(_, value)| !value.is_empty())
        .map(|((n_row, n_col), _)| split_coordinate(orientation, Coordinate::new(n_row, n_col)))
        .filter(|(idx_record, idx_field)| {
            *idx_record > idx_header_record && fields.contains(idx_field)
        })
        .map(|(idx_record, _)| idx_record)
        .max()
        .unwrap_or(idx_header_record)
}

fn validate_footprint(
    sheet_name: &str,
    orientation: EnumOrientation,
    idx_record_start: u32,
    n_height: u32,
    fields: &BTreeSet<u32>,
) -> TemplateResult<()> {
    let idx_record_end = idx_record_start.checked_add(n_height - 1).ok_or_else(|| {
        TemplateError::InvalidPosition(format!(
            "{n_height} records starting at {idx_record_start} exceed the sheet"
        ))
    })?;
    for idx_field in [fields.first(), fields.last()].into_iter().flatten() {
        for idx_record in [idx_record_start, idx_record_end] {
            let (n_row, n_col) = derive_cell_position(orientation, idx_record, *idx_field);
            validate_cell_bounds(sheet_name, n_row, n_col)?;
        }
    }
    Ok(())
}
