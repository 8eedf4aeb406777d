//! Header label discovery and column alignment.
//!
//! A header is a run of labels starting at an anchor cell and running rightward (row
//! orientation) or downward (column orientation). "Field" below means the axis the
//! labels run along: a sheet column for row orientation, a sheet row otherwise.

use std::collections::BTreeMap;

use sheetkit_io_xlsx::XlsxWorksheet;
use tracing::{debug, warn};

use crate::addr::Coordinate;
use crate::spec::{
    EnumOrientation, SpecColumnPlacement, SpecFillOptions, TemplateError, TemplateResult,
};
use crate::table::SpecTable;

/// One header label and the field it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderLabel {
    pub idx_field: u32,
    pub label: String,
}

/// Result of aligning a named table with a header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecHeaderMatch {
    /// Matched columns in table order.
    pub placements: Vec<SpecColumnPlacement>,
    /// Incoming columns without a label.
    pub fields_skipped: Vec<String>,
    pub warnings: Vec<String>,
}

/// Sheet `(row, col)` of a record/field pair.
pub(crate) fn derive_cell_position(
    orientation: EnumOrientation,
    idx_record: u32,
    idx_field: u32,
) -> (u32, u32) {
    match orientation {
        EnumOrientation::Row => (idx_record, idx_field),
        EnumOrientation::Column => (idx_field, idx_record),
    }
}

/// `(record, field)` split of a coordinate.
pub(crate) fn split_coordinate(orientation: EnumOrientation, coord: Coordinate) -> (u32, u32) {
    match orientation {
        EnumOrientation::Row => (coord.row, coord.col),
        EnumOrientation::Column => (coord.col, coord.row),
    }
}

/// Read labels from `anchor` until the first blank cell, or until field `stop`
/// (inclusive) when given.
pub fn read_header_labels(
    sheet: &XlsxWorksheet,
    anchor: Coordinate,
    orientation: EnumOrientation,
    stop: Option<u32>,
) -> Vec<SpecHeaderLabel> {
    let (idx_record, idx_field_start) = split_coordinate(orientation, anchor);
    let mut l_labels = Vec::new();
    let mut idx_field = idx_field_start;
    loop {
        if stop.is_some_and(|n_stop| idx_field > n_stop) {
            break;
        }
        let (n_row, n_col) = derive_cell_position(orientation, idx_record, idx_field);
        let value = sheet.get_value(n_row, n_col);
        if value.is_empty() {
            break;
        }
        l_labels.push(SpecHeaderLabel {
            idx_field,
            label: value.to_text(),
        });
        let Some(n_next) = idx_field.checked_add(1) else {
            break;
        };
        idx_field = n_next;
    }
    debug!(
        "header at {anchor} ({orientation}) in {:?}: {} labels",
        sheet.name(),
        l_labels.len()
    );
    l_labels
}

/// Align named table columns with header labels.
///
/// Header labels are checked against the data first (`if_strict`), then data columns
/// against the header (`if_strict_columns`). Duplicate labels resolve to the first one.
pub fn match_columns(
    sheet_name: &str,
    labels: &[SpecHeaderLabel],
    table: &SpecTable,
    options: &SpecFillOptions,
) -> TemplateResult<SpecHeaderMatch> {
    let mut result = SpecHeaderMatch::default();

    let mut dict_label_field: BTreeMap<&str, u32> = BTreeMap::new();
    for spec_label in labels {
        if dict_label_field.contains_key(spec_label.label.as_str()) {
            let c_msg = format!(
                "Duplicate header label '{}' in {sheet_name}; using the first occurrence.",
                spec_label.label
            );
            warn!("{c_msg}");
            result.warnings.push(c_msg);
            continue;
        }
        dict_label_field.insert(spec_label.label.as_str(), spec_label.idx_field);
    }

    if options.if_strict {
        for spec_label in labels {
            if table.position(&spec_label.label).is_none() {
                return Err(TemplateError::MissingColumn {
                    sheet_name: sheet_name.to_string(),
                    column: spec_label.label.clone(),
                    message: format!(
                        "Header '{}' in {sheet_name} is missing in the data.",
                        spec_label.label
                    ),
                });
            }
        }
    }

    for (idx_table_col, col) in table.columns.iter().enumerate() {
        let Some(c_name) = col.name.as_deref() else {
            continue;
        };
        match dict_label_field.get(c_name) {
            Some(idx_field) => result.placements.push(SpecColumnPlacement {
                idx_table_col,
                name: Some(c_name.to_string()),
                idx_field: *idx_field,
            }),
            None if options.if_strict_columns => {
                return Err(TemplateError::MissingColumn {
                    sheet_name: sheet_name.to_string(),
                    column: c_name.to_string(),
                    message: format!("Column '{c_name}' is missing in the header of {sheet_name}."),
                });
            }
            None => {
                let c_msg = format!("Column '{c_name}' is not in the header of {sheet_name}; skipped.");
                warn!("{c_msg}");
                result.warnings.push(c_msg);
                result.fields_skipped.push(c_name.to_string());
            }
        }
    }
    Ok(result)
}

/// Place columns in declaration order starting at field `idx_field_start`.
pub fn plan_positional(
    idx_field_start: u32,
    table: &SpecTable,
) -> TemplateResult<Vec<SpecColumnPlacement>> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(idx_table_col, col)| {
            let idx_field = u32::try_from(idx_table_col)
                .ok()
                .and_then(|n| idx_field_start.checked_add(n))
                .ok_or_else(|| {
                    TemplateError::InvalidPosition(format!(
                        "Column {idx_table_col} does not fit after field {idx_field_start}."
                    ))
                })?;
            Ok(SpecColumnPlacement {
                idx_table_col,
                name: col.name.clone(),
                idx_field,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sheetkit_io_xlsx::EnumCellValue;

    use super::*;
    use crate::table::{EnumTableInput, normalize_table};

    fn derive_sheet() -> XlsxWorksheet {
        let mut sheet = XlsxWorksheet::new("Sheet1");
        for (n_col, c_label) in ["Name", "Age", "Gender"].iter().enumerate() {
            sheet.set_value(3, n_col as u32 + 1, *c_label).unwrap();
        }
        sheet
    }

    fn derive_table(names: &[&str]) -> SpecTable {
        normalize_table(EnumTableInput::Mapping(
            names
                .iter()
                .map(|name| (name.to_string(), vec![EnumCellValue::from("x")]))
                .collect(),
        ))
        .unwrap()
    }

    #[test]
    fn test_read_header_labels_stops_at_blank_or_stop() {
        let sheet = derive_sheet();
        let l_labels = read_header_labels(&sheet, Coordinate::new(3, 1), EnumOrientation::Row, None);
        let l_text: Vec<&str> = l_labels.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(l_text, vec!["Name", "Age", "Gender"]);
        assert_eq!(l_labels[2].idx_field, 3);

        let l_labels =
            read_header_labels(&sheet, Coordinate::new(3, 1), EnumOrientation::Row, Some(2));
        assert_eq!(l_labels.len(), 2);
    }

    #[test]
    fn test_read_header_labels_column_orientation() {
        let mut sheet = XlsxWorksheet::new("S");
        sheet.set_value(2, 1, "Name").unwrap();
        sheet.set_value(3, 1, "Age").unwrap();
        let l_labels =
            read_header_labels(&sheet, Coordinate::new(2, 1), EnumOrientation::Column, None);
        assert_eq!(l_labels.len(), 2);
        assert_eq!(l_labels[1].idx_field, 3);
    }

    #[test]
    fn test_match_columns_strict_header_names_missing_label() {
        let sheet = derive_sheet();
        let l_labels = read_header_labels(&sheet, Coordinate::new(3, 1), EnumOrientation::Row, None);
        let table = derive_table(&["Age", "Gender"]);
        let options = SpecFillOptions {
            if_strict: true,
            ..Default::default()
        };

        let err = match_columns("Sheet1", &l_labels, &table, &options).unwrap_err();
        assert_eq!(err.to_string(), "Header 'Name' in Sheet1 is missing in the data.");
    }

    #[test]
    fn test_match_columns_strict_data_names_missing_column() {
        let sheet = derive_sheet();
        let l_labels = read_header_labels(&sheet, Coordinate::new(3, 1), EnumOrientation::Row, None);
        let table = derive_table(&["Name", "Email"]);
        let options = SpecFillOptions {
            if_strict_columns: true,
            ..Default::default()
        };

        let err = match_columns("Sheet1", &l_labels, &table, &options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column 'Email' is missing in the header of Sheet1."
        );
    }

    #[test]
    fn test_match_columns_lenient_skips_unknown_columns() {
        let sheet = derive_sheet();
        let l_labels = read_header_labels(&sheet, Coordinate::new(3, 1), EnumOrientation::Row, None);
        let table = derive_table(&["Gender", "Email", "Name"]);

        let result =
            match_columns("Sheet1", &l_labels, &table, &SpecFillOptions::default()).unwrap();
        let l_fields: Vec<u32> = result.placements.iter().map(|p| p.idx_field).collect();
        assert_eq!(l_fields, vec![3, 1]);
        assert_eq!(result.fields_skipped, vec!["Email".to_string()]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_duplicate_labels_resolve_to_first() {
        let mut sheet = XlsxWorksheet::new("S");
        sheet.set_value(1, 1, "Name").unwrap();
        sheet.set_value(1, 2, "Name").unwrap();
        let l_labels = read_header_labels(&sheet, Coordinate::new(1, 1), EnumOrientation::Row, None);
        let table = derive_table(&["Name"]);

        let result = match_columns("S", &l_labels, &table, &SpecFillOptions::default()).unwrap();
        assert_eq!(result.placements[0].idx_field, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_labels_match_exact_cell_text() {
        let mut sheet = XlsxWorksheet::new("S");
        sheet.set_value(1, 1, "Name ").unwrap();
        let l_labels = read_header_labels(&sheet, Coordinate::new(1, 1), EnumOrientation::Row, None);
        assert_eq!(l_labels[0].label, "Name ");

        let options = SpecFillOptions {
            if_strict: true,
            ..Default::default()
        };
        let result = match_columns("S", &l_labels, &derive_table(&["Name "]), &options).unwrap();
        assert_eq!(result.placements.len(), 1);
        assert!(result.fields_skipped.is_empty());

        let result =
            match_columns("S", &l_labels, &derive_table(&["Name"]), &SpecFillOptions::default())
                .unwrap();
        assert!(result.placements.is_empty());
        assert_eq!(result.fields_skipped, vec!["Name".to_string()]);
    }

    #[test]
    fn test_plan_positional() {
        let table = derive_table(&["A", "B"]);
        let l_placements = plan_positional(4, &table).unwrap();
        assert_eq!(l_placements[1].idx_field, 5);
        assert_eq!(l_placements[1].idx_table_col, 1);
    }
}
