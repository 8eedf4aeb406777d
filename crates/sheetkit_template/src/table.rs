//! Tabular input normalization.
//!
//! Every accepted input shape is converted once, at the boundary, into a [`SpecTable`]:
//! an ordered list of equally long columns, each optionally named.

use std::collections::BTreeMap;
use std::io::Cursor;

use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};
use sheetkit_io_xlsx::EnumCellValue;
use tracing::debug;

use crate::spec::{TemplateError, TemplateResult};

////////////////////////////////////////////////////////////////////////////////
// #region TableModel

/// One column of a normalized table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTableColumn {
    /// `None` for positional input.
    pub name: Option<String>,
    pub values: Vec<EnumCellValue>,
}

/// Normalized table: columns in input order, all of the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    pub columns: Vec<SpecTableColumn>,
}

impl SpecTable {
    /// Number of records.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |col| col.values.len())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// True when every column carries a name.
    pub fn is_named(&self) -> bool {
        !self.columns.is_empty() && self.columns.iter().all(|col| col.name.is_some())
    }

    /// Column names in order (unnamed columns are skipped).
    pub fn names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|col| col.name.as_deref())
            .collect()
    }

    /// Position of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.as_deref() == Some(name))
    }
}

/// Accepted tabular input shapes.
#[derive(Debug, Clone)]
pub enum EnumTableInput<'a> {
    /// Polars frame; names are the frame's column names.
    DataFrame(&'a DataFrame),
    /// Polars IPC payload.
    Ipc(&'a [u8]),
    /// Row-oriented records, each with one value per declared column.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<EnumCellValue>>,
    },
    /// Ordered mapping of column name to values.
    Mapping(Vec<(String, Vec<EnumCellValue>)>),
    /// Column value lists with their names declared separately.
    Lists {
        lists: Vec<Vec<EnumCellValue>>,
        columns: Option<Vec<String>>,
    },
    /// Unnamed column value lists, for positional fills.
    Positional(Vec<Vec<EnumCellValue>>),
}

impl<'a> From<&'a DataFrame> for EnumTableInput<'a> {
    fn from(value: &'a DataFrame) -> Self {
        Self::DataFrame(value)
    }
}

impl From<Vec<(String, Vec<EnumCellValue>)>> for EnumTableInput<'_> {
    fn from(value: Vec<(String, Vec<EnumCellValue>)>) -> Self {
        Self::Mapping(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Normalize

/// Convert any accepted input into a [`SpecTable`].
pub fn normalize_table(input: EnumTableInput<'_>) -> TemplateResult<SpecTable> {
    let table = match input {
        EnumTableInput::DataFrame(df) => derive_table_from_dataframe(df)?,
        EnumTableInput::Ipc(v_ipc_df) => {
            let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
            derive_table_from_dataframe(&df)?
        }
        EnumTableInput::Rows { columns, rows } => derive_table_from_rows(columns, rows)?,
        EnumTableInput::Mapping(pairs) => {
            let l_names: Vec<String> = pairs.iter().map(|(name, _)| name.clone()).collect();
            validate_unique_columns(&l_names)?;
            let l_columns = pairs
                .into_iter()
                .map(|(name, values)| SpecTableColumn {
                    name: Some(name),
                    values,
                })
                .collect();
            pad_columns(l_columns, "dictionary")?
        }
        EnumTableInput::Lists { lists, columns } => {
            let Some(l_names) = columns else {
                return Err(TemplateError::ColumnMismatch(
                    "Column names must be provided for List of Lists.".to_string(),
                ));
            };
            if l_names.len() != lists.len() {
                return Err(TemplateError::ColumnMismatch(
                    "List of columns and list of lists have different lengths.".to_string(),
                ));
            }
            validate_unique_columns(&l_names)?;
            let l_columns = l_names
                .into_iter()
                .zip(lists)
                .map(|(name, values)| SpecTableColumn {
                    name: Some(name),
                    values,
                })
                .collect();
            pad_columns(l_columns, "list")?
        }
        EnumTableInput::Positional(lists) => {
            let l_columns = lists
                .into_iter()
                .map(|values| SpecTableColumn { name: None, values })
                .collect();
            pad_columns(l_columns, "list")?
        }
    };

    debug!(
        "normalized table: {} columns x {} records",
        table.width(),
        table.height()
    );
    Ok(table)
}

fn derive_table_from_dataframe(df: &DataFrame) -> TemplateResult<SpecTable> {
    let n_height = df.height();
    let mut l_columns = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let mut values = Vec::with_capacity(n_height);
        for n_idx_row in 0..n_height {
            let value = col
                .get(n_idx_row)
                .map_err(|err| TemplateError::Table(format!("{}: {err}", col.name())))?;
            values.push(derive_cell_value_from_any_value(value));
        }
        l_columns.push(SpecTableColumn {
            name: Some(col.name().to_string()),
            values,
        });
    }
    Ok(SpecTable { columns: l_columns })
}

fn derive_table_from_rows(
    columns: Vec<String>,
    rows: Vec<Vec<EnumCellValue>>,
) -> TemplateResult<SpecTable> {
    validate_unique_columns(&columns)?;
    let n_width = columns.len();
    let mut l_columns: Vec<SpecTableColumn> = columns
        .into_iter()
        .map(|name| SpecTableColumn {
            name: Some(name),
            values: Vec::with_capacity(rows.len()),
        })
        .collect();

    for (n_idx_row, row) in rows.into_iter().enumerate() {
        if row.len() != n_width {
            return Err(TemplateError::LengthMismatch(format!(
                "Row {n_idx_row} has {} values, expected {n_width}.",
                row.len()
            )));
        }
        for (col, value) in l_columns.iter_mut().zip(row) {
            col.values.push(value);
        }
    }
    Ok(SpecTable { columns: l_columns })
}

/// Check that non-empty columns agree on length, then pad empty columns with nulls.
fn pad_columns(mut columns: Vec<SpecTableColumn>, c_kind: &str) -> TemplateResult<SpecTable> {
    let mut n_height: Option<usize> = None;
    for col in columns.iter().filter(|col| !col.values.is_empty()) {
        match n_height {
            None => n_height = Some(col.values.len()),
            Some(n) if n != col.values.len() => {
                return Err(TemplateError::LengthMismatch(format!(
                    "At least one list in the {c_kind} of lists has a different length than the others."
                )));
            }
            Some(_) => {}
        }
    }

    let n_height = n_height.unwrap_or(0);
    for col in columns.iter_mut().filter(|col| col.values.is_empty()) {
        col.values = vec![EnumCellValue::None; n_height];
    }
    Ok(SpecTable { columns })
}

fn validate_unique_columns(columns: &[String]) -> TemplateResult<()> {
    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name.as_str()).or_default().push(n_idx);
    }
    if dict_pos.len() == columns.len() {
        return Ok(());
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} at indices {l_pos:?}"))
        .collect::<Vec<_>>()
        .join("; ");
    Err(TemplateError::ColumnMismatch(format!(
        "Duplicate column names detected: {c_msg}"
    )))
}

fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> TemplateResult<DataFrame> {
    IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| TemplateError::Table(format!("Failed to read IPC DataFrame bytes: {err}")))
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        // NaN and infinities become nulls
        AnyValue::Float32(val) => EnumCellValue::from(val as f64),
        AnyValue::Float64(val) => EnumCellValue::from(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use polars::df;
    use polars::prelude::{IpcWriter, SerWriter};

    use super::*;

    fn derive_values(values: &[i64]) -> Vec<EnumCellValue> {
        values.iter().map(|n| EnumCellValue::from(*n)).collect()
    }

    #[test]
    fn test_dataframe_keeps_names_order_and_types() {
        let df = df!(
            "Name" => ["Alice", "Bob"],
            "Age" => [25i64, 26],
            "Member" => [true, false],
        )
        .unwrap();

        let table = normalize_table(EnumTableInput::DataFrame(&df)).unwrap();
        assert_eq!(table.names(), vec!["Name", "Age", "Member"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.columns[1].values, derive_values(&[25, 26]));
        assert_eq!(table.columns[2].values[0], EnumCellValue::Boolean(true));
    }

    #[test]
    fn test_ipc_payload_is_decoded() {
        let mut df = df!("Name" => ["Alice"], "Age" => [25i64]).unwrap();
        let mut v_ipc_df: Vec<u8> = Vec::new();
        IpcWriter::new(&mut v_ipc_df).finish(&mut df).unwrap();

        let table = normalize_table(EnumTableInput::Ipc(&v_ipc_df)).unwrap();
        assert_eq!(table.names(), vec!["Name", "Age"]);
        assert_eq!(table.columns[1].values, derive_values(&[25]));

        assert!(matches!(
            normalize_table(EnumTableInput::Ipc(b"not ipc")),
            Err(TemplateError::Table(_))
        ));
    }

    #[test]
    fn test_rows_are_transposed_into_columns() {
        let table = normalize_table(EnumTableInput::Rows {
            columns: vec!["Name".to_string(), "Age".to_string()],
            rows: vec![
                vec!["Alice".into(), 25i64.into()],
                vec!["Bob".into(), 26i64.into()],
            ],
        })
        .unwrap();
        assert_eq!(table.columns[0].values, vec!["Alice".into(), "Bob".into()]);

        let err = normalize_table(EnumTableInput::Rows {
            columns: vec!["Name".to_string(), "Age".to_string()],
            rows: vec![vec!["Alice".into()]],
        })
        .unwrap_err();
        assert!(matches!(err, TemplateError::LengthMismatch(_)));
    }

    #[test]
    fn test_non_finite_floats_become_nulls() {
        let df = df!(
            "Age" => [f64::NAN, f64::INFINITY, 30.5],
            "Score" => [f32::NEG_INFINITY, 1.5f32, f32::NAN],
        )
        .unwrap();

        let table = normalize_table(EnumTableInput::DataFrame(&df)).unwrap();
        assert_eq!(
            table.columns[0].values,
            vec![EnumCellValue::None, EnumCellValue::None, EnumCellValue::Number(30.5)]
        );
        assert_eq!(
            table.columns[1].values,
            vec![EnumCellValue::None, EnumCellValue::Number(1.5), EnumCellValue::None]
        );
    }

    #[test]
    fn test_mapping_pads_empty_columns() {
        let table = normalize_table(EnumTableInput::Mapping(vec![
            ("Name".to_string(), vec!["Alice".into(), "Bob".into()]),
            ("Gender".to_string(), vec![]),
        ]))
        .unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.columns[1].values, vec![EnumCellValue::None; 2]);
    }

    #[test]
    fn test_mapping_rejects_ragged_and_duplicate_columns() {
        let err = normalize_table(EnumTableInput::Mapping(vec![
            ("Name".to_string(), vec!["Alice".into(), "Bob".into()]),
            ("Age".to_string(), derive_values(&[25])),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one list in the dictionary of lists has a different length than the others."
        );

        let err = normalize_table(EnumTableInput::Mapping(vec![
            ("Name".to_string(), vec!["Alice".into()]),
            ("Name".to_string(), vec!["Bob".into()]),
        ]))
        .unwrap_err();
        assert!(matches!(err, TemplateError::ColumnMismatch(_)));
    }

    #[test]
    fn test_lists_require_matching_column_names() {
        let lists = vec![derive_values(&[1, 2]), derive_values(&[3, 4])];

        let err = normalize_table(EnumTableInput::Lists {
            lists: lists.clone(),
            columns: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Column names must be provided for List of Lists.");

        let err = normalize_table(EnumTableInput::Lists {
            lists: lists.clone(),
            columns: Some(vec!["A".to_string()]),
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "List of columns and list of lists have different lengths."
        );

        let table = normalize_table(EnumTableInput::Lists {
            lists,
            columns: Some(vec!["A".to_string(), "B".to_string()]),
        })
        .unwrap();
        assert_eq!(table.position("B"), Some(1));
    }

    #[test]
    fn test_positional_columns_are_unnamed() {
        let err = normalize_table(EnumTableInput::Positional(vec![
            derive_values(&[1, 2]),
            derive_values(&[3, 4, 5]),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one list in the list of lists has a different length than the others."
        );

        let table =
            normalize_table(EnumTableInput::Positional(vec![derive_values(&[1, 2])])).unwrap();
        assert!(!table.is_named());
        assert_eq!(table.width(), 1);
    }
}
