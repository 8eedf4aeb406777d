//! Template option models, reports and error types.

use std::fmt;
use std::str::FromStr;

use sheetkit_io_xlsx::{EnumCellValue, XlsxIoError};

use crate::addr::{CellRange, CellRef, Coordinate};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Which axis holds the header labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumOrientation {
    /// Labels run along a row; records are appended downward (default).
    #[default]
    Row,
    /// Labels run down a column; records are appended rightward.
    Column,
}

impl fmt::Display for EnumOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "col"),
        }
    }
}

impl FromStr for EnumOrientation {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row" => Ok(Self::Row),
            "col" | "column" => Ok(Self::Column),
            _ => Err(TemplateError::InvalidOption(format!(
                "Invalid mode {s:?}. Use 'row' or 'col'."
            ))),
        }
    }
}

/// Reduction applied to each row/column slice of an aggregated range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAggregateAction {
    /// Arithmetic sum of numeric values (default).
    #[default]
    Sum,
    /// Arithmetic mean over numeric values; blank when there are none.
    Average,
    /// Number of numeric values.
    Count,
}

impl fmt::Display for EnumAggregateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Average => write!(f, "avg"),
            Self::Count => write!(f, "count"),
        }
    }
}

impl FromStr for EnumAggregateAction {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "avg" | "average" | "mean" => Ok(Self::Average),
            "count" => Ok(Self::Count),
            _ => Err(TemplateError::InvalidOption(format!(
                "Invalid action {s:?}. Use 'sum', 'avg' or 'count'."
            ))),
        }
    }
}

/// Scalar kind copied values are converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCoerceKind {
    /// Copy verbatim (default).
    #[default]
    None,
    /// Numeric, truncated toward zero.
    Integer,
    /// Numeric.
    Float,
    /// Text.
    String,
}

impl fmt::Display for EnumCoerceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
        }
    }
}

impl FromStr for EnumCoerceKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "int" | "integer" => Ok(Self::Integer),
            "float" | "double" => Ok(Self::Float),
            "str" | "string" => Ok(Self::String),
            _ => Err(TemplateError::InvalidOption(format!(
                "Invalid coercion {s:?}. Use 'int/integer', 'float/double' or 'str/string'."
            ))),
        }
    }
}

/// Where the header labels of a template sheet start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumHeaderLocation {
    /// Cell `A1`.
    First,
    /// Last used row (row orientation) or last used column (column orientation).
    Last,
    /// Explicit first label cell.
    Cell(CellRef),
}

impl From<CellRef> for EnumHeaderLocation {
    fn from(value: CellRef) -> Self {
        Self::Cell(value)
    }
}

impl From<Coordinate> for EnumHeaderLocation {
    fn from(value: Coordinate) -> Self {
        Self::Cell(value.into())
    }
}

impl From<&str> for EnumHeaderLocation {
    fn from(value: &str) -> Self {
        Self::Cell(value.into())
    }
}

impl From<(u32, u32)> for EnumHeaderLocation {
    fn from(value: (u32, u32)) -> Self {
        Self::Cell(value.into())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Options for one fill call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecFillOptions {
    /// First header label. `None` selects positional (unnamed) mode.
    pub header: Option<Coordinate>,
    /// Positional mode anchor; defaults to `A1`.
    pub anchor: Option<Coordinate>,
    /// First record index (a row, or a column under column orientation).
    pub start_row: Option<u32>,
    /// Last field index scanned for header labels (inclusive).
    pub header_stop: Option<u32>,
    /// Header axis.
    pub orientation: EnumOrientation,
    /// Write from the declared start instead of appending below existing data.
    pub if_overwrite: bool,
    /// Leave destination cells untouched for null incoming values.
    pub if_skip_null: bool,
    /// Every header label must be supplied by the data.
    pub if_strict: bool,
    /// Every named data column must match a header label.
    pub if_strict_columns: bool,
}

/// Options for range copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyOptions {
    /// Swap row and column deltas: source rows become destination columns.
    pub if_transpose: bool,
    /// Per-cell conversion.
    pub coerce: EnumCoerceKind,
    /// Leave the destination untouched where the source cell is blank.
    pub if_skip_empty: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            if_transpose: false,
            coerce: EnumCoerceKind::None,
            if_skip_empty: true,
        }
    }
}

/// Options for range aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecAggregateOptions {
    /// Reduction.
    pub action: EnumAggregateAction,
    /// `Row`: one result per source row, written downward.
    /// `Column`: one result per source column, written rightward.
    pub orientation: EnumOrientation,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PlansAndReports

/// Destination of one incoming column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnPlacement {
    /// Column position inside the normalized table.
    pub idx_table_col: usize,
    /// Column name when the table is named.
    pub name: Option<String>,
    /// Destination field index (a sheet column, or a row under column orientation).
    pub idx_field: u32,
}

/// Cell writes computed before touching the destination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecWritePlan {
    /// `(destination, value)` in source scan order.
    pub writes: Vec<(Coordinate, EnumCellValue)>,
    /// Source cells left out of the plan (blank sources).
    pub n_cells_skipped: usize,
}

impl SpecWritePlan {
    /// Bounding box of the destination cells, `None` for an empty plan.
    pub fn footprint(&self) -> Option<CellRange> {
        let mut it_coords = self.writes.iter().map(|(coord, _)| *coord);
        let first = it_coords.next()?;
        let (mut top_left, mut bottom_right) = (first, first);
        for coord in it_coords {
            top_left.row = top_left.row.min(coord.row);
            top_left.col = top_left.col.min(coord.col);
            bottom_right.row = bottom_right.row.max(coord.row);
            bottom_right.col = bottom_right.col.max(coord.col);
        }
        Some(CellRange {
            top_left,
            bottom_right,
        })
    }
}

/// Per-call fill report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecFillReport {
    /// Filled sheet.
    pub sheet_name: String,
    /// First record index written.
    pub idx_record_start: u32,
    /// Number of records in the incoming table.
    pub n_records: usize,
    /// Placement of every written column.
    pub fields_written: Vec<SpecColumnPlacement>,
    /// Incoming columns without a header match (non-strict mode).
    pub fields_skipped: Vec<String>,
    /// Cells written with a value or blanked by a null.
    pub n_cells_written: usize,
    /// Stale cells blanked past the new data under overwrite.
    pub n_cells_cleared: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Template engine errors.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Malformed cell label or coordinate.
    #[error("Invalid cell reference {0}")]
    InvalidReference(String),
    /// Malformed range span.
    #[error("Invalid range {0}")]
    InvalidRange(String),
    /// Missing or mismatched column declarations for tabular input.
    #[error("{0}")]
    ColumnMismatch(String),
    /// Unequal column lengths within one table.
    #[error("{0}")]
    LengthMismatch(String),
    /// Strict reconciliation failure.
    #[error("{message}")]
    MissingColumn {
        /// Sheet being filled.
        sheet_name: String,
        /// Absent header label or incoming column.
        column: String,
        /// Human-readable description.
        message: String,
    },
    /// Start position not after the header.
    #[error("{0}")]
    InvalidPosition(String),
    /// Sheet absent from the workbook.
    #[error("Sheet '{0}' not found.")]
    UnknownSheet(String),
    /// Sheet name already taken.
    #[error("Sheet '{0}' already exists.")]
    DuplicateSheet(String),
    /// Copied value cannot be converted.
    #[error("Value {value:?} at {cell} cannot be coerced to {kind}.")]
    CoercionError {
        /// Source cell label.
        cell: String,
        /// Offending value.
        value: String,
        /// Requested kind.
        kind: EnumCoerceKind,
    },
    /// Unknown option keyword.
    #[error("{0}")]
    InvalidOption(String),
    /// Cursor has no current sheet.
    #[error("No sheet specified. Use goto_sheet to set the sheet.")]
    NoActiveSheet,
    /// Cursor has no current cell.
    #[error("No cell specified in {0}. Use goto_cell to set the cell.")]
    NoActiveCell(String),
    /// Tabular input could not be decoded.
    #[error("Failed to read table: {0}")]
    Table(String),
    /// Workbook store or file error.
    #[error(transparent)]
    Io(XlsxIoError),
}

impl From<XlsxIoError> for TemplateError {
    fn from(err: XlsxIoError) -> Self {
        match err {
            XlsxIoError::SheetNotFound(name) => Self::UnknownSheet(name),
            XlsxIoError::SheetExists(name) => Self::DuplicateSheet(name),
            other => Self::Io(other),
        }
    }
}

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
