//! Shared XLSX value model and error types.

use std::fmt;
use std::path::PathBuf;

use crate::conf::{C_BOOL_FALSE, C_BOOL_TRUE};

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Normalized cell value held by the in-memory workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value (integers are stored as integral floats, as Excel does).
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// True for the blank value, empty strings and non-finite numbers.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.is_empty(),
            Self::Number(n) => !n.is_finite(),
            Self::Boolean(_) => false,
        }
    }

    /// Numeric view: numbers, and text that parses as a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Text view used for header labels and string coercion.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => if *b { C_BOOL_TRUE } else { C_BOOL_FALSE }.to_string(),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    /// `NaN` and infinities have no cell representation and map to blank.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::None
        }
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T> From<Option<T>> for EnumCellValue
where
    T: Into<EnumCellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Render a number the way a spreadsheet displays it: integral values drop `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Workbook store / file errors.
#[derive(Debug, thiserror::Error)]
pub enum XlsxIoError {
    /// Workbook could not be opened or parsed.
    #[error("Failed to read workbook {}: {message}", path.display())]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying reader error text.
        message: String,
    },
    /// Workbook could not be serialized or written.
    #[error("Failed to write workbook {}: {message}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying writer error text.
        message: String,
    },
    /// Sheet name is not present in the workbook.
    #[error("Sheet '{0}' not found.")]
    SheetNotFound(String),
    /// Sheet name is already present in the workbook.
    #[error("Sheet '{0}' already exists.")]
    SheetExists(String),
    /// Sheet name violates Excel naming rules.
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName {
        /// Rejected name.
        name: String,
        /// Violated rule.
        reason: String,
    },
    /// Cell coordinate outside the Excel grid.
    #[error("Cell (row {row}, col {col}) in sheet '{sheet_name}' is outside the Excel grid.")]
    CellOutOfBounds {
        /// Sheet being written.
        sheet_name: String,
        /// 1-based row.
        row: u32,
        /// 1-based column.
        col: u32,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
