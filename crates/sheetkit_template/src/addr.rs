//! Cell coordinates, labels and rectangular ranges.
//!
//! Coordinates are 1-based `(row, col)`. Labels use base-26 column letters without a
//! zero digit (`A`=1, `Z`=26, `AA`=27) followed by the row number; `$` markers are
//! accepted and ignored.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use sheetkit_io_xlsx::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};

use crate::conf::{C_CELL_LABEL_PATTERN, C_RANGE_SEPARATOR, N_COL_LETTERS_RADIX};
use crate::spec::{TemplateError, TemplateResult};

static RE_CELL_LABEL: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(C_CELL_LABEL_PATTERN));

////////////////////////////////////////////////////////////////////////////////
// #region Coordinate

/// 1-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub row: u32,
    pub col: u32,
}

impl Coordinate {
    /// Build a coordinate without bounds checks; see [`to_coordinate`] for validation.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Label form, e.g. `"B2"`.
    pub fn label(&self) -> String {
        to_label(*self)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_label(*self))
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

/// A cell given either as a coordinate or as a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRef {
    Coordinate(Coordinate),
    Label(String),
}

impl From<Coordinate> for CellRef {
    fn from(value: Coordinate) -> Self {
        Self::Coordinate(value)
    }
}

impl From<(u32, u32)> for CellRef {
    fn from(value: (u32, u32)) -> Self {
        Self::Coordinate(value.into())
    }
}

impl From<&str> for CellRef {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for CellRef {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinate(coord) => write!(f, "({}, {})", coord.row, coord.col),
            Self::Label(label) => write!(f, "{label:?}"),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Range

/// Normalized rectangle: `top_left` is never below or right of `bottom_right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub top_left: Coordinate,
    pub bottom_right: Coordinate,
}

impl CellRange {
    /// Build from any two corners.
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self {
            top_left: Coordinate::new(a.row.min(b.row), a.col.min(b.col)),
            bottom_right: Coordinate::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Number of rows spanned.
    pub fn height(&self) -> u32 {
        self.bottom_right.row - self.top_left.row + 1
    }

    /// Number of columns spanned.
    pub fn width(&self) -> u32 {
        self.bottom_right.col - self.top_left.col + 1
    }

    /// Whether `coord` lies inside the range, corners included.
    pub fn contains(&self, coord: Coordinate) -> bool {
        (self.top_left.row..=self.bottom_right.row).contains(&coord.row)
            && (self.top_left.col..=self.bottom_right.col).contains(&coord.col)
    }

    /// Every coordinate of the range in row-major order.
    pub fn iter_coordinates(&self) -> impl Iterator<Item = Coordinate> + use<> {
        let (n_col_start, n_col_end) = (self.top_left.col, self.bottom_right.col);
        (self.top_left.row..=self.bottom_right.row)
            .flat_map(move |row| (n_col_start..=n_col_end).map(move |col| Coordinate::new(row, col)))
    }

    /// Span form, e.g. `"F6:AJ11"`.
    pub fn label(&self) -> String {
        format!(
            "{}{C_RANGE_SEPARATOR}{}",
            to_label(self.top_left),
            to_label(self.bottom_right)
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A range given as a span string or as two corner references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRef {
    Span(String),
    Corners(CellRef, CellRef),
}

impl From<&str> for RangeRef {
    fn from(value: &str) -> Self {
        Self::Span(value.to_string())
    }
}

impl From<String> for RangeRef {
    fn from(value: String) -> Self {
        Self::Span(value)
    }
}

impl From<((u32, u32), (u32, u32))> for RangeRef {
    fn from((a, b): ((u32, u32), (u32, u32))) -> Self {
        Self::Corners(a.into(), b.into())
    }
}

impl From<(Coordinate, Coordinate)> for RangeRef {
    fn from((a, b): (Coordinate, Coordinate)) -> Self {
        Self::Corners(a.into(), b.into())
    }
}

impl From<CellRange> for RangeRef {
    fn from(value: CellRange) -> Self {
        Self::Corners(value.top_left.into(), value.bottom_right.into())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Resolve

/// `"A"` -> 1, `"AA"` -> 27. Letters are case-insensitive.
pub fn column_letters_to_index(letters: &str) -> TemplateResult<u32> {
    if letters.is_empty() {
        return Err(TemplateError::InvalidReference(
            "empty column letters".to_string(),
        ));
    }
    let mut n_col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(TemplateError::InvalidReference(format!(
                "{letters:?}: column letters must be A-Z"
            )));
        }
        let n_digit = u32::from(ch.to_ascii_uppercase() as u8 - b'A') + 1;
        n_col = n_col
            .checked_mul(N_COL_LETTERS_RADIX)
            .and_then(|n| n.checked_add(n_digit))
            .ok_or_else(|| {
                TemplateError::InvalidReference(format!("{letters:?}: column out of range"))
            })?;
    }
    if n_col > N_NCOLS_EXCEL_MAX {
        return Err(TemplateError::InvalidReference(format!(
            "{letters:?}: column exceeds Excel maximum {N_NCOLS_EXCEL_MAX}"
        )));
    }
    Ok(n_col)
}

/// 1 -> `"A"`, 27 -> `"AA"`. Column 0 has no letters and yields an empty string.
pub fn column_index_to_letters(col: u32) -> String {
    let mut l_chars = Vec::new();
    let mut n_rem = col;
    while n_rem > 0 {
        let n_digit = (n_rem - 1) % N_COL_LETTERS_RADIX;
        l_chars.push(char::from(b'A' + n_digit as u8));
        n_rem = (n_rem - 1) / N_COL_LETTERS_RADIX;
    }
    l_chars.iter().rev().collect()
}

/// Label of a coordinate.
pub fn to_label(coord: Coordinate) -> String {
    format!("{}{}", column_index_to_letters(coord.col), coord.row)
}

/// Resolve a cell reference into a bounds-checked coordinate.
pub fn to_coordinate(reference: impl Into<CellRef>) -> TemplateResult<Coordinate> {
    match reference.into() {
        CellRef::Coordinate(coord) => validate_coordinate(coord),
        CellRef::Label(label) => parse_label(&label),
    }
}

/// Resolve a range reference into a normalized rectangle.
pub fn resolve_range(reference: impl Into<RangeRef>) -> TemplateResult<CellRange> {
    let (a, b) = match reference.into() {
        RangeRef::Span(span) => {
            let l_parts: Vec<&str> = span.trim().split(C_RANGE_SEPARATOR).collect();
            match l_parts.as_slice() {
                [single] if !single.is_empty() => {
                    let coord = parse_label(single).map_err(|err| derive_range_err(&span, err))?;
                    (coord, coord)
                }
                [first, last] if !first.is_empty() && !last.is_empty() => (
                    parse_label(first).map_err(|err| derive_range_err(&span, err))?,
                    parse_label(last).map_err(|err| derive_range_err(&span, err))?,
                ),
                _ => {
                    return Err(TemplateError::InvalidRange(format!(
                        "{span:?}: expected 'A1:B2'"
                    )));
                }
            }
        }
        RangeRef::Corners(first, last) => {
            let c_span = format!("{first}..{last}");
            (
                to_coordinate(first).map_err(|err| derive_range_err(&c_span, err))?,
                to_coordinate(last).map_err(|err| derive_range_err(&c_span, err))?,
            )
        }
    };
    Ok(CellRange::from_corners(a, b))
}

/// Translate by signed deltas. The result must stay inside the sheet.
pub fn offset(coord: Coordinate, d_row: i64, d_col: i64) -> TemplateResult<Coordinate> {
    let n_row = i64::from(coord.row) + d_row;
    let n_col = i64::from(coord.col) + d_col;
    let (Ok(row), Ok(col)) = (u32::try_from(n_row), u32::try_from(n_col)) else {
        return Err(TemplateError::InvalidReference(format!(
            "offset ({d_row}, {d_col}) from {coord} leaves the sheet"
        )));
    };
    validate_coordinate(Coordinate::new(row, col))
}

fn parse_label(label: &str) -> TemplateResult<Coordinate> {
    let re = RE_CELL_LABEL
        .as_ref()
        .map_err(|err| TemplateError::InvalidReference(format!("{label:?}: {err}")))?;
    let caps = re.captures(label.trim()).ok_or_else(|| {
        TemplateError::InvalidReference(format!("{label:?}: expected a label like 'B2'"))
    })?;
    let n_col = column_letters_to_index(&caps[1])?;
    let n_row = caps[2].parse::<u32>().map_err(|_| {
        TemplateError::InvalidReference(format!("{label:?}: row out of range"))
    })?;
    validate_coordinate(Coordinate::new(n_row, n_col))
        .map_err(|_| TemplateError::InvalidReference(format!("{label:?}: outside the sheet")))
}

fn validate_coordinate(coord: Coordinate) -> TemplateResult<Coordinate> {
    if coord.row == 0
        || coord.col == 0
        || coord.row > N_NROWS_EXCEL_MAX
        || coord.col > N_NCOLS_EXCEL_MAX
    {
        return Err(TemplateError::InvalidReference(format!(
            "({}, {}): row must be in 1..={N_NROWS_EXCEL_MAX}, column in 1..={N_NCOLS_EXCEL_MAX}",
            coord.row, coord.col
        )));
    }
    Ok(coord)
}

fn derive_range_err(span: &str, err: TemplateError) -> TemplateError {
    TemplateError::InvalidRange(format!("{span}: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
