//! `sheetkit_template` v1:
//! Template-driven range engine over an in-memory XLSX workbook.
//!
//! Modules:
//! - `conf`      : constants (label grammar, default anchor)
//! - `spec`      : option structs, reports and errors
//! - `addr`      : coordinate/label/range resolution
//! - `table`     : tabular input normalization (polars, mappings, lists)
//! - `header`    : header label discovery and column alignment
//! - `fill`      : table-to-sheet fill (append / overwrite / skip-null)
//! - `copy`      : range copy with transpose and coercion
//! - `aggregate` : row/column sum, average and count
//! - `template`  : stateful cursor over a workbook
pub mod addr;
pub mod aggregate;
pub mod conf;
pub mod copy;
pub mod fill;
pub mod header;
pub mod spec;
pub mod table;
pub mod template;

pub use addr::{
    CellRange, CellRef, Coordinate, RangeRef, column_index_to_letters, column_letters_to_index,
    offset, resolve_range, to_coordinate, to_label,
};
pub use aggregate::{aggregate_range, aggregate_range_into, plan_aggregate};
pub use copy::{coerce_value, copy_range, plan_copy};
pub use fill::fill;
pub use header::{match_columns, plan_positional, read_header_labels};
pub use sheetkit_io_xlsx::{EnumCellValue, XlsxWorkbook, XlsxWorksheet};
pub use spec::{
    EnumAggregateAction, EnumCoerceKind, EnumHeaderLocation, EnumOrientation,
    SpecAggregateOptions, SpecColumnPlacement, SpecCopyOptions, SpecFillOptions, SpecFillReport,
    SpecWritePlan, TemplateError, TemplateResult,
};
pub use table::{EnumTableInput, SpecTable, SpecTableColumn, normalize_table};
pub use template::{XlsxTemplate, fill_sheet_with};
