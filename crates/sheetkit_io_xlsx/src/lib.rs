//! `sheetkit_io_xlsx` v1:
//! Rust-side workbook store used by the template engine.
//!
//! Modules:
//! - `conf`      : constants (Excel limits, sheet name rules)
//! - `spec`      : cell value model and errors
//! - `util`      : pure helper functions
//! - `worksheet` : sparse in-memory sheet
//! - `workbook`  : ordered sheet collection, open/save
//! - `reader`    : calamine-backed loader
//! - `writer`    : rust_xlsxwriter-backed serializer
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod workbook;
pub mod worksheet;
pub mod writer;

pub use conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
pub use spec::{EnumCellValue, XlsxIoError, format_number};
pub use util::validate_sheet_name;
pub use workbook::XlsxWorkbook;
pub use worksheet::XlsxWorksheet;
