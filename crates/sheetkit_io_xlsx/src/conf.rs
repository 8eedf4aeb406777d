//! XLSX constants shared by the workbook store, reader and writer.

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: u32 = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: u32 = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Text written for boolean `true` when a value is rendered as a string.
pub const C_BOOL_TRUE: &str = "TRUE";
/// Text written for boolean `false` when a value is rendered as a string.
pub const C_BOOL_FALSE: &str = "FALSE";
