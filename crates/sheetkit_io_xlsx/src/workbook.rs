//! In-memory workbook: an ordered list of uniquely named worksheets.

use std::path::Path;

use tracing::debug;

use crate::reader::read_worksheets;
use crate::spec::XlsxIoError;
use crate::util::validate_sheet_name;
use crate::worksheet::XlsxWorksheet;
use crate::writer::write_worksheets;

/// Workbook handle. Mutations stay in memory until [`Self::save`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XlsxWorkbook {
    l_sheets: Vec<XlsxWorksheet>,
}

impl XlsxWorkbook {
    /// Create an empty workbook (no sheets).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing workbook from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, XlsxIoError> {
        let l_sheets = read_worksheets(path.as_ref())?;
        Ok(Self { l_sheets })
    }

    /// Persist the whole workbook to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), XlsxIoError> {
        write_worksheets(&self.l_sheets, path.as_ref())
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.l_sheets
            .iter()
            .map(|sheet| sheet.name().to_string())
            .collect()
    }

    /// True when a sheet called `name` exists.
    pub fn contains_sheet(&self, name: &str) -> bool {
        self.l_sheets.iter().any(|sheet| sheet.name() == name)
    }

    /// Borrow a sheet by name.
    pub fn sheet(&self, name: &str) -> Result<&XlsxWorksheet, XlsxIoError> {
        self.l_sheets
            .iter()
            .find(|sheet| sheet.name() == name)
            .ok_or_else(|| XlsxIoError::SheetNotFound(name.to_string()))
    }

    /// Mutably borrow a sheet by name.
    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut XlsxWorksheet, XlsxIoError> {
        self.l_sheets
            .iter_mut()
            .find(|sheet| sheet.name() == name)
            .ok_or_else(|| XlsxIoError::SheetNotFound(name.to_string()))
    }

    /// Append a new empty sheet.
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut XlsxWorksheet, XlsxIoError> {
        validate_sheet_name(name)?;
        // Excel compares sheet names case-insensitively
        if self
            .l_sheets
            .iter()
            .any(|sheet| sheet.name().eq_ignore_ascii_case(name))
        {
            return Err(XlsxIoError::SheetExists(name.to_string()));
        }

        debug!("creating sheet {name:?}");
        self.l_sheets.push(XlsxWorksheet::new(name));
        let n_idx_last = self.l_sheets.len() - 1;
        Ok(&mut self.l_sheets[n_idx_last])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumCellValue;

    #[test]
    fn test_create_sheet_keeps_order_and_rejects_duplicates() {
        let mut workbook = XlsxWorkbook::new();
        workbook.create_sheet("New Sheet 1").unwrap();
        workbook.create_sheet("New Sheet 2").unwrap();
        workbook.create_sheet("New Sheet 3").unwrap();

        assert_eq!(
            workbook.sheet_names(),
            vec!["New Sheet 1", "New Sheet 2", "New Sheet 3"]
        );
        assert!(matches!(
            workbook.create_sheet("new sheet 2"),
            Err(XlsxIoError::SheetExists(_))
        ));
        assert!(matches!(
            workbook.sheet("Missing"),
            Err(XlsxIoError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_reopen_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("book.xlsx");

        let mut workbook = XlsxWorkbook::new();
        let sheet = workbook.create_sheet("Sheet1").unwrap();
        sheet.set_value(3, 1, "Name").unwrap();
        sheet.set_value(4, 2, 25).unwrap();
        sheet.set_value(5, 3, true).unwrap();
        workbook.create_sheet("Empty").unwrap();
        workbook.save(&path).unwrap();

        let reopened = XlsxWorkbook::open(&path).unwrap();
        assert_eq!(reopened.sheet_names(), vec!["Sheet1", "Empty"]);
        let sheet = reopened.sheet("Sheet1").unwrap();
        assert_eq!(
            sheet.get_value(3, 1),
            &EnumCellValue::String("Name".to_string())
        );
        assert_eq!(sheet.get_value(4, 2), &EnumCellValue::Number(25.0));
        assert_eq!(sheet.get_value(5, 3), &EnumCellValue::Boolean(true));
        assert!(reopened.sheet("Empty").unwrap().is_empty());
    }
}
