//! Stateful template cursor.
//!
//! [`XlsxTemplate`] owns a workbook plus a current sheet, a current cell and an
//! optional header location, so chained calls do not need to repeat origins.

use std::path::Path;

use sheetkit_io_xlsx::{EnumCellValue, XlsxWorkbook, XlsxWorksheet};
use tracing::{debug, info};

use crate::addr::{CellRef, Coordinate, RangeRef, resolve_range, to_coordinate};
use crate::aggregate::plan_aggregate;
use crate::copy::{apply_write_plan, plan_copy};
use crate::fill::fill;
use crate::spec::{
    EnumHeaderLocation, EnumOrientation, SpecAggregateOptions, SpecCopyOptions, SpecFillOptions,
    SpecFillReport, SpecWritePlan, TemplateError, TemplateResult,
};
use crate::table::{EnumTableInput, normalize_table};

/// Workbook cursor.
#[derive(Debug, Clone, Default)]
pub struct XlsxTemplate {
    workbook: XlsxWorkbook,
    c_sheet: Option<String>,
    coord_cell: Option<Coordinate>,
    coord_header: Option<Coordinate>,
    orientation: EnumOrientation,
}

impl XlsxTemplate {
    /// Cursor over an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor over a workbook loaded from `path`. No sheet is selected.
    pub fn open(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let workbook = XlsxWorkbook::open(path.as_ref())?;
        info!("opened template {}", path.as_ref().display());
        Ok(Self::from_workbook(workbook))
    }

    /// Cursor over an already loaded workbook. No sheet is selected.
    pub fn from_workbook(workbook: XlsxWorkbook) -> Self {
        Self {
            workbook,
            ..Default::default()
        }
    }

    /// Borrow the underlying workbook.
    pub fn workbook(&self) -> &XlsxWorkbook {
        &self.workbook
    }

    /// Release the cursor and keep the workbook.
    pub fn into_workbook(self) -> XlsxWorkbook {
        self.workbook
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// Name of the selected sheet, if any.
    pub fn current_sheet(&self) -> Option<&str> {
        self.c_sheet.as_deref()
    }

    /// Cursor cell on the selected sheet, if any.
    pub fn current_cell(&self) -> Option<Coordinate> {
        self.coord_cell
    }

    /// Recorded header location and orientation.
    pub fn header_location(&self) -> Option<(Coordinate, EnumOrientation)> {
        self.coord_header.map(|coord| (coord, self.orientation))
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Navigation

    /// Create an empty sheet. The cursor does not move.
    pub fn add_sheet(&mut self, name: &str) -> TemplateResult<&mut Self> {
        self.workbook.create_sheet(name)?;
        Ok(self)
    }

    /// Select an existing sheet, optionally positioning the cursor.
    ///
    /// Switching sheets forgets the current cell (unless `cell` is given) and the
    /// header location.
    pub fn goto_sheet(&mut self, name: &str, cell: Option<CellRef>) -> TemplateResult<&mut Self> {
        if !self.workbook.contains_sheet(name) {
            return Err(TemplateError::UnknownSheet(name.to_string()));
        }
        let coord_cell = cell.map(to_coordinate).transpose()?;
        if self.c_sheet.as_deref() != Some(name) {
            self.coord_header = None;
            self.orientation = EnumOrientation::default();
        }
        self.c_sheet = Some(name.to_string());
        self.coord_cell = coord_cell;
        debug!("cursor at sheet {name:?}, cell {:?}", self.coord_cell);
        Ok(self)
    }

    /// Like [`Self::goto_sheet`], creating the sheet first when absent.
    pub fn goto_new_sheet(
        &mut self,
        name: &str,
        cell: Option<CellRef>,
    ) -> TemplateResult<&mut Self> {
        if !self.workbook.contains_sheet(name) {
            self.workbook.create_sheet(name)?;
        }
        self.goto_sheet(name, cell)
    }

    /// Move within the current sheet.
    pub fn goto_cell(&mut self, cell: impl Into<CellRef>) -> TemplateResult<&mut Self> {
        self.derive_active_sheet_name()?;
        self.coord_cell = Some(to_coordinate(cell)?);
        Ok(self)
    }

    /// Record where header labels start and move the cursor there.
    pub fn set_header_location(
        &mut self,
        location: impl Into<EnumHeaderLocation>,
        orientation: EnumOrientation,
    ) -> TemplateResult<&mut Self> {
        let c_sheet = self.derive_active_sheet_name()?;
        let sheet = self.workbook.sheet(&c_sheet)?;
        let coord = match location.into() {
            EnumHeaderLocation::First => Coordinate::new(1, 1),
            EnumHeaderLocation::Last => match orientation {
                EnumOrientation::Row => Coordinate::new(sheet.highest_row().max(1), 1),
                EnumOrientation::Column => Coordinate::new(1, sheet.highest_column().max(1)),
            },
            EnumHeaderLocation::Cell(cell) => to_coordinate(cell)?,
        };
        debug!("header location of {c_sheet:?}: {coord} ({orientation})");
        self.coord_header = Some(coord);
        self.orientation = orientation;
        self.coord_cell = Some(coord);
        Ok(self)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region CellAccess

    /// Write one value at the current cell.
    pub fn set_value(&mut self, value: impl Into<EnumCellValue>) -> TemplateResult<&mut Self> {
        let (c_sheet, coord) = self.derive_active_cell()?;
        self.workbook
            .sheet_mut(&c_sheet)?
            .set_value(coord.row, coord.col, value)?;
        Ok(self)
    }

    /// Write one value at `cell` of `sheet`. The cursor does not move.
    pub fn write_cell(
        &mut self,
        sheet: &str,
        cell: impl Into<CellRef>,
        value: impl Into<EnumCellValue>,
    ) -> TemplateResult<&mut Self> {
        let coord = to_coordinate(cell)?;
        self.workbook
            .sheet_mut(sheet)?
            .set_value(coord.row, coord.col, value)?;
        Ok(self)
    }

    /// Value at `cell` of `sheet`; blank cells read as [`EnumCellValue::None`].
    pub fn read_cell(&self, sheet: &str, cell: impl Into<CellRef>) -> TemplateResult<EnumCellValue> {
        let coord = to_coordinate(cell)?;
        Ok(self.workbook.sheet(sheet)?.get_value(coord.row, coord.col).clone())
    }

    /// Delete `count` rows of `sheet` starting at `row`, shifting the rest up.
    pub fn remove_rows_from(&mut self, sheet: &str, row: u32, count: u32) -> TemplateResult<&mut Self> {
        if row == 0 {
            return Err(TemplateError::InvalidPosition(
                "row must be at least 1".to_string(),
            ));
        }
        self.workbook.sheet_mut(sheet)?.remove_rows(row, count);
        debug!("removed {count} rows of {sheet:?} from row {row}");
        Ok(self)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Operations

    /// Fill the current sheet.
    ///
    /// Options naming neither a header nor an anchor fall back to the recorded header
    /// location, then to a positional write from the current cell. An explicit anchor
    /// always means a positional write there.
    pub fn fill_with(
        &mut self,
        input: EnumTableInput<'_>,
        options: SpecFillOptions,
    ) -> TemplateResult<SpecFillReport> {
        let c_sheet = self.derive_active_sheet_name()?;
        let mut options = options;
        if options.header.is_none() && options.anchor.is_none() {
            match self.coord_header {
                Some(coord_header) => {
                    options.header = Some(coord_header);
                    options.orientation = self.orientation;
                }
                None => options.anchor = self.coord_cell,
            }
        }

        let table = normalize_table(input)?;
        let report = fill(self.workbook.sheet_mut(&c_sheet)?, &table, &options)?;
        info!(
            "filled {:?}: {} records, {} cells written, {} cleared",
            report.sheet_name, report.n_records, report.n_cells_written, report.n_cells_cleared
        );
        Ok(report)
    }

    /// Copy a range of another workbook file to the current cell.
    pub fn copy_range_from(
        &mut self,
        source_path: impl AsRef<Path>,
        source_sheet: &str,
        range: impl Into<RangeRef>,
        options: &SpecCopyOptions,
    ) -> TemplateResult<SpecWritePlan> {
        let source = XlsxWorkbook::open(source_path.as_ref())?;
        let (c_sheet, anchor) = self.derive_active_cell()?;
        let range = resolve_range(range)?;
        let plan = plan_copy(source.sheet(source_sheet)?, &range, anchor, options)?;
        self.apply_plan(&c_sheet, &plan)?;
        Ok(plan)
    }

    /// Copy a range of a sheet of this workbook to the current cell.
    pub fn copy_range_within(
        &mut self,
        source_sheet: &str,
        range: impl Into<RangeRef>,
        options: &SpecCopyOptions,
    ) -> TemplateResult<SpecWritePlan> {
        let (c_sheet, anchor) = self.derive_active_cell()?;
        let range = resolve_range(range)?;
        let plan = plan_copy(self.workbook.sheet(source_sheet)?, &range, anchor, options)?;
        self.apply_plan(&c_sheet, &plan)?;
        Ok(plan)
    }

    /// Aggregate a range of another workbook file into the current cell.
    pub fn aggregate_range_from(
        &mut self,
        source_path: impl AsRef<Path>,
        source_sheet: &str,
        range: impl Into<RangeRef>,
        options: &SpecAggregateOptions,
    ) -> TemplateResult<SpecWritePlan> {
        let source = XlsxWorkbook::open(source_path.as_ref())?;
        let (c_sheet, anchor) = self.derive_active_cell()?;
        let range = resolve_range(range)?;
        let plan = plan_aggregate(source.sheet(source_sheet)?, &range, anchor, options)?;
        self.apply_plan(&c_sheet, &plan)?;
        Ok(plan)
    }

    /// Aggregate a range of a sheet of this workbook into the current cell.
    pub fn aggregate_range_within(
        &mut self,
        source_sheet: &str,
        range: impl Into<RangeRef>,
        options: &SpecAggregateOptions,
    ) -> TemplateResult<SpecWritePlan> {
        let (c_sheet, anchor) = self.derive_active_cell()?;
        let range = resolve_range(range)?;
        let plan = plan_aggregate(self.workbook.sheet(source_sheet)?, &range, anchor, options)?;
        self.apply_plan(&c_sheet, &plan)?;
        Ok(plan)
    }

    /// Persist the whole workbook.
    pub fn save(&self, path: impl AsRef<Path>) -> TemplateResult<()> {
        self.workbook.save(path.as_ref())?;
        info!("saved template to {}", path.as_ref().display());
        Ok(())
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////

    fn derive_active_sheet_name(&self) -> TemplateResult<String> {
        self.c_sheet.clone().ok_or(TemplateError::NoActiveSheet)
    }

    fn derive_active_cell(&self) -> TemplateResult<(String, Coordinate)> {
        let c_sheet = self.derive_active_sheet_name()?;
        let coord = self
            .coord_cell
            .ok_or_else(|| TemplateError::NoActiveCell(c_sheet.clone()))?;
        Ok((c_sheet, coord))
    }

    fn apply_plan(&mut self, sheet: &str, plan: &SpecWritePlan) -> TemplateResult<()> {
        let dest: &mut XlsxWorksheet = self.workbook.sheet_mut(sheet)?;
        apply_write_plan(dest, plan)
    }
}

/// Open `path`, fill `sheet` and save back to `path`.
pub fn fill_sheet_with(
    path: impl AsRef<Path>,
    sheet: &str,
    input: EnumTableInput<'_>,
    options: SpecFillOptions,
) -> TemplateResult<SpecFillReport> {
    let mut template = XlsxTemplate::open(path.as_ref())?;
    template.goto_sheet(sheet, None)?;
    let report = template.fill_with(input, options)?;
    template.save(path.as_ref())?;
    Ok(report)
}
