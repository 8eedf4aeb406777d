//! Row/column reductions over a range.

use std::collections::BTreeMap;

use sheetkit_io_xlsx::{EnumCellValue, XlsxWorksheet};
use tracing::{debug, warn};

use crate::addr::{CellRange, Coordinate, offset};
use crate::copy::apply_write_plan;
use crate::spec::{
    EnumAggregateAction, EnumOrientation, SpecAggregateOptions, SpecWritePlan, TemplateResult,
};

/// One result per source row (`Row`) or per source column (`Column`).
///
/// Numbers and numeric text qualify; blanks, booleans and other text are ignored.
pub fn aggregate_range(
    source: &XlsxWorksheet,
    range: &CellRange,
    action: EnumAggregateAction,
    orientation: EnumOrientation,
) -> Vec<Option<f64>> {
    // Only stored cells are visited, so wide or tall ranges stay cheap.
    let mut dict_numbers: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for ((n_row, n_col), value) in source.cells() {
        let coord = Coordinate::new(n_row, n_col);
        if !range.contains(coord) {
            continue;
        }
        let Some(n_value) = value.as_f64() else {
            if !value.is_empty() {
                warn!(
                    "non-numeric value {value:?} at {coord} in {:?} ignored by {action}",
                    source.name()
                );
            }
            continue;
        };
        let idx_slice = match orientation {
            EnumOrientation::Row => n_row,
            EnumOrientation::Column => n_col,
        };
        dict_numbers.entry(idx_slice).or_default().push(n_value);
    }

    let (idx_start, idx_end) = match orientation {
        EnumOrientation::Row => (range.top_left.row, range.bottom_right.row),
        EnumOrientation::Column => (range.top_left.col, range.bottom_right.col),
    };
    (idx_start..=idx_end)
        .map(|idx_slice| {
            let l_numbers = dict_numbers
                .get(&idx_slice)
                .map(Vec::as_slice)
                .unwrap_or_default();
            reduce_numbers(l_numbers, action)
        })
        .collect()
}

fn reduce_numbers(numbers: &[f64], action: EnumAggregateAction) -> Option<f64> {
    match action {
        EnumAggregateAction::Sum => Some(numbers.iter().sum()),
        EnumAggregateAction::Count => Some(numbers.len() as f64),
        EnumAggregateAction::Average if numbers.is_empty() => None,
        EnumAggregateAction::Average => Some(numbers.iter().sum::<f64>() / numbers.len() as f64),
    }
}

/// Results laid out from `anchor`: downward in row mode, rightward in column mode.
pub fn plan_aggregate(
    source: &XlsxWorksheet,
    range: &CellRange,
    anchor: Coordinate,
    options: &SpecAggregateOptions,
) -> TemplateResult<SpecWritePlan> {
    let l_results = aggregate_range(source, range, options.action, options.orientation);
    let mut plan = SpecWritePlan::default();
    for (n_idx, result) in l_results.into_iter().enumerate() {
        let n_idx = n_idx as i64;
        let dest = match options.orientation {
            EnumOrientation::Row => offset(anchor, n_idx, 0)?,
            EnumOrientation::Column => offset(anchor, 0, n_idx)?,
        };
        let value = result.map_or(EnumCellValue::None, EnumCellValue::Number);
        plan.writes.push((dest, value));
    }
    debug!(
        "planned {} of {range} ({}) from {:?} to {anchor}: {} results",
        options.action,
        options.orientation,
        source.name(),
        plan.writes.len()
    );
    Ok(plan)
}

/// Aggregate `range` of `source` and write the results into `dest` at `anchor`.
pub fn aggregate_range_into(
    source: &XlsxWorksheet,
    range: &CellRange,
    dest: &mut XlsxWorksheet,
    anchor: Coordinate,
    options: &SpecAggregateOptions,
) -> TemplateResult<SpecWritePlan> {
    let plan = plan_aggregate(source, range, anchor, options)?;
    apply_write_plan(dest, &plan)?;
    Ok(plan)
}
