use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, info, instrument, warn};

use crate::payterms::tools::error::{Result, ToolError};
use crate::payterms::tools::model::{ExtractionResult, PaymentTerm, RowError, RowErrorReason};

/// Name of the sheet that holds payment terms unless the caller picks another.
pub const DEFAULT_SHEET: &str = "payment_terms";

/// Column holding the term name.
const NAME_COLUMN: u32 = 0;
/// Column holding the discount days.
const DAYS_COLUMN: u32 = 1;

/// Reads payment terms from `sheet` of the workbook at `path`.
///
/// Row 1 is treated as a header. Data rows are read from row 2 until the first
/// row whose two columns are both blank. Rows that fail validation are
/// reported in [`ExtractionResult::row_errors`] and do not stop the scan.
#[instrument(level = "info", skip_all, fields(path = %path.display(), sheet = sheet))]
pub fn extract(path: &Path, sheet: &str) -> Result<ExtractionResult> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let mut workbook: Xlsx<_> = open_workbook::<Xlsx<_>, _>(path).map_err(
        |source: calamine::XlsxError| ToolError::UnreadableWorkbook {
            path: path.to_path_buf(),
            source,
        },
    )?;

    let range = read_required_sheet(&mut workbook, sheet)?;
    let result = extract_rows(&range);

    info!(
        records = result.records.len(),
        skipped = result.row_errors.len(),
        "extracted payment terms"
    );
    Ok(result)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn extract_rows(range: &Range<DataType>) -> ExtractionResult {
    let mut result = ExtractionResult::default();

    let Some((last_row, _)) = range.end() else {
        debug!("sheet is empty");
        return result;
    };

    for row in 1..=last_row {
        let name_cell = range.get_value((row, NAME_COLUMN));
        let days_cell = range.get_value((row, DAYS_COLUMN));

        if is_blank(name_cell) && is_blank(days_cell) {
            debug!(sheet_row = row + 1, "blank row ends the data block");
            break;
        }

        let index = row as usize;
        match validate_row(name_cell, days_cell) {
            Ok(term) => result.records.push(term),
            Err(reason) => {
                let error = RowError::new(index, reason);
                warn!(
                    row = error.index,
                    sheet_row = error.sheet_row,
                    reason = %error.reason,
                    "skipping row"
                );
                result.row_errors.push(error);
            }
        }
    }

    result
}

fn validate_row(
    name_cell: Option<&DataType>,
    days_cell: Option<&DataType>,
) -> std::result::Result<PaymentTerm, RowErrorReason> {
    let name = cell_to_string(name_cell);
    if name.is_empty() {
        return Err(RowErrorReason::EmptyName);
    }
    let discount_days = parse_discount_days(days_cell)?;
    Ok(PaymentTerm::new(name, discount_days))
}

fn parse_discount_days(cell: Option<&DataType>) -> std::result::Result<u32, RowErrorReason> {
    let parsed = match cell {
        Some(DataType::Int(value)) => u32::try_from(*value).ok(),
        Some(DataType::Float(value)) => float_to_days(*value),
        Some(DataType::String(value)) => value.trim().parse::<u32>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| RowErrorReason::InvalidDiscountDays {
        value: cell_to_string(cell),
    })
}

fn float_to_days(value: f64) -> Option<u32> {
    let in_range = value >= 0.0 && value <= f64::from(u32::MAX);
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Some(value as u32)
    } else {
        None
    }
}

fn is_blank(cell: Option<&DataType>) -> bool {
    match cell {
        Some(DataType::Empty) | None => true,
        Some(DataType::String(value)) => value.trim().is_empty(),
        Some(_) => false,
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.trim().to_string(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}
