use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::instrument;

use crate::payterms::tools::error::Result;

/// Header labels written on row 1 of a template sheet.
pub const TEMPLATE_HEADERS: [&str; 2] = ["Name", "Discount Days"];

/// Writes an empty workbook laid out the way [`extract`](super::excel_read::extract)
/// expects: one sheet named `sheet` carrying the header row.
#[instrument(level = "info", skip_all, fields(path = %path.display(), sheet = sheet))]
pub fn write_template(path: &Path, sheet: &str) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(sheet)?;

    for (col_idx, header) in TEMPLATE_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, *header, &header_format)?;
    }
    worksheet.set_column_width(0, 30)?;
    worksheet.set_column_width(1, 15)?;

    workbook_writer.save(path)?;
    Ok(())
}
