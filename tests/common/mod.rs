#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Cell content used to build test workbooks.
#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Blank,
}

pub use Cell::{Blank, Bool, Number, Text};

/// Writes a workbook with a single sheet: a header row followed by `rows`
/// (columns A and B).
pub fn write_sheet(path: &Path, sheet: &str, rows: &[(Cell<'_>, Cell<'_>)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet named");
    worksheet.write_string(0, 0, "Name").expect("header A");
    worksheet.write_string(0, 1, "Discount Days").expect("header B");

    for (offset, (name, days)) in rows.iter().enumerate() {
        let row = (offset + 1) as u32;
        for (col, cell) in [(0u16, name), (1u16, days)] {
            match cell {
                Text(value) => {
                    worksheet.write_string(row, col, *value).expect("text cell");
                }
                Number(value) => {
                    worksheet.write_number(row, col, *value).expect("number cell");
                }
                Bool(value) => {
                    worksheet.write_boolean(row, col, *value).expect("bool cell");
                }
                Blank => {}
            }
        }
    }

    workbook.save(path).expect("workbook saved");
}

/// Creates a temporary directory holding `terms.xlsx` with a `payment_terms` sheet.
pub fn payment_terms_workbook(rows: &[(Cell<'_>, Cell<'_>)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("terms.xlsx");
    write_sheet(&path, "payment_terms", rows);
    (dir, path)
}
