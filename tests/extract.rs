mod common;

use common::{Blank, Bool, Number, Text, payment_terms_workbook, write_sheet};
use payterms_tools::io::excel_read::{self, DEFAULT_SHEET};
use payterms_tools::io::excel_write;
use payterms_tools::model::{PaymentTerm, RowErrorReason};
use payterms_tools::{ErrorCategory, ToolError};

#[test]
fn reads_valid_rows_in_order() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("Net 30"), Number(30.0)),
        (Text("Net 15"), Number(15.0)),
        (Text("Net 60"), Number(60.0)),
        (Text("2/10 Net 30"), Number(10.0)),
        (Text("Cash On Delivery"), Number(0.0)),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert_eq!(
        result.records,
        vec![
            PaymentTerm::new("Net 30", 30),
            PaymentTerm::new("Net 15", 15),
            PaymentTerm::new("Net 60", 60),
            PaymentTerm::new("2/10 Net 30", 10),
            PaymentTerm::new("Cash On Delivery", 0),
        ]
    );
    assert!(result.row_errors.is_empty());
}

#[test]
fn invalid_rows_are_reported_and_skipped() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("Net 30"), Number(30.0)),
        (Blank, Number(15.0)),
        (Text("Net 60"), Text("abc")),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert_eq!(result.records, vec![PaymentTerm::new("Net 30", 30)]);
    let errors: Vec<(usize, String)> = result
        .row_errors
        .iter()
        .map(|error| (error.index, error.reason.to_string()))
        .collect();
    assert_eq!(
        errors,
        vec![
            (2, "empty name".to_string()),
            (3, "invalid discountDays".to_string()),
        ]
    );
    assert_eq!(result.row_errors[0].sheet_row, 3);
    assert_eq!(
        result.row_errors[1].reason,
        RowErrorReason::InvalidDiscountDays {
            value: "abc".to_string()
        }
    );
}

#[test]
fn empty_text_name_is_reported_like_a_missing_one() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("Net 30"), Number(30.0)),
        (Text(""), Number(15.0)),
        (Text("Net 60"), Text("abc")),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert_eq!(result.records, vec![PaymentTerm::new("Net 30", 30)]);
    let errors: Vec<(usize, RowErrorReason)> = result
        .row_errors
        .into_iter()
        .map(|error| (error.index, error.reason))
        .collect();
    assert_eq!(
        errors,
        vec![
            (2, RowErrorReason::EmptyName),
            (
                3,
                RowErrorReason::InvalidDiscountDays {
                    value: "abc".to_string()
                }
            ),
        ]
    );
}

#[test]
fn rejects_negative_fractional_and_non_numeric_days() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("Negative"), Number(-5.0)),
        (Text("Fraction"), Number(2.5)),
        (Text("Flag"), Bool(true)),
        (Text("Missing"), Blank),
        (Text("Text negative"), Text("-3")),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert!(result.records.is_empty());
    assert_eq!(result.row_errors.len(), 5);
    assert!(
        result
            .row_errors
            .iter()
            .all(|error| matches!(error.reason, RowErrorReason::InvalidDiscountDays { .. }))
    );
    let indexes: Vec<usize> = result.row_errors.iter().map(|error| error.index).collect();
    assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
}

#[test]
fn trims_names_and_parses_numeric_text() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("  Net 45  "), Text(" 45 ")),
        (Number(90.0), Number(90.0)),
        (Text("   "), Number(7.0)),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert_eq!(
        result.records,
        vec![PaymentTerm::new("Net 45", 45), PaymentTerm::new("90", 90)]
    );
    assert_eq!(result.row_errors.len(), 1);
    assert_eq!(result.row_errors[0].index, 3);
    assert_eq!(result.row_errors[0].reason, RowErrorReason::EmptyName);
}

#[test]
fn blank_row_stops_the_scan() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("Net 30"), Number(30.0)),
        (Blank, Blank),
        (Text("Net 60"), Number(60.0)),
        (Blank, Text("oops")),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert_eq!(result.records, vec![PaymentTerm::new("Net 30", 30)]);
    assert!(result.row_errors.is_empty());
}

#[test]
fn duplicate_names_are_passed_through() {
    let (_dir, path) = payment_terms_workbook(&[
        (Text("Net 30"), Number(30.0)),
        (Text("Net 30"), Number(31.0)),
    ]);

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("workbook extracted");

    assert_eq!(
        result.records,
        vec![PaymentTerm::new("Net 30", 30), PaymentTerm::new("Net 30", 31)]
    );
}

#[test]
fn missing_file_is_a_file_error() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("nonexistent.xlsx");

    let error = excel_read::extract(&path, DEFAULT_SHEET).expect_err("missing file rejected");

    assert!(matches!(error, ToolError::MissingInput(_)));
    assert_eq!(error.category(), ErrorCategory::File);
}

#[test]
fn non_workbook_file_is_a_file_error() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "not a workbook").expect("file written");

    let error = excel_read::extract(&path, DEFAULT_SHEET).expect_err("garbage rejected");

    assert!(matches!(error, ToolError::UnreadableWorkbook { .. }));
    assert_eq!(error.category(), ErrorCategory::File);
}

#[test]
fn missing_sheet_is_a_format_error() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("other.xlsx");
    write_sheet(&path, "customers", &[(Text("Net 30"), Number(30.0))]);

    let error = excel_read::extract(&path, DEFAULT_SHEET).expect_err("missing sheet rejected");

    assert!(matches!(error, ToolError::MissingSheet(ref name) if name == "payment_terms"));
    assert_eq!(error.category(), ErrorCategory::Format);
}

#[test]
fn custom_sheet_name_is_honoured() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("terms.xlsx");
    write_sheet(&path, "terms_2025", &[(Text("Net 10"), Number(10.0))]);

    let result = excel_read::extract(&path, "terms_2025").expect("workbook extracted");

    assert_eq!(result.records, vec![PaymentTerm::new("Net 10", 10)]);
}

#[test]
fn template_is_readable_and_empty() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("template.xlsx");
    excel_write::write_template(&path, DEFAULT_SHEET).expect("template written");

    let result = excel_read::extract(&path, DEFAULT_SHEET).expect("template extracted");

    assert!(result.records.is_empty());
    assert!(result.row_errors.is_empty());
}
