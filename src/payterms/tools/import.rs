use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::payterms::tools::accounting::{self, AccountingSystem};
use crate::payterms::tools::error::Result;
use crate::payterms::tools::io::excel_read::{self, DEFAULT_SHEET};
use crate::payterms::tools::model::{ExtractionResult, SubmissionReport, UpsertOutcome};

/// Everything a single import run needs to know about its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Workbook selected by the user.
    pub input: PathBuf,
    /// Sheet holding the payment terms.
    pub sheet: String,
}

impl ImportRequest {
    /// Builds a request reading the default `payment_terms` sheet.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            sheet: DEFAULT_SHEET.to_string(),
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }
}

/// Combined result of extracting and submitting one workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub input: PathBuf,
    pub extraction: ExtractionResult,
    /// `None` when the workbook held nothing to submit.
    pub submission: Option<SubmissionReport>,
}

impl ImportReport {
    /// Records created or updated in the accounting application.
    pub fn succeeded(&self) -> usize {
        self.submission
            .as_ref()
            .map(SubmissionReport::succeeded)
            .unwrap_or(0)
    }

    /// Rows skipped during extraction.
    pub fn skipped(&self) -> usize {
        self.extraction.row_errors.len()
    }

    /// Records rejected by the accounting application.
    pub fn failed(&self) -> usize {
        self.submission
            .as_ref()
            .map(SubmissionReport::failed)
            .unwrap_or(0)
    }

    /// `true` when every row made it into the accounting application.
    pub fn is_clean(&self) -> bool {
        self.submission.is_some() && self.skipped() == 0 && self.failed() == 0
    }
}

/// Reads the workbook without contacting the accounting application.
pub fn preview(request: &ImportRequest) -> Result<ExtractionResult> {
    excel_read::extract(&request.input, &request.sheet)
}

/// Extracts the payment terms named by `request` and submits them to `system`.
///
/// File, format and connection failures abort the run. Row and record level
/// problems are collected in the returned report.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %request.input.display(), sheet = %request.sheet)
)]
pub fn run_import<S: AccountingSystem + ?Sized>(
    request: &ImportRequest,
    system: &mut S,
) -> Result<ImportReport> {
    let extraction = excel_read::extract(&request.input, &request.sheet)?;

    let submission = if extraction.is_empty() {
        warn!("no valid payment terms, skipping submission");
        None
    } else {
        info!(count = extraction.records.len(), "submitting payment terms");
        Some(accounting::submit(system, &extraction.records)?)
    };

    Ok(ImportReport {
        input: request.input.clone(),
        extraction,
        submission,
    })
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Payment terms import: {}", self.input.display())?;
        writeln!(
            f,
            "succeeded: {}, skipped: {}, failed: {}",
            self.succeeded(),
            self.skipped(),
            self.failed()
        )?;

        if !self.extraction.row_errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped rows:")?;
            for error in &self.extraction.row_errors {
                writeln!(f, "  row {}: {}", error.sheet_row, error.reason)?;
            }
        }

        match &self.submission {
            Some(report) => {
                writeln!(f)?;
                writeln!(f, "Records:")?;
                for entry in &report.entries {
                    let marker = match entry.outcome {
                        UpsertOutcome::Failed { .. } => '!',
                        _ => '+',
                    };
                    writeln!(
                        f,
                        "  {marker} {} ({} days): {}",
                        entry.term.name, entry.term.discount_days, entry.outcome
                    )?;
                }
            }
            None => {
                writeln!(f)?;
                writeln!(f, "No payment terms were imported.")?;
            }
        }

        Ok(())
    }
}
