use std::fmt;

use serde::{Deserialize, Serialize};

/// A named billing condition pushed into the accounting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerm {
    /// Term label, trimmed and never empty (e.g. `Net 30`).
    pub name: String,
    /// Number of days associated with the term.
    pub discount_days: u32,
}

impl PaymentTerm {
    /// Creates a new payment term.
    pub fn new(name: impl Into<String>, discount_days: u32) -> Self {
        Self {
            name: name.into(),
            discount_days,
        }
    }
}

/// Reason a data row was skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorReason {
    /// Column A was missing or blank after trimming.
    EmptyName,
    /// Column B did not hold a non-negative integer. `value` keeps the raw
    /// cell text for diagnostics.
    InvalidDiscountDays { value: String },
}

impl fmt::Display for RowErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowErrorReason::EmptyName => write!(f, "empty name"),
            RowErrorReason::InvalidDiscountDays { .. } => write!(f, "invalid discountDays"),
        }
    }
}

/// A data row that did not produce a [`PaymentTerm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based position among the data rows; the row right under the header is 1.
    pub index: usize,
    /// 1-based row number as displayed by spreadsheet applications.
    pub sheet_row: usize,
    /// Why the row produced no term.
    pub reason: RowErrorReason,
}

impl RowError {
    pub fn new(index: usize, reason: RowErrorReason) -> Self {
        Self {
            index,
            sheet_row: index + 1,
            reason,
        }
    }
}

/// Outcome of reading one sheet: valid terms plus the rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Valid terms in sheet order. Duplicate names are kept.
    pub records: Vec<PaymentTerm>,
    /// Skipped rows in sheet order.
    pub row_errors: Vec<RowError>,
}

impl ExtractionResult {
    /// Returns `true` when no row produced a term.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a single create-or-update against the accounting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No term with that name existed; one was created.
    Created,
    /// An existing term with that name was updated.
    Updated,
    /// The term was not saved. `reason` is the message from the application
    /// or the transport.
    Failed { reason: String },
}

impl UpsertOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        UpsertOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, UpsertOutcome::Failed { .. })
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertOutcome::Created => write!(f, "created"),
            UpsertOutcome::Updated => write!(f, "updated"),
            UpsertOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// One submitted term together with what the accounting application did with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub term: PaymentTerm,
    pub outcome: UpsertOutcome,
}

/// Per-record outcomes of a submission, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub entries: Vec<SubmissionEntry>,
}

impl SubmissionReport {
    pub fn push(&mut self, term: PaymentTerm, outcome: UpsertOutcome) {
        self.entries.push(SubmissionEntry { term, outcome });
    }

    pub fn created(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpsertOutcome::Created))
    }

    pub fn updated(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpsertOutcome::Updated))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, UpsertOutcome::Failed { .. }))
    }

    /// Number of records that were either created or updated.
    pub fn succeeded(&self) -> usize {
        self.count(UpsertOutcome::is_success)
    }

    fn count(&self, predicate: impl Fn(&UpsertOutcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }
}
