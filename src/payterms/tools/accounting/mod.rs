//! Submission of extracted payment terms to the accounting application.
//!
//! The vendor integration is hidden behind [`AccountingSystem`]: the crate only
//! knows how to connect, upsert one term by name, and disconnect. Two
//! implementations ship with the crate: [`InMemoryLedger`] for dry runs and
//! tests, and [`CommandBridge`] which delegates to an external program that
//! owns the vendor binding.

pub mod bridge;
pub mod memory;

pub use bridge::CommandBridge;
pub use memory::InMemoryLedger;

use tracing::{debug, info, instrument, warn};

use crate::payterms::tools::error::Result;
use crate::payterms::tools::model::{PaymentTerm, SubmissionReport, UpsertOutcome};

/// Narrow interface to the accounting application.
pub trait AccountingSystem {
    /// Establishes the session used by subsequent upserts.
    ///
    /// Returns [`ToolError::Connection`](crate::ToolError::Connection) when the
    /// application cannot be reached.
    fn connect(&mut self) -> Result<()>;

    /// Creates the term if no term with `name` exists, otherwise updates it.
    fn upsert_payment_term(&mut self, name: &str, discount_days: u32) -> UpsertOutcome;

    /// Ends the session opened by [`connect`](Self::connect).
    fn disconnect(&mut self) -> Result<()>;
}

/// Upserts every record in order and collects one outcome per record.
///
/// A failed record never stops the batch and earlier successes are kept. Only
/// a failure to connect aborts, before any record is attempted.
#[instrument(level = "info", skip_all, fields(records = records.len()))]
pub fn submit<S: AccountingSystem + ?Sized>(
    system: &mut S,
    records: &[PaymentTerm],
) -> Result<SubmissionReport> {
    system.connect()?;

    let mut report = SubmissionReport::default();
    for term in records {
        let outcome = system.upsert_payment_term(&term.name, term.discount_days);
        match &outcome {
            UpsertOutcome::Failed { reason } => {
                warn!(name = %term.name, %reason, "payment term rejected");
            }
            other => debug!(name = %term.name, outcome = %other, "payment term saved"),
        }
        report.push(term.clone(), outcome);
    }

    if let Err(error) = system.disconnect() {
        warn!(%error, "failed to close accounting session");
    }

    info!(
        created = report.created(),
        updated = report.updated(),
        failed = report.failed(),
        "submission finished"
    );
    Ok(report)
}
