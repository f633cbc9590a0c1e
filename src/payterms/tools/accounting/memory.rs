use std::collections::BTreeMap;

use crate::payterms::tools::accounting::AccountingSystem;
use crate::payterms::tools::error::{Result, ToolError};
use crate::payterms::tools::model::UpsertOutcome;

/// Accounting system kept entirely in memory.
///
/// Backs `--dry-run` imports and lets tests script unreachable applications
/// and per-name rejections.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    terms: BTreeMap<String, u32>,
    rejections: BTreeMap<String, String>,
    unreachable: Option<String>,
    connected: bool,
    attempts: usize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent [`connect`](AccountingSystem::connect) fail with `reason`.
    pub fn unreachable(mut self, reason: impl Into<String>) -> Self {
        self.unreachable = Some(reason.into());
        self
    }

    /// Makes upserts of `name` fail with `reason`.
    pub fn reject(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rejections.insert(name.into(), reason.into());
        self
    }

    /// Seeds an existing term so the next upsert of `name` reports an update.
    pub fn with_term(mut self, name: impl Into<String>, discount_days: u32) -> Self {
        self.terms.insert(name.into(), discount_days);
        self
    }

    /// Stored terms keyed by name.
    pub fn terms(&self) -> &BTreeMap<String, u32> {
        &self.terms
    }

    /// Number of upserts issued so far, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl AccountingSystem for InMemoryLedger {
    fn connect(&mut self) -> Result<()> {
        if let Some(reason) = &self.unreachable {
            return Err(ToolError::Connection(reason.clone()));
        }
        self.connected = true;
        Ok(())
    }

    fn upsert_payment_term(&mut self, name: &str, discount_days: u32) -> UpsertOutcome {
        self.attempts += 1;
        if !self.connected {
            return UpsertOutcome::failed("session is not open");
        }
        if let Some(reason) = self.rejections.get(name) {
            return UpsertOutcome::failed(reason.clone());
        }
        match self.terms.insert(name.to_string(), discount_days) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        }
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }
}
