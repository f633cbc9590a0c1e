//! Core library for the payterms command line application.
//!
//! The library reads payment terms from an Excel workbook and pushes them into
//! a desktop accounting application. Responsibilities are kept narrow: workbook
//! adapters live under [`payterms::tools::io`], data representations inside
//! [`payterms::tools::model`], the accounting integration seam in
//! [`payterms::tools::accounting`], and the orchestration of a whole run under
//! [`payterms::tools::import`].

pub mod payterms;

pub use payterms::tools::{ErrorCategory, Result, ToolError, accounting, error, import, io, model};
