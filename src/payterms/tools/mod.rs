pub mod accounting;
pub mod error;
pub mod import;
pub mod io;
pub mod model;

pub use error::{ErrorCategory, Result, ToolError};
