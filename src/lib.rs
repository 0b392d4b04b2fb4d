//! # CemERP
//!
//! Business core for a cement distribution operation: vendor and driver
//! registry, product catalog with a never-negative stock ledger, an order
//! book with day-scoped sequential numbering, payment reconciliation and
//! the reporting surface built on top.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod implementation;
pub mod reporting;
pub mod types;

// Re-exports for public API
pub use errors::{ErpError, ErpResult};
pub use implementation::CemErp;
pub use types::ErpConfig;
