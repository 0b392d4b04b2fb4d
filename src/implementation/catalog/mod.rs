//! # Catalog Implementation
//!
//! Cement product catalog and the warehouse stock ledger.

pub use crate::types::catalog::*;

mod service;
pub use service::Warehouse;
