//! # Directory Implementation
//!
//! Registry of vendors/customers and delivery drivers.

pub use crate::types::directory::*;

mod service;
pub use service::DirectoryService;
