//! Error types for the distribution core

use thiserror::Error;

/// Errors surfaced by the distribution core.
///
/// Every variant except [`ErpError::LockPoisoned`] is recoverable: the
/// triggering write is rolled back in full and the error carries a
/// human-readable message for the caller.
#[derive(Debug, Clone, Error)]
pub enum ErpError {
    /// A store mutex was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
    /// Bad input shape or range.
    #[error("validation error: {0}")]
    Validation(String),
    /// A stock decrement exceeded availability.
    #[error("insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product whose stock was exceeded.
        product_id: String,
        /// Bags currently available.
        available:  u32,
        /// Bags requested.
        requested:  u32,
    },
    /// An entity still referenced by others was targeted for removal.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),
    /// A concurrent writer won the race for a shared counter or record.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    /// Vendor not found.
    #[error("vendor not found: {0}")]
    VendorNotFound(String),
    /// Driver not found.
    #[error("driver not found: {0}")]
    DriverNotFound(String),
    /// Product not found.
    #[error("product not found: {0}")]
    ProductNotFound(String),
    /// Order not found.
    #[error("order not found: {0}")]
    OrderNotFound(String),
    /// Order line item not found.
    #[error("order item not found: {0}")]
    ItemNotFound(String),
    /// A driver with this license number already exists.
    #[error("license number already registered: {0}")]
    DuplicateLicense(String),
    /// The requested order status change leaves a terminal state.
    #[error("cannot change order status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to:   String,
    },
}

/// Result type for distribution core operations.
pub type ErpResult<T> = Result<T, ErpError>;
