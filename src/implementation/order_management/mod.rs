//! # Order Management
//!
//! Cement order book: orders with owned line items and payments, day-scoped
//! sequential order numbering, the total calculator and payment
//! reconciliation.
//!
//! Organization:
//! - `types/`: all type definitions
//! - `implementations/`: business logic for `Order` and `OrderBook`

pub mod types;

pub mod implementations {
    //! Business logic implementations.

    pub mod order_impl;
    pub mod service_impl;
}

pub use types::*;

#[cfg(test)]
mod tests;
