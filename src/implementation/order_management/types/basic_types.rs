//! # Order Management Types - Basic Types
//!
//! Identifiers and status/method enums for the order book.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// BASIC IDENTIFIERS
// ============================================================================

/// Unique order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a new unique order ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique order line item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItemId(pub Uuid);

impl OrderItemId {
    /// Generates a new unique item ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for OrderItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique payment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub Uuid);

impl PaymentId {
    /// Generates a new unique payment ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// STATUS ENUMS
// ============================================================================

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, not yet confirmed.
    #[default]
    Pending,
    /// Order confirmed with the vendor.
    Confirmed,
    /// Bags being prepared for dispatch.
    Processing,
    /// Truck on the road.
    Dispatched,
    /// Delivered to the site.
    Delivered,
    /// Order cancelled; stock restored.
    Cancelled,
}

impl OrderStatus {
    /// Whether this is a terminal state that cannot be left.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order still accepts item and payment changes.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Dispatched => "Dispatched",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// All statuses, in lifecycle order.
    #[must_use]
    pub fn all() -> [Self; 6] {
        [
            Self::Pending,
            Self::Confirmed,
            Self::Processing,
            Self::Dispatched,
            Self::Delivered,
            Self::Cancelled,
        ]
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Payment status, derived from recorded payments. Never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet.
    #[default]
    Unpaid,
    /// Some money received, balance outstanding.
    Partial,
    /// Fully settled (or overpaid).
    Paid,
}

impl PaymentStatus {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Partial => "Partially Paid",
            Self::Paid => "Paid",
        }
    }
}

/// Payment method agreed for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
    /// Cheque.
    Cheque,
    /// Online transfer (UPI/NEFT).
    Online,
    /// Against the vendor's credit account.
    Credit,
}

impl PaymentMethod {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
            Self::Online => "Online",
            Self::Credit => "Credit",
        }
    }
}

/// How an individual payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Cash.
    #[default]
    Cash,
    /// Cheque.
    Cheque,
    /// Online transfer.
    Online,
}

impl PaymentType {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
            Self::Online => "Online",
        }
    }
}
