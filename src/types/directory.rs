//! # Directory Types
//!
//! Type definitions for the vendor/customer and delivery driver registries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityStatus;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Unique vendor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorId(pub Uuid);

impl VendorId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a new unique vendor ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique driver identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub Uuid);

impl DriverId {
    /// Wraps an existing UUID.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a new unique driver ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// VENDOR
// ============================================================================

/// Vendor/customer record for cement buyers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    /// Vendor ID.
    pub id:                  VendorId,
    /// Contact person name.
    pub name:                String,
    /// Company name, if trading as a business.
    pub company_name:        Option<String>,
    /// Contact email.
    pub email:               Option<String>,
    /// Contact phone number.
    pub phone:               String,
    /// Street address.
    pub address:             String,
    /// City.
    pub city:                String,
    /// State.
    pub state:               String,
    /// Postal code.
    pub pincode:             String,
    /// GST registration number.
    pub gst_number:          Option<String>,
    /// Credit extended to this vendor.
    pub credit_limit:        Decimal,
    /// Unpaid balance currently carried.
    pub outstanding_balance: Decimal,
    /// Lifecycle state.
    pub status:              EntityStatus,
    /// Creation timestamp.
    pub created_at:          DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:          DateTime<Utc>,
}

impl Vendor {
    /// Creates a new active vendor.
    #[must_use]
    pub fn new(name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: VendorId::generate(),
            name: name.into(),
            company_name: None,
            email: None,
            phone: phone.into(),
            address: address.into(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            gst_number: None,
            credit_limit: Decimal::ZERO,
            outstanding_balance: Decimal::ZERO,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the company name.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets city, state and pincode.
    #[must_use]
    pub fn with_location(
        mut self, city: impl Into<String>, state: impl Into<String>, pincode: impl Into<String>,
    ) -> Self {
        self.city = city.into();
        self.state = state.into();
        self.pincode = pincode.into();
        self
    }

    /// Sets the credit limit.
    #[must_use]
    pub fn with_credit_limit(mut self, limit: Decimal) -> Self {
        self.credit_limit = limit;
        self
    }

    /// Credit still available to this vendor.
    #[must_use]
    pub fn available_credit(&self) -> Decimal {
        self.credit_limit - self.outstanding_balance
    }

    /// Updates the timestamp.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.company_name {
            Some(company) => write!(f, "{} - {}", self.name, company),
            None => write!(f, "{} - Individual", self.name),
        }
    }
}

// ============================================================================
// DRIVER
// ============================================================================

/// Delivery driver record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    /// Driver ID.
    pub id:               DriverId,
    /// Driver name.
    pub name:             String,
    /// Contact phone number.
    pub phone:            String,
    /// License number (unique across the registry).
    pub license_number:   String,
    /// Vehicle registration number.
    pub vehicle_number:   String,
    /// Vehicle type.
    pub vehicle_type:     String,
    /// Vehicle capacity in bags.
    pub vehicle_capacity: u32,
    /// Lifecycle state.
    pub status:           EntityStatus,
    /// Creation timestamp.
    pub created_at:       DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:       DateTime<Utc>,
}

impl Driver {
    /// Creates a new active driver with the default vehicle type.
    #[must_use]
    pub fn new(
        name: impl Into<String>, phone: impl Into<String>, license_number: impl Into<String>,
        vehicle_number: impl Into<String>, vehicle_capacity: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DriverId::generate(),
            name: name.into(),
            phone: phone.into(),
            license_number: license_number.into(),
            vehicle_number: vehicle_number.into(),
            vehicle_type: "Truck".to_string(),
            vehicle_capacity,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the vehicle type.
    #[must_use]
    pub fn with_vehicle_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = vehicle_type.into();
        self
    }

    /// Updates the timestamp.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.vehicle_number)
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Vendor search filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorFilter {
    /// Case-insensitive text match on name, company, phone, email or city.
    pub search: Option<String>,
    /// Filter by lifecycle state.
    pub status: Option<EntityStatus>,
}

/// Driver search filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverFilter {
    /// Case-insensitive text match on name, phone, license or vehicle fields.
    pub search:       Option<String>,
    /// Filter by lifecycle state.
    pub status:       Option<EntityStatus>,
    /// Filter by vehicle type.
    pub vehicle_type: Option<String>,
}
