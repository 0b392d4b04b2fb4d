//! # Directory Service Implementation
//!
//! Implementation of the vendor and driver registries.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    errors::{ErpError, ErpResult},
    types::directory::{Driver, DriverFilter, DriverId, Vendor, VendorFilter, VendorId},
    types::EntityStatus,
};

/// Vendor and driver registry.
#[derive(Debug, Clone)]
pub struct DirectoryService {
    /// Vendors indexed by ID.
    vendors:            Arc<Mutex<HashMap<VendorId, Vendor>>>,
    /// Drivers indexed by ID.
    drivers:            Arc<Mutex<HashMap<DriverId, Driver>>>,
    /// License number uniqueness index.
    drivers_by_license: Arc<Mutex<HashMap<String, DriverId>>>,
}

impl DirectoryService {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vendors:            Arc::new(Mutex::new(HashMap::new())),
            drivers:            Arc::new(Mutex::new(HashMap::new())),
            drivers_by_license: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // ========================================================================
    // VENDOR OPERATIONS
    // ========================================================================

    /// Registers a vendor.
    ///
    /// # Errors
    /// Returns `Validation` when required fields are missing, the phone
    /// number is malformed, or the outstanding balance exceeds the credit
    /// limit.
    pub fn create_vendor(&self, vendor: Vendor) -> ErpResult<Vendor> {
        validate_vendor(&vendor)?;

        let mut vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;
        vendors.insert(vendor.id, vendor.clone());

        log::info!("registered vendor {} ({})", vendor.name, vendor.id);
        Ok(vendor)
    }

    /// Gets a vendor by ID.
    pub fn get_vendor(&self, id: &VendorId) -> ErpResult<Vendor> {
        let vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;
        vendors.get(id).cloned().ok_or_else(|| ErpError::VendorNotFound(id.to_string()))
    }

    /// Replaces a vendor record.
    ///
    /// # Errors
    /// Returns `VendorNotFound` if the vendor does not exist, or
    /// `Validation` when the updated record breaks an invariant.
    pub fn update_vendor(&self, mut vendor: Vendor) -> ErpResult<Vendor> {
        validate_vendor(&vendor)?;

        let mut vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;
        if !vendors.contains_key(&vendor.id) {
            return Err(ErpError::VendorNotFound(vendor.id.to_string()));
        }

        vendor.touch();
        vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    /// Marks a vendor inactive. The record is kept for historical orders.
    pub fn deactivate_vendor(&self, id: &VendorId) -> ErpResult<Vendor> {
        self.set_vendor_status(id, EntityStatus::Inactive)
    }

    /// Returns a vendor to active use.
    pub fn reactivate_vendor(&self, id: &VendorId) -> ErpResult<Vendor> {
        self.set_vendor_status(id, EntityStatus::Active)
    }

    fn set_vendor_status(&self, id: &VendorId, status: EntityStatus) -> ErpResult<Vendor> {
        let mut vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;
        let vendor =
            vendors.get_mut(id).ok_or_else(|| ErpError::VendorNotFound(id.to_string()))?;
        vendor.status = status;
        vendor.touch();
        Ok(vendor.clone())
    }

    /// Physically removes a vendor.
    ///
    /// Referential checks against the order book are the caller's
    /// responsibility; see [`CemErp::remove_vendor`](crate::CemErp::remove_vendor).
    pub(crate) fn remove_vendor(&self, id: &VendorId) -> ErpResult<Vendor> {
        let mut vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;
        vendors.remove(id).ok_or_else(|| ErpError::VendorNotFound(id.to_string()))
    }

    /// Searches vendors, sorted by name.
    pub fn search_vendors(&self, filter: &VendorFilter) -> ErpResult<Vec<Vendor>> {
        let vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut matched: Vec<Vendor> =
            vendors.values().filter(|v| vendor_matches(v, filter)).cloned().collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(matched)
    }

    /// Number of active vendors.
    pub fn active_vendor_count(&self) -> ErpResult<usize> {
        let vendors = self.vendors.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(vendors.values().filter(|v| v.status.is_active()).count())
    }

    // ========================================================================
    // DRIVER OPERATIONS
    // ========================================================================

    /// Registers a driver.
    ///
    /// # Errors
    /// Returns `DuplicateLicense` if the license number is already on file.
    pub fn create_driver(&self, driver: Driver) -> ErpResult<Driver> {
        validate_driver(&driver)?;

        let mut drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;
        let mut by_license =
            self.drivers_by_license.lock().map_err(|_| ErpError::LockPoisoned)?;

        if by_license.contains_key(&driver.license_number) {
            return Err(ErpError::DuplicateLicense(driver.license_number.clone()));
        }

        by_license.insert(driver.license_number.clone(), driver.id);
        drivers.insert(driver.id, driver.clone());

        log::info!("registered driver {} ({})", driver.name, driver.id);
        Ok(driver)
    }

    /// Gets a driver by ID.
    pub fn get_driver(&self, id: &DriverId) -> ErpResult<Driver> {
        let drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;
        drivers.get(id).cloned().ok_or_else(|| ErpError::DriverNotFound(id.to_string()))
    }

    /// Replaces a driver record, re-indexing the license number if it
    /// changed.
    pub fn update_driver(&self, mut driver: Driver) -> ErpResult<Driver> {
        validate_driver(&driver)?;

        let mut drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;
        let mut by_license =
            self.drivers_by_license.lock().map_err(|_| ErpError::LockPoisoned)?;

        let existing = drivers
            .get(&driver.id)
            .ok_or_else(|| ErpError::DriverNotFound(driver.id.to_string()))?;

        if existing.license_number != driver.license_number {
            if by_license.contains_key(&driver.license_number) {
                return Err(ErpError::DuplicateLicense(driver.license_number.clone()));
            }
            by_license.remove(&existing.license_number);
            by_license.insert(driver.license_number.clone(), driver.id);
        }

        driver.touch();
        drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    /// Marks a driver unavailable.
    pub fn deactivate_driver(&self, id: &DriverId) -> ErpResult<Driver> {
        self.set_driver_status(id, EntityStatus::Inactive)
    }

    /// Returns a driver to active duty.
    pub fn reactivate_driver(&self, id: &DriverId) -> ErpResult<Driver> {
        self.set_driver_status(id, EntityStatus::Active)
    }

    fn set_driver_status(&self, id: &DriverId, status: EntityStatus) -> ErpResult<Driver> {
        let mut drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;
        let driver =
            drivers.get_mut(id).ok_or_else(|| ErpError::DriverNotFound(id.to_string()))?;
        driver.status = status;
        driver.touch();
        Ok(driver.clone())
    }

    /// Physically removes a driver.
    ///
    /// Orders referencing the driver must be detached first; see
    /// [`CemErp::remove_driver`](crate::CemErp::remove_driver).
    pub(crate) fn remove_driver(&self, id: &DriverId) -> ErpResult<Driver> {
        let mut drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;
        let mut by_license =
            self.drivers_by_license.lock().map_err(|_| ErpError::LockPoisoned)?;

        let driver =
            drivers.remove(id).ok_or_else(|| ErpError::DriverNotFound(id.to_string()))?;
        by_license.remove(&driver.license_number);
        Ok(driver)
    }

    /// Searches drivers, sorted by name.
    pub fn search_drivers(&self, filter: &DriverFilter) -> ErpResult<Vec<Driver>> {
        let drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;

        let mut matched: Vec<Driver> =
            drivers.values().filter(|d| driver_matches(d, filter)).cloned().collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(matched)
    }

    /// Number of active drivers.
    pub fn active_driver_count(&self) -> ErpResult<usize> {
        let drivers = self.drivers.lock().map_err(|_| ErpError::LockPoisoned)?;
        Ok(drivers.values().filter(|d| d.status.is_active()).count())
    }
}

impl Default for DirectoryService {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// VALIDATION & MATCHING
// ============================================================================

fn validate_vendor(vendor: &Vendor) -> ErpResult<()> {
    if vendor.name.trim().is_empty() {
        return Err(ErpError::Validation("vendor name is required".to_string()));
    }
    validate_phone(&vendor.phone)?;
    if vendor.credit_limit < rust_decimal::Decimal::ZERO {
        return Err(ErpError::Validation("credit limit cannot be negative".to_string()));
    }
    if vendor.outstanding_balance < rust_decimal::Decimal::ZERO {
        return Err(ErpError::Validation(
            "outstanding balance cannot be negative".to_string(),
        ));
    }
    if vendor.outstanding_balance > vendor.credit_limit {
        return Err(ErpError::Validation(format!(
            "outstanding balance {} exceeds credit limit {}",
            vendor.outstanding_balance, vendor.credit_limit
        )));
    }
    Ok(())
}

fn validate_driver(driver: &Driver) -> ErpResult<()> {
    if driver.name.trim().is_empty() {
        return Err(ErpError::Validation("driver name is required".to_string()));
    }
    if driver.license_number.trim().is_empty() {
        return Err(ErpError::Validation("license number is required".to_string()));
    }
    if driver.vehicle_capacity == 0 {
        return Err(ErpError::Validation(
            "vehicle capacity must be at least one bag".to_string(),
        ));
    }
    validate_phone(&driver.phone)
}

/// Digits only, optional leading `+`, 9-15 digits.
fn validate_phone(phone: &str) -> ErpResult<()> {
    let digits: String =
        phone.strip_prefix('+').unwrap_or(phone).chars().filter(|c| !c.is_whitespace()).collect();

    if digits.len() < 9 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ErpError::Validation(format!("invalid phone number: {phone}")));
    }
    Ok(())
}

fn vendor_matches(vendor: &Vendor, filter: &VendorFilter) -> bool {
    if let Some(status) = filter.status {
        if vendor.status != status {
            return false;
        }
    }

    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let haystacks = [
            Some(vendor.name.as_str()),
            vendor.company_name.as_deref(),
            Some(vendor.phone.as_str()),
            vendor.email.as_deref(),
            Some(vendor.city.as_str()),
        ];
        if !haystacks
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
        {
            return false;
        }
    }

    true
}

fn driver_matches(driver: &Driver, filter: &DriverFilter) -> bool {
    if let Some(status) = filter.status {
        if driver.status != status {
            return false;
        }
    }

    if let Some(vehicle_type) = &filter.vehicle_type {
        if !driver.vehicle_type.eq_ignore_ascii_case(vehicle_type) {
            return false;
        }
    }

    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let haystacks = [
            driver.name.as_str(),
            driver.phone.as_str(),
            driver.license_number.as_str(),
            driver.vehicle_number.as_str(),
            driver.vehicle_type.as_str(),
        ];
        if !haystacks.iter().any(|field| field.to_lowercase().contains(&needle)) {
            return false;
        }
    }

    true
}
