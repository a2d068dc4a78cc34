//! Validation utilities for the surgical inventory platform
//!
//! Field-level checks shared by the engine's commands and the browser forms.

use rust_decimal::Decimal;

use crate::models::PLATE_LENGTH_OPTIONS;
use crate::pricing::DEAD_STOCK_THRESHOLD_OPTIONS;
use crate::types::RuleError;

// ============================================================================
// Stock Validations
// ============================================================================

/// Movement quantities must be positive
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Minimum stock levels cannot be negative
pub fn validate_min_stock(min_stock: i32) -> Result<(), &'static str> {
    if min_stock < 0 {
        return Err("Minimum stock cannot be negative");
    }
    Ok(())
}

/// Initial on-hand quantity cannot be negative
pub fn validate_initial_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Highest unit price accepted anywhere in the catalog or the ledger
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Prices cannot be negative or above `MAX_PRICE`
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    if price > MAX_PRICE {
        return Err("Price exceeds the supported maximum");
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate SKU format (non-empty, no whitespace, at most 40 characters)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.trim().is_empty() {
        return Err("SKU is required");
    }
    if sku.len() > 40 {
        return Err("SKU must be at most 40 characters");
    }
    if sku.chars().any(char::is_whitespace) {
        return Err("SKU cannot contain spaces");
    }
    Ok(())
}

/// Validate a required display name
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    Ok(())
}

/// Validate a plate length against the catalog (e.g. "6-hole")
pub fn validate_plate_length(length: &str) -> Result<(), &'static str> {
    if PLATE_LENGTH_OPTIONS.contains(&length) {
        Ok(())
    } else {
        Err("Unknown plate length")
    }
}

// ============================================================================
// Settings Validations
// ============================================================================

/// Dead-stock threshold must be one of the offered options
pub fn validate_dead_stock_threshold(months: u32) -> Result<(), RuleError> {
    if DEAD_STOCK_THRESHOLD_OPTIONS.contains(&months) {
        Ok(())
    } else {
        Err(RuleError::UnsupportedThreshold(months))
    }
}

/// Markups below 1.0 would price new variants under cost
pub fn validate_markup(markup: Decimal) -> Result<(), &'static str> {
    if markup < Decimal::ONE {
        return Err("Markup must be at least 1.0");
    }
    Ok(())
}
