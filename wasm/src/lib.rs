//! WebAssembly module for the surgical inventory front end
//!
//! Provides client-side evaluation of:
//! - Stock status badges
//! - Margin warnings while a price is being typed
//! - Plate cutting cost previews
//! - Dead stock flags
//! - Role permission matrices

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::pricing;
pub use shared::validation::*;

fn to_decimal(value: f64, name: &str) -> Result<Decimal, JsValue> {
    Decimal::try_from(value).map_err(|_| JsValue::from_str(&format!("Invalid {}: {}", name, value)))
}

fn parse_date(iso_date: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(iso_date)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", iso_date, e)))
}

/// Stock status ("low", "medium" or "good") for a quantity and minimum
#[wasm_bindgen]
pub fn stock_status(quantity: i32, min_stock: i32) -> String {
    pricing::stock_status(quantity, min_stock).to_string()
}

/// Margin check as JSON: `{ is_valid, message, message_ar, margin_percentage }`
#[wasm_bindgen]
pub fn validate_margin(base_price: f64, selling_price: f64) -> Result<String, JsValue> {
    let result = pricing::validate_margin(
        to_decimal(base_price, "base price")?,
        to_decimal(selling_price, "selling price")?,
    );

    if !result.is_valid {
        web_sys::console::warn_1(&JsValue::from_str(pricing::MARGIN_WARNING_EN));
    }

    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Cost of a plate cut from `original_length` to `new_length`
#[wasm_bindgen]
pub fn calculate_plate_cutting_cost(
    original_length: &str,
    new_length: &str,
    base_price: f64,
) -> Result<f64, JsValue> {
    let cost = pricing::calculate_plate_cutting_cost(
        original_length,
        new_length,
        to_decimal(base_price, "base price")?,
    );
    Ok(cost.to_f64().unwrap_or(0.0))
}

/// Whether an item last moved at `last_movement` (RFC 3339) is dead stock now
#[wasm_bindgen]
pub fn is_dead_stock(last_movement: &str, threshold_months: u32) -> Result<bool, JsValue> {
    is_dead_stock_at(last_movement, threshold_months, js_sys::Date::now())
}

/// Dead stock check against an explicit clock, in milliseconds since the epoch
#[wasm_bindgen]
pub fn is_dead_stock_at(
    last_movement: &str,
    threshold_months: u32,
    now_ms: f64,
) -> Result<bool, JsValue> {
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms as i64)
        .ok_or_else(|| JsValue::from_str("Invalid current time"))?;
    Ok(pricing::is_dead_stock_at(
        parse_date(last_movement)?,
        threshold_months,
        now,
    ))
}

/// Permission matrix for a role name as JSON
#[wasm_bindgen]
pub fn permissions_for_role(role: &str) -> Result<String, JsValue> {
    let role: Role = role
        .parse()
        .map_err(|e: shared::RuleError| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&role.permissions()).map_err(|e| JsValue::from_str(&e.to_string()))
}
