//! Pricing and stock rules
//!
//! Pure functions shared by the engine and the browser bindings:
//! - stock status thresholds
//! - dead-stock month arithmetic
//! - margin validation for the dual-price model
//! - proportional cost for plate cutting

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::StockStatus;

/// Months without movement before an item counts as dead stock
pub const DEFAULT_DEAD_STOCK_THRESHOLD_MONTHS: u32 = 6;

/// Thresholds the settings screen offers
pub const DEAD_STOCK_THRESHOLD_OPTIONS: [u32; 4] = [3, 6, 9, 12];

/// Warning shown when a selling price falls below base price
pub const MARGIN_WARNING_EN: &str = "Critical: selling price is below base price";
pub const MARGIN_WARNING_AR: &str = "تحذير حرج: سعر البيع أقل من السعر الأساسي!";

/// Default markup applied to a newly cut plate variant (35%)
pub fn default_plate_markup() -> Decimal {
    Decimal::new(135, 2)
}

// ============================================================================
// Stock Status
// ============================================================================

/// Classify a stock level against its minimum
pub fn stock_status(quantity: i32, min_stock: i32) -> StockStatus {
    let quantity = i64::from(quantity);
    let min_stock = i64::from(min_stock);

    if quantity <= min_stock {
        StockStatus::Low
    } else if quantity <= min_stock * 2 {
        StockStatus::Medium
    } else {
        StockStatus::Good
    }
}

// ============================================================================
// Dead Stock
// ============================================================================

/// Calendar month difference, ignoring the day of month.
///
/// March 31st to April 1st is one month.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Whether an item last moved at `last_movement` is dead stock as of `now`
pub fn is_dead_stock_at(
    last_movement: DateTime<Utc>,
    threshold_months: u32,
    now: DateTime<Utc>,
) -> bool {
    i64::from(months_between(last_movement, now)) >= i64::from(threshold_months)
}

/// Whether an item is dead stock as of the current time
pub fn is_dead_stock(last_movement: DateTime<Utc>, threshold_months: u32) -> bool {
    is_dead_stock_at(last_movement, threshold_months, Utc::now())
}

/// Whole days elapsed since the last movement
pub fn days_since(last_movement: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_movement).num_days()
}

// ============================================================================
// Margin Validation
// ============================================================================

/// Result of comparing a selling price against the base price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarginValidation {
    pub is_valid: bool,
    pub message: Option<String>,
    pub message_ar: Option<String>,
    /// (selling - base) / base × 100; zero when base is zero
    pub margin_percentage: Decimal,
}

/// Margin as a percentage of base price, defined as zero for a zero base
pub fn margin_percentage(base_price: Decimal, selling_price: Decimal) -> Decimal {
    if base_price.is_zero() {
        return Decimal::ZERO;
    }
    (selling_price - base_price) * Decimal::ONE_HUNDRED / base_price
}

/// Validate that a selling price does not undercut the base price
pub fn validate_margin(base_price: Decimal, selling_price: Decimal) -> MarginValidation {
    let margin_percentage = margin_percentage(base_price, selling_price);

    if selling_price < base_price {
        return MarginValidation {
            is_valid: false,
            message: Some(MARGIN_WARNING_EN.to_string()),
            message_ar: Some(MARGIN_WARNING_AR.to_string()),
            margin_percentage,
        };
    }

    MarginValidation {
        is_valid: true,
        message: None,
        message_ar: None,
        margin_percentage,
    }
}

// ============================================================================
// Plate Cutting
// ============================================================================

/// Leading integer of a length label such as "8-hole" or "12mm"
pub fn parse_hole_count(length: &str) -> Option<u32> {
    let digits: String = length
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Cost of a plate cut down from `original_length` to `new_length`.
///
/// The cost shrinks in proportion to the hole count. An unparseable length,
/// or a target that is not shorter, leaves the base price unchanged.
pub fn calculate_plate_cutting_cost(
    original_length: &str,
    new_length: &str,
    base_price: Decimal,
) -> Decimal {
    let (Some(original_holes), Some(new_holes)) =
        (parse_hole_count(original_length), parse_hole_count(new_length))
    else {
        return base_price;
    };

    if original_holes == 0 || new_holes >= original_holes {
        return base_price;
    }

    (base_price * Decimal::from(new_holes) / Decimal::from(original_holes))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Selling price for a new plate variant: cost × markup, whole units
pub fn plate_selling_price(cost: Decimal, markup: Decimal) -> Decimal {
    (cost * markup).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// SKU for a cut plate: the source SKU with its last segment replaced by the
/// hole count, e.g. `PLT-TI-35-8H` cut to "4-hole" becomes `PLT-TI-35-4H`
pub fn plate_variant_sku(source_sku: &str, new_length: &str) -> String {
    let suffix = new_length.replace("-hole", "H");
    let prefix = match source_sku.rsplit_once('-') {
        Some((prefix, _)) => prefix,
        None => source_sku,
    };
    format!("{}-{}", prefix, suffix)
}
