//! Stock movement records: purchases, sales, internal usage and surgeries

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Stock-in from a supplier
    Purchase,
    /// External sale
    Sale,
    /// Internal consumption with no sale price
    Usage,
    /// Consumption in a surgery, billed through the surgeon
    Surgery,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::Sale => "sale",
            TransactionType::Usage => "usage",
            TransactionType::Surgery => "surgery",
        }
    }

    pub fn direction(&self) -> TransactionDirection {
        match self {
            TransactionType::Purchase => TransactionDirection::In,
            TransactionType::Sale | TransactionType::Usage | TransactionType::Surgery => {
                TransactionDirection::Out
            }
        }
    }

    /// Whether a selling price below base price blocks the record
    pub fn requires_margin_check(&self) -> bool {
        matches!(self, TransactionType::Sale | TransactionType::Surgery)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    In,
    Out,
}

impl TransactionDirection {
    /// Signed ledger delta for a quantity moving in this direction
    pub fn signed(&self, quantity: i32) -> i32 {
        match self {
            TransactionDirection::In => quantity,
            TransactionDirection::Out => -quantity,
        }
    }
}

/// Price pair captured on the record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionPricing {
    Purchase {
        unit_cost: Decimal,
        total_cost: Decimal,
    },
    StockOut {
        base_price: Decimal,
        selling_price: Decimal,
        total_base_value: Decimal,
        total_selling_value: Decimal,
    },
}

impl TransactionPricing {
    /// Purchase pricing, or `None` when the total overflows
    pub fn purchase(quantity: i32, unit_cost: Decimal) -> Option<Self> {
        Some(TransactionPricing::Purchase {
            unit_cost,
            total_cost: Decimal::from(quantity).checked_mul(unit_cost)?,
        })
    }

    /// Stock-out pricing, or `None` when either total overflows
    pub fn stock_out(quantity: i32, base_price: Decimal, selling_price: Decimal) -> Option<Self> {
        let qty = Decimal::from(quantity);
        Some(TransactionPricing::StockOut {
            base_price,
            selling_price,
            total_base_value: qty.checked_mul(base_price)?,
            total_selling_value: qty.checked_mul(selling_price)?,
        })
    }

    /// Recompute the totals for a new quantity, keeping unit prices
    pub fn with_quantity(&self, quantity: i32) -> Option<Self> {
        match self {
            TransactionPricing::Purchase { unit_cost, .. } => Self::purchase(quantity, *unit_cost),
            TransactionPricing::StockOut {
                base_price,
                selling_price,
                ..
            } => Self::stock_out(quantity, *base_price, *selling_price),
        }
    }

    pub fn total_base_value(&self) -> Decimal {
        match self {
            TransactionPricing::Purchase { total_cost, .. } => *total_cost,
            TransactionPricing::StockOut {
                total_base_value, ..
            } => *total_base_value,
        }
    }

    pub fn total_selling_value(&self) -> Decimal {
        match self {
            TransactionPricing::Purchase { .. } => Decimal::ZERO,
            TransactionPricing::StockOut {
                total_selling_value,
                ..
            } => *total_selling_value,
        }
    }

    /// Selling minus base value; zero for purchases
    pub fn profit(&self) -> Decimal {
        match self {
            TransactionPricing::Purchase { .. } => Decimal::ZERO,
            TransactionPricing::StockOut {
                total_base_value,
                total_selling_value,
                ..
            } => total_selling_value - total_base_value,
        }
    }
}

/// A recorded stock movement.
///
/// Item, supplier and doctor names are snapshots taken at creation; renaming
/// the referenced entity later does not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub pricing: TransactionPricing,
    pub date: NaiveDate,

    // Purchase only
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,

    // Surgery only
    pub surgery_id: Option<Uuid>,
    pub procedure: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,

    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_locked: bool,
}

impl Transaction {
    /// Surgery grouping key: the shared surgery id, or the record's own id
    pub fn surgery_key(&self) -> Uuid {
        self.surgery_id.unwrap_or(self.id)
    }
}
