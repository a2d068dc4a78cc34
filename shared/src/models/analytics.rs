//! Derived report rows

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InventoryItem, ItemCategory};

/// An item with no movement for at least the dead-stock threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadStockEntry {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub days_since_movement: i64,
    /// quantity × base price
    pub total_value: Decimal,
}

/// Consumption and profit for one surgeon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeonPortfolioEntry {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub specialty: Option<String>,
    pub surgery_count: u32,
    pub total_base_value: Decimal,
    pub total_selling_value: Decimal,
    pub profit: Decimal,
}

/// Profitability of a single surgery across all of its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeryProfitability {
    pub surgery_id: Uuid,
    pub date: NaiveDate,
    pub doctor_id: Option<Uuid>,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub procedure: Option<String>,
    pub line_count: u32,
    pub total_base_value: Decimal,
    pub total_selling_value: Decimal,
    pub profit: Decimal,
    /// profit / base × 100, one decimal place; zero when base is zero
    pub profit_margin: Decimal,
}

/// Headline analytics figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_profit: Decimal,
    pub avg_profit_per_surgery: Decimal,
    pub surgery_count: u32,
    pub dead_stock_value: Decimal,
    pub dead_stock_count: u32,
    pub top_doctor_name: Option<String>,
    pub top_doctor_profit: Decimal,
}

/// Dashboard overview; money figures are present only for roles that may
/// view financials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_skus: u32,
    pub total_units: i64,
    pub low_stock_count: u32,
    pub dead_stock_count: u32,
    pub total_inventory_value: Option<Decimal>,
    pub total_purchases: Option<Decimal>,
    pub total_sales: Option<Decimal>,
    pub total_profit: Option<Decimal>,
}

/// Stock grouped by category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: ItemCategory,
    pub item_count: u32,
    pub quantity: i64,
    /// Stock value at base price; present only for roles that may view
    /// financials
    pub value: Option<Decimal>,
}
