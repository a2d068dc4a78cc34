//! Analytics service for dead stock, surgeon portfolios and dashboards
//!
//! Everything here is a pure read recomputed from the store on each call.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::{
    days_since, is_dead_stock_at, validate_dead_stock_threshold, AnalyticsSummary, Capability,
    CategoryBreakdown, DashboardStats, DeadStockEntry, InventoryItem, StockStatus,
    SurgeonPortfolioEntry, SurgeryProfitability, Transaction, TransactionType,
};
use uuid::Uuid;

use crate::config::InventorySettings;
use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::store::{SharedStore, Store};

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    store: SharedStore,
    settings: InventorySettings,
}

impl AnalyticsService {
    pub fn new(store: SharedStore, settings: InventorySettings) -> Self {
        Self { store, settings }
    }

    /// Items without movement for at least `threshold_months`, longest idle
    /// first. Falls back to the configured threshold.
    pub fn dead_stock_report(
        &self,
        session: &Session,
        threshold_months: Option<u32>,
    ) -> AppResult<Vec<DeadStockEntry>> {
        session.require(Capability::ViewAnalytics, "view analytics")?;
        let threshold = self.resolve_threshold(threshold_months)?;

        let store = self.store.read()?;
        Ok(dead_stock(&store, threshold, Utc::now()))
    }

    /// Surgery consumption and profit per doctor, most profitable first
    pub fn surgeon_portfolio(&self, session: &Session) -> AppResult<Vec<SurgeonPortfolioEntry>> {
        session.require(Capability::ViewAnalytics, "view analytics")?;
        let store = self.store.read()?;
        Ok(portfolio(&store))
    }

    /// Profitability of each surgery, most profitable first
    pub fn surgery_profitability(
        &self,
        session: &Session,
    ) -> AppResult<Vec<SurgeryProfitability>> {
        session.require(Capability::ViewAnalytics, "view analytics")?;
        let store = self.store.read()?;
        Ok(surgeries(&store))
    }

    /// Headline figures for the analytics page
    pub fn analytics_summary(
        &self,
        session: &Session,
        threshold_months: Option<u32>,
    ) -> AppResult<AnalyticsSummary> {
        session.require(Capability::ViewAnalytics, "view analytics")?;
        let threshold = self.resolve_threshold(threshold_months)?;

        let store = self.store.read()?;
        let surgeries = surgeries(&store);
        let portfolio = portfolio(&store);
        let dead = dead_stock(&store, threshold, Utc::now());

        let total_profit: Decimal = surgeries.iter().map(|s| s.profit).sum();
        let surgery_count = surgeries.len() as u32;
        let avg_profit_per_surgery = if surgery_count > 0 {
            (total_profit / Decimal::from(surgery_count))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };
        let top = portfolio.first();

        Ok(AnalyticsSummary {
            total_profit,
            avg_profit_per_surgery,
            surgery_count,
            dead_stock_value: dead.iter().map(|d| d.total_value).sum(),
            dead_stock_count: dead.len() as u32,
            top_doctor_name: top.map(|d| d.doctor_name.clone()),
            top_doctor_profit: top.map_or(Decimal::ZERO, |d| d.profit),
        })
    }

    /// Dashboard overview. Money figures are filled in only for sessions
    /// that may view financials; profit additionally needs `view_profit`.
    pub fn dashboard(&self, session: &Session) -> AppResult<DashboardStats> {
        session.require(Capability::ViewInventory, "view the dashboard")?;
        let store = self.store.read()?;
        let now = Utc::now();

        let low_stock_count = store
            .items
            .iter()
            .filter(|i| i.stock_status() == StockStatus::Low)
            .count() as u32;
        let dead_stock_count = store
            .items
            .iter()
            .filter(|i| {
                is_dead_stock_at(
                    i.last_movement_date,
                    self.settings.dead_stock_threshold_months,
                    now,
                )
            })
            .count() as u32;

        let financials = session.can(Capability::ViewFinancials);
        let revenue_records = || {
            store.transactions.iter().filter(|t| {
                matches!(
                    t.transaction_type,
                    TransactionType::Sale | TransactionType::Surgery
                )
            })
        };

        let total_inventory_value = financials
            .then(|| store.items.iter().map(InventoryItem::value_at_base).sum::<Decimal>());
        let total_purchases = financials.then(|| {
            store
                .transactions
                .iter()
                .filter(|t| t.transaction_type == TransactionType::Purchase)
                .map(|t| t.pricing.total_base_value())
                .sum::<Decimal>()
        });
        let total_sales = financials
            .then(|| revenue_records().map(|t| t.pricing.total_selling_value()).sum::<Decimal>());
        let total_profit = (financials && session.can(Capability::ViewProfit))
            .then(|| revenue_records().map(|t| t.pricing.profit()).sum::<Decimal>());

        Ok(DashboardStats {
            total_skus: store.items.len() as u32,
            total_units: store.items.iter().map(|i| i64::from(i.quantity)).sum(),
            low_stock_count,
            dead_stock_count,
            total_inventory_value,
            total_purchases,
            total_sales,
            total_profit,
        })
    }

    /// Items at or below their minimum, in catalog order
    pub fn low_stock_items(&self, session: &Session, limit: usize) -> AppResult<Vec<InventoryItem>> {
        session.require(Capability::ViewInventory, "view inventory")?;
        if !self.settings.low_stock_alert_enabled {
            return Ok(Vec::new());
        }

        let store = self.store.read()?;
        Ok(store
            .items
            .iter()
            .filter(|i| i.stock_status() == StockStatus::Low)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Item count, units and value per category
    pub fn inventory_by_category(&self, session: &Session) -> AppResult<Vec<CategoryBreakdown>> {
        session.require(Capability::ViewInventory, "view inventory")?;
        let financials = session.can(Capability::ViewFinancials);
        let store = self.store.read()?;

        let mut by_category: BTreeMap<_, CategoryBreakdown> = BTreeMap::new();
        for item in &store.items {
            let entry = by_category
                .entry(item.category)
                .or_insert_with(|| CategoryBreakdown {
                    category: item.category,
                    item_count: 0,
                    quantity: 0,
                    value: financials.then_some(Decimal::ZERO),
                });
            entry.item_count += 1;
            entry.quantity += i64::from(item.quantity);
            if let Some(value) = entry.value.as_mut() {
                *value += item.value_at_base();
            }
        }

        Ok(by_category.into_values().collect())
    }

    /// Items holding the most value at base price
    pub fn top_items_by_value(
        &self,
        session: &Session,
        limit: usize,
    ) -> AppResult<Vec<InventoryItem>> {
        session.require(Capability::ViewFinancials, "view stock value")?;
        let store = self.store.read()?;

        let mut items = store.items.clone();
        items.sort_by(|a, b| b.value_at_base().cmp(&a.value_at_base()));
        items.truncate(limit);
        Ok(items)
    }

    fn resolve_threshold(&self, threshold_months: Option<u32>) -> AppResult<u32> {
        let threshold = threshold_months.unwrap_or(self.settings.dead_stock_threshold_months);
        validate_dead_stock_threshold(threshold).map_err(|e| {
            AppError::validation(
                "threshold_months",
                e.to_string(),
                "مدة المخزون الراكد يجب أن تكون 3 أو 6 أو 9 أو 12 شهرًا",
            )
        })?;
        Ok(threshold)
    }
}

fn dead_stock(store: &Store, threshold_months: u32, now: DateTime<Utc>) -> Vec<DeadStockEntry> {
    let mut entries: Vec<DeadStockEntry> = store
        .items
        .iter()
        .filter(|i| is_dead_stock_at(i.last_movement_date, threshold_months, now))
        .map(|i| DeadStockEntry {
            days_since_movement: days_since(i.last_movement_date, now),
            total_value: i.value_at_base(),
            item: i.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.days_since_movement.cmp(&a.days_since_movement));
    entries
}

fn surgery_lines(store: &Store) -> impl Iterator<Item = &Transaction> {
    store
        .transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Surgery)
}

fn portfolio(store: &Store) -> Vec<SurgeonPortfolioEntry> {
    let mut by_doctor: HashMap<Uuid, (SurgeonPortfolioEntry, HashSet<Uuid>)> = HashMap::new();

    for line in surgery_lines(store) {
        let Some(doctor_id) = line.doctor_id else {
            continue;
        };
        let (entry, seen) = by_doctor.entry(doctor_id).or_insert_with(|| {
            let doctor = store.doctor(doctor_id).ok();
            let entry = SurgeonPortfolioEntry {
                doctor_id,
                doctor_name: doctor
                    .map(|d| d.name.clone())
                    .or_else(|| line.doctor_name.clone())
                    .unwrap_or_default(),
                specialty: doctor.map(|d| d.specialty.clone()),
                surgery_count: 0,
                total_base_value: Decimal::ZERO,
                total_selling_value: Decimal::ZERO,
                profit: Decimal::ZERO,
            };
            (entry, HashSet::new())
        });

        if seen.insert(line.surgery_key()) {
            entry.surgery_count += 1;
        }
        entry.total_base_value += line.pricing.total_base_value();
        entry.total_selling_value += line.pricing.total_selling_value();
        entry.profit += line.pricing.profit();
    }

    let mut entries: Vec<SurgeonPortfolioEntry> =
        by_doctor.into_values().map(|(entry, _)| entry).collect();
    entries.sort_by(|a, b| {
        b.profit
            .cmp(&a.profit)
            .then_with(|| a.doctor_name.cmp(&b.doctor_name))
    });
    entries
}

fn surgeries(store: &Store) -> Vec<SurgeryProfitability> {
    let mut by_surgery: HashMap<Uuid, SurgeryProfitability> = HashMap::new();

    for line in surgery_lines(store) {
        let entry = by_surgery
            .entry(line.surgery_key())
            .or_insert_with(|| SurgeryProfitability {
                surgery_id: line.surgery_key(),
                date: line.date,
                doctor_id: line.doctor_id,
                doctor_name: line.doctor_name.clone(),
                patient_name: line.patient_name.clone(),
                procedure: line.procedure.clone(),
                line_count: 0,
                total_base_value: Decimal::ZERO,
                total_selling_value: Decimal::ZERO,
                profit: Decimal::ZERO,
                profit_margin: Decimal::ZERO,
            });
        entry.line_count += 1;
        entry.total_base_value += line.pricing.total_base_value();
        entry.total_selling_value += line.pricing.total_selling_value();
        entry.profit += line.pricing.profit();
    }

    let mut entries: Vec<SurgeryProfitability> = by_surgery
        .into_values()
        .map(|mut s| {
            s.profit_margin = profit_margin(s.profit, s.total_base_value);
            s
        })
        .collect();
    entries.sort_by(|a, b| {
        b.profit
            .cmp(&a.profit)
            .then_with(|| b.date.cmp(&a.date))
    });
    entries
}

/// profit / base × 100 to one decimal place, zero for a zero base
pub fn profit_margin(profit: Decimal, total_base_value: Decimal) -> Decimal {
    if total_base_value.is_zero() {
        return Decimal::ZERO;
    }
    (profit * Decimal::ONE_HUNDRED / total_base_value)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
