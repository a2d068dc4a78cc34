//! Stock movement records: creation, locking, editing and deletion
//!
//! Every record is locked as soon as it is created. Only roles holding
//! `edit_after_submit` may change a locked record, and only roles holding
//! `delete_records` may remove one. Neither an edit nor a delete touches the
//! ledger: the quantity applied at creation stays applied.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_price, validate_quantity, Capability, DateRange, InventoryItem, Transaction,
    TransactionPricing, TransactionType,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::RecordSettings;
use crate::error::{AppError, AppResult};
use crate::services::{ensure_margin, field_error, out_of_range, InventoryService};
use crate::session::Session;
use crate::store::{SharedStore, Store};

/// Record service for purchases, sales, usage and surgeries
#[derive(Clone)]
pub struct RecordService {
    store: SharedStore,
    settings: RecordSettings,
}

/// Input for recording a purchase (stock-in)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PurchaseInput {
    pub item_id: Uuid,
    pub supplier_id: Uuid,
    pub quantity: i32,
    /// Defaults to the item's base price
    pub unit_cost: Option<Decimal>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Input for recording a sale, internal usage or single-item surgery
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockOutInput {
    pub transaction_type: TransactionType,
    pub item_id: Uuid,
    pub quantity: i32,
    /// Defaults to the item's selling price
    pub selling_price: Option<Decimal>,
    pub doctor_id: Option<Uuid>,
    #[validate(length(max = 200))]
    pub patient_name: Option<String>,
    #[validate(length(max = 200))]
    pub procedure: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Input for any new stock movement
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum CreateTransactionInput {
    Purchase(PurchaseInput),
    StockOut(StockOutInput),
}

/// One item consumed in a surgery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeryLineInput {
    pub item_id: Uuid,
    pub quantity: i32,
    /// Defaults to the item's selling price
    pub selling_price: Option<Decimal>,
}

/// Input for recording a surgery with several items
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordSurgeryInput {
    pub doctor_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub patient_name: String,
    #[validate(length(max = 200))]
    pub procedure: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<SurgeryLineInput>,
}

/// Changes to an existing record; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransactionInput {
    pub quantity: Option<i32>,
    /// Purchases only
    pub unit_cost: Option<Decimal>,
    /// Sales, usage and surgeries only
    pub selling_price: Option<Decimal>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub patient_name: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Filter for listing records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub item_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    /// Matches item, supplier, doctor or patient names
    pub search: Option<String>,
    pub date_range: Option<DateRange>,
}

impl TransactionFilter {
    fn matches(&self, tx: &Transaction) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    Some(tx.item_name.as_str()),
                    tx.supplier_name.as_deref(),
                    tx.doctor_name.as_deref(),
                    tx.patient_name.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|name| name.to_lowercase().contains(&term))
            }
        };

        matches_search
            && self.transaction_type.map_or(true, |t| tx.transaction_type == t)
            && self.item_id.map_or(true, |id| tx.item_id == id)
            && self.supplier_id.map_or(true, |id| tx.supplier_id == Some(id))
            && self.doctor_id.map_or(true, |id| tx.doctor_id == Some(id))
            && self.date_range.map_or(true, |r| r.contains(tx.date))
    }
}

/// Stock-out line validated against the store but not yet applied
struct PendingStockOut {
    item: InventoryItem,
    quantity: i32,
    pricing: TransactionPricing,
}

impl RecordService {
    /// Create a new RecordService instance
    pub fn new(store: SharedStore, settings: RecordSettings) -> Self {
        Self { store, settings }
    }

    /// Whether a selling price below base blocks this kind of record
    pub fn margin_check_applies(&self, transaction_type: TransactionType) -> bool {
        match transaction_type {
            TransactionType::Usage => !self.settings.usage_bypasses_margin_check,
            other => other.requires_margin_check(),
        }
    }

    /// Get a single record
    pub fn get_transaction(&self, session: &Session, id: Uuid) -> AppResult<Transaction> {
        session.require(Capability::ViewInventory, "view stock records")?;
        let store = self.store.read()?;
        store.transaction(id).cloned()
    }

    /// List records matching a filter, newest first
    pub fn list_transactions(
        &self,
        session: &Session,
        filter: &TransactionFilter,
    ) -> AppResult<Vec<Transaction>> {
        session.require(Capability::ViewInventory, "view stock records")?;
        let store = self.store.read()?;

        let mut transactions: Vec<Transaction> = store
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(transactions)
    }

    /// Record a stock movement and apply it to the ledger
    pub fn create_transaction(
        &self,
        session: &Session,
        input: CreateTransactionInput,
    ) -> AppResult<Transaction> {
        match input {
            CreateTransactionInput::Purchase(purchase) => self.create_purchase(session, purchase),
            CreateTransactionInput::StockOut(stock_out) => {
                self.create_stock_out(session, stock_out)
            }
        }
    }

    fn create_purchase(&self, session: &Session, input: PurchaseInput) -> AppResult<Transaction> {
        session.require(Capability::CreateStockIn, "record purchases")?;
        input.validate()?;
        validate_quantity(input.quantity).map_err(|m| field_error("quantity", m))?;
        if let Some(unit_cost) = input.unit_cost {
            validate_price(unit_cost).map_err(|m| field_error("unit_cost", m))?;
        }

        let mut store = self.store.write()?;
        let item = store.item(input.item_id)?.clone();
        let supplier = store.supplier(input.supplier_id)?.clone();

        let unit_cost = input.unit_cost.unwrap_or(item.base_price);
        let pricing = TransactionPricing::purchase(input.quantity, unit_cost)
            .ok_or_else(|| out_of_range("quantity"))?;
        InventoryService::ensure_adjustable(&store, item.id, input.quantity)?;

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            transaction_type: TransactionType::Purchase,
            item_id: item.id,
            item_name: item.name.clone(),
            quantity: input.quantity,
            pricing,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            supplier_id: Some(supplier.id),
            supplier_name: Some(supplier.name),
            surgery_id: None,
            procedure: None,
            doctor_id: None,
            doctor_name: None,
            patient_name: None,
            notes: input.notes,
            created_by: session.user_id,
            created_at: now,
            updated_at: now,
            is_locked: true,
        };

        Self::commit(&mut store, transaction, now)
    }

    fn create_stock_out(&self, session: &Session, input: StockOutInput) -> AppResult<Transaction> {
        if input.transaction_type == TransactionType::Purchase {
            return Err(AppError::validation(
                "transaction_type",
                "Purchases are recorded as stock-in",
                "يتم تسجيل المشتريات كإدخال للمخزون",
            ));
        }
        session.require(Capability::CreateStockOut, "record stock-out")?;
        input.validate()?;

        let mut store = self.store.write()?;

        let doctor = match (input.transaction_type, input.doctor_id) {
            (_, Some(doctor_id)) => Some(store.doctor(doctor_id)?.clone()),
            (TransactionType::Surgery, None) => {
                return Err(AppError::validation(
                    "doctor_id",
                    "A surgery must name the operating doctor",
                    "يجب تحديد الطبيب للعملية الجراحية",
                ))
            }
            _ => None,
        };

        let line = self.check_stock_out_line(
            &store,
            input.transaction_type,
            input.item_id,
            input.quantity,
            input.selling_price,
        )?;
        InventoryService::ensure_adjustable(&store, line.item.id, -line.quantity)?;

        let now = Utc::now();
        let surgery_id = (input.transaction_type == TransactionType::Surgery).then(Uuid::new_v4);
        let transaction = Transaction {
            id: Uuid::new_v4(),
            transaction_type: input.transaction_type,
            item_id: line.item.id,
            item_name: line.item.name.clone(),
            quantity: line.quantity,
            pricing: line.pricing,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            supplier_id: None,
            supplier_name: None,
            surgery_id,
            procedure: input.procedure,
            doctor_id: doctor.as_ref().map(|d| d.id),
            doctor_name: doctor.map(|d| d.name),
            patient_name: input.patient_name,
            notes: input.notes,
            created_by: session.user_id,
            created_at: now,
            updated_at: now,
            is_locked: true,
        };

        Self::commit(&mut store, transaction, now)
    }

    /// Record a surgery consuming several items.
    ///
    /// Every line is checked before any is applied, so a rejected line leaves
    /// both the ledger and the record list untouched.
    pub fn record_surgery(
        &self,
        session: &Session,
        input: RecordSurgeryInput,
    ) -> AppResult<Vec<Transaction>> {
        session.require(Capability::CreateStockOut, "record surgeries")?;
        input.validate()?;

        let mut store = self.store.write()?;
        let doctor = store.doctor(input.doctor_id)?.clone();

        let lines = input
            .items
            .iter()
            .map(|line| {
                self.check_stock_out_line(
                    &store,
                    TransactionType::Surgery,
                    line.item_id,
                    line.quantity,
                    line.selling_price,
                )
            })
            .collect::<AppResult<Vec<_>>>()?;

        let mut deltas: HashMap<Uuid, i32> = HashMap::new();
        for line in &lines {
            let delta = deltas.entry(line.item.id).or_insert(0);
            *delta = delta
                .checked_sub(line.quantity)
                .ok_or_else(|| out_of_range("quantity"))?;
        }
        for (item_id, delta) in &deltas {
            InventoryService::ensure_adjustable(&store, *item_id, *delta)?;
        }

        let now = Utc::now();
        let surgery_id = Uuid::new_v4();
        let date = input.date.unwrap_or_else(|| now.date_naive());

        let mut recorded = Vec::with_capacity(lines.len());
        for line in lines {
            let transaction = Transaction {
                id: Uuid::new_v4(),
                transaction_type: TransactionType::Surgery,
                item_id: line.item.id,
                item_name: line.item.name.clone(),
                quantity: line.quantity,
                pricing: line.pricing,
                date,
                supplier_id: None,
                supplier_name: None,
                surgery_id: Some(surgery_id),
                procedure: input.procedure.clone(),
                doctor_id: Some(doctor.id),
                doctor_name: Some(doctor.name.clone()),
                patient_name: Some(input.patient_name.clone()),
                notes: input.notes.clone(),
                created_by: session.user_id,
                created_at: now,
                updated_at: now,
                is_locked: true,
            };
            recorded.push(Self::commit(&mut store, transaction, now)?);
        }

        tracing::info!(
            surgery_id = %surgery_id,
            doctor_id = %doctor.id,
            lines = recorded.len(),
            "Surgery recorded"
        );
        Ok(recorded)
    }

    /// Edit a record.
    ///
    /// Totals are recomputed, but a changed quantity is not carried over to
    /// the ledger.
    pub fn update_transaction(
        &self,
        session: &Session,
        id: Uuid,
        input: UpdateTransactionInput,
    ) -> AppResult<Transaction> {
        input.validate()?;

        let mut store = self.store.write()?;
        let existing = store.transaction(id)?.clone();

        if existing.is_locked {
            session.require(Capability::EditAfterSubmit, "edit a submitted record")?;
        }

        let quantity = input.quantity.unwrap_or(existing.quantity);
        validate_quantity(quantity).map_err(|m| field_error("quantity", m))?;

        let pricing = match &existing.pricing {
            TransactionPricing::Purchase { unit_cost, .. } => {
                if input.selling_price.is_some() {
                    return Err(AppError::validation(
                        "selling_price",
                        "Purchases have no selling price",
                        "لا يوجد سعر بيع للمشتريات",
                    ));
                }
                let repriced = match input.unit_cost {
                    Some(cost) if cost != *unit_cost => {
                        validate_price(cost).map_err(|m| field_error("unit_cost", m))?;
                        TransactionPricing::purchase(quantity, cost)
                    }
                    _ => existing.pricing.with_quantity(quantity),
                };
                repriced.ok_or_else(|| out_of_range("quantity"))?
            }
            TransactionPricing::StockOut {
                base_price,
                selling_price,
                ..
            } => {
                if input.unit_cost.is_some() {
                    return Err(AppError::validation(
                        "unit_cost",
                        "Only purchases have a unit cost",
                        "تكلفة الوحدة للمشتريات فقط",
                    ));
                }
                let selling_price = input.selling_price.unwrap_or(*selling_price);
                validate_price(selling_price).map_err(|m| field_error("selling_price", m))?;
                if self.margin_check_applies(existing.transaction_type) {
                    ensure_margin(*base_price, selling_price)?;
                }
                TransactionPricing::stock_out(quantity, *base_price, selling_price)
                    .ok_or_else(|| out_of_range("quantity"))?
            }
        };

        if quantity != existing.quantity {
            tracing::warn!(
                transaction_id = %id,
                item_id = %existing.item_id,
                from = existing.quantity,
                to = quantity,
                "Record quantity changed; ledger quantity left as recorded at creation"
            );
        }

        let transaction = store.transaction_mut(id)?;
        transaction.quantity = quantity;
        transaction.pricing = pricing;
        if let Some(date) = input.date {
            transaction.date = date;
        }
        if input.patient_name.is_some() {
            transaction.patient_name = input.patient_name;
        }
        if input.notes.is_some() {
            transaction.notes = input.notes;
        }
        transaction.updated_at = Utc::now();

        tracing::info!(transaction_id = %id, "Stock record updated");
        Ok(transaction.clone())
    }

    /// Remove a record. The ledger keeps the quantity change it applied.
    pub fn delete_transaction(&self, session: &Session, id: Uuid) -> AppResult<()> {
        session.require(Capability::DeleteRecords, "delete stock records")?;

        let mut store = self.store.write()?;
        let index = store
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;
        let removed = store.transactions.remove(index);

        tracing::info!(
            transaction_id = %id,
            item_id = %removed.item_id,
            "Stock record deleted; ledger quantity not reversed"
        );
        Ok(())
    }

    fn check_stock_out_line(
        &self,
        store: &Store,
        transaction_type: TransactionType,
        item_id: Uuid,
        quantity: i32,
        selling_price: Option<Decimal>,
    ) -> AppResult<PendingStockOut> {
        validate_quantity(quantity).map_err(|m| field_error("quantity", m))?;
        let item = store.item(item_id)?.clone();

        let selling_price = selling_price.unwrap_or(item.selling_price);
        validate_price(selling_price).map_err(|m| field_error("selling_price", m))?;
        if self.margin_check_applies(transaction_type) {
            ensure_margin(item.base_price, selling_price)?;
        }

        let pricing = TransactionPricing::stock_out(quantity, item.base_price, selling_price)
            .ok_or_else(|| out_of_range("quantity"))?;

        Ok(PendingStockOut {
            item,
            quantity,
            pricing,
        })
    }

    /// Apply the ledger adjustment and store the record
    fn commit(
        store: &mut Store,
        transaction: Transaction,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let delta = transaction
            .transaction_type
            .direction()
            .signed(transaction.quantity);
        InventoryService::adjust_quantity(store, transaction.item_id, delta, now)?;
        store.transactions.push(transaction.clone());

        tracing::info!(
            transaction_id = %transaction.id,
            transaction_type = transaction.transaction_type.as_str(),
            item_id = %transaction.item_id,
            quantity = transaction.quantity,
            "Stock record created"
        );
        Ok(transaction)
    }
}
