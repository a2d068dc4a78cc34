//! Inventory ledger: catalog items, stock adjustments and plate cutting

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    calculate_plate_cutting_cost, parse_hole_count, plate_selling_price, plate_variant_sku,
    validate_initial_quantity,
    validate_min_stock, validate_name, validate_plate_length, validate_price,
    validate_sku, Capability, InventoryItem, ItemCategory, Material, PlateCuttingResult,
    StockStatus, VariantKey,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::InventorySettings;
use crate::error::{AppError, AppResult};
use crate::services::{ensure_margin, field_error, out_of_range};
use crate::session::Session;
use crate::store::{SharedStore, Store};

/// Inventory service owning every mutation of catalog items
#[derive(Clone)]
pub struct InventoryService {
    store: SharedStore,
    settings: InventorySettings,
}

/// Input for creating a catalog item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 40))]
    pub sku: String,
    pub category: ItemCategory,
    pub material: Option<Material>,
    pub diameter: Option<String>,
    pub length: Option<String>,
    pub quantity: i32,
    pub min_stock: i32,
    pub base_price: Decimal,
    pub selling_price: Decimal,
}

/// Input for updating a catalog item; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItemInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 40))]
    pub sku: Option<String>,
    pub category: Option<ItemCategory>,
    pub material: Option<Material>,
    pub diameter: Option<String>,
    pub length: Option<String>,
    /// Stock count correction
    pub quantity: Option<i32>,
    pub min_stock: Option<i32>,
    pub base_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

/// Filter for listing inventory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    /// Matches name, SKU, diameter or length
    pub search: Option<String>,
    pub category: Option<ItemCategory>,
    pub material: Option<Material>,
    pub diameter: Option<String>,
    pub stock_status: Option<StockStatus>,
}

impl InventoryFilter {
    fn matches(&self, item: &InventoryItem) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                item.name.to_lowercase().contains(&term)
                    || item.sku.to_lowercase().contains(&term)
                    || item
                        .diameter
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
                    || item
                        .length
                        .as_ref()
                        .is_some_and(|l| l.to_lowercase().contains(&term))
            }
        };

        matches_search
            && self.category.map_or(true, |c| item.category == c)
            && self.material.map_or(true, |m| item.material == Some(m))
            && self
                .diameter
                .as_ref()
                .map_or(true, |d| item.diameter.as_ref() == Some(d))
            && self.stock_status.map_or(true, |s| item.stock_status() == s)
    }
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(store: SharedStore, settings: InventorySettings) -> Self {
        Self { store, settings }
    }

    /// Get a single item
    pub fn get_item(&self, session: &Session, item_id: Uuid) -> AppResult<InventoryItem> {
        session.require(Capability::ViewInventory, "view inventory")?;
        let store = self.store.read()?;
        store.item(item_id).cloned()
    }

    /// List items matching a filter, in catalog order
    pub fn list_items(
        &self,
        session: &Session,
        filter: &InventoryFilter,
    ) -> AppResult<Vec<InventoryItem>> {
        session.require(Capability::ViewInventory, "view inventory")?;
        let store = self.store.read()?;
        Ok(store
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    /// Find the item for a variant key, if one exists
    pub fn find_variant(
        &self,
        session: &Session,
        key: &VariantKey,
    ) -> AppResult<Option<InventoryItem>> {
        session.require(Capability::ViewInventory, "view inventory")?;
        let store = self.store.read()?;
        Ok(store.item_by_variant(key).cloned())
    }

    /// Create a catalog item
    pub fn create_item(
        &self,
        session: &Session,
        input: CreateItemInput,
    ) -> AppResult<InventoryItem> {
        session.require(Capability::CreateInventory, "create inventory items")?;
        input.validate()?;

        validate_name(&input.name).map_err(|m| field_error("name", m))?;
        validate_sku(&input.sku).map_err(|m| field_error("sku", m))?;
        validate_initial_quantity(input.quantity).map_err(|m| field_error("quantity", m))?;
        validate_min_stock(input.min_stock).map_err(|m| field_error("min_stock", m))?;
        validate_price(input.base_price).map_err(|m| field_error("base_price", m))?;
        validate_price(input.selling_price).map_err(|m| field_error("selling_price", m))?;
        ensure_margin(input.base_price, input.selling_price)?;

        let mut store = self.store.write()?;
        if store.sku_taken(&input.sku, None) {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }
        let key = VariantKey {
            category: input.category,
            material: input.material,
            diameter: input.diameter.clone(),
            length: input.length.clone(),
        };
        if store.variant_taken(&key, None) {
            return Err(AppError::DuplicateEntry("variant".to_string()));
        }

        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            sku: input.sku,
            category: input.category,
            material: input.material,
            diameter: input.diameter,
            length: input.length,
            quantity: input.quantity,
            min_stock: input.min_stock,
            base_price: input.base_price,
            selling_price: input.selling_price,
            last_movement_date: now,
            created_at: now,
            updated_at: now,
            created_by: session.user_id,
        };
        store.items.push(item.clone());

        tracing::info!(item_id = %item.id, sku = %item.sku, "Inventory item created");
        Ok(item)
    }

    /// Update a catalog item.
    ///
    /// Changing the base price needs `edit_base_price` and changing the
    /// selling price needs `edit_selling_price`, on top of `edit_inventory`.
    pub fn update_item(
        &self,
        session: &Session,
        item_id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<InventoryItem> {
        session.require(Capability::EditInventory, "edit inventory items")?;
        input.validate()?;

        let mut store = self.store.write()?;
        let existing = store.item(item_id)?.clone();

        if let Some(base_price) = input.base_price {
            if base_price != existing.base_price {
                session.require(Capability::EditBasePrice, "change the base price")?;
            }
        }
        if let Some(selling_price) = input.selling_price {
            if selling_price != existing.selling_price {
                session.require(Capability::EditSellingPrice, "change the selling price")?;
            }
        }

        let name = input.name.unwrap_or(existing.name);
        let sku = input.sku.unwrap_or(existing.sku);
        let min_stock = input.min_stock.unwrap_or(existing.min_stock);
        let base_price = input.base_price.unwrap_or(existing.base_price);
        let selling_price = input.selling_price.unwrap_or(existing.selling_price);

        validate_name(&name).map_err(|m| field_error("name", m))?;
        validate_sku(&sku).map_err(|m| field_error("sku", m))?;
        validate_min_stock(min_stock).map_err(|m| field_error("min_stock", m))?;
        validate_price(base_price).map_err(|m| field_error("base_price", m))?;
        validate_price(selling_price).map_err(|m| field_error("selling_price", m))?;
        ensure_margin(base_price, selling_price)?;
        if let Some(quantity) = input.quantity {
            validate_initial_quantity(quantity).map_err(|m| field_error("quantity", m))?;
        }

        if store.sku_taken(&sku, Some(item_id)) {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }
        let key = VariantKey {
            category: input.category.unwrap_or(existing.category),
            material: input.material.or(existing.material),
            diameter: input.diameter.clone().or(existing.diameter),
            length: input.length.clone().or(existing.length),
        };
        if store.variant_taken(&key, Some(item_id)) {
            return Err(AppError::DuplicateEntry("variant".to_string()));
        }

        let now = Utc::now();
        let item = store.item_mut(item_id)?;
        item.name = name;
        item.sku = sku;
        item.min_stock = min_stock;
        item.base_price = base_price;
        item.selling_price = selling_price;
        if let Some(category) = input.category {
            item.category = category;
        }
        if input.material.is_some() {
            item.material = input.material;
        }
        if input.diameter.is_some() {
            item.diameter = input.diameter;
        }
        if input.length.is_some() {
            item.length = input.length;
        }
        if let Some(quantity) = input.quantity {
            if quantity != item.quantity {
                item.quantity = quantity;
                item.last_movement_date = now;
            }
        }
        item.updated_at = now;

        tracing::info!(item_id = %item.id, "Inventory item updated");
        Ok(item.clone())
    }

    /// Delete a catalog item; its transactions keep their name snapshots
    pub fn delete_item(&self, session: &Session, item_id: Uuid) -> AppResult<()> {
        session.require(Capability::DeleteInventory, "delete inventory items")?;

        let mut store = self.store.write()?;
        let before = store.items.len();
        store.items.retain(|i| i.id != item_id);
        if store.items.len() == before {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }

        tracing::info!(item_id = %item_id, "Inventory item deleted");
        Ok(())
    }

    /// Cut one plate down to a shorter length.
    ///
    /// The source loses one unit. The cut piece merges into the existing
    /// variant with the new length, or becomes a new catalog entry priced in
    /// proportion to its hole count.
    pub fn cut_plate(
        &self,
        session: &Session,
        source_id: Uuid,
        new_length: &str,
    ) -> AppResult<PlateCuttingResult> {
        session.require(Capability::PerformPlateCutting, "cut plates")?;
        validate_plate_length(new_length).map_err(|m| field_error("new_length", m))?;

        let mut store = self.store.write()?;
        let source = store.item(source_id)?.clone();

        if source.category != ItemCategory::Plates {
            return Err(AppError::validation(
                "category",
                "Only plates can be cut",
                "يمكن قطع الشرائح فقط",
            ));
        }
        let Some(source_holes) = source.length.as_deref().and_then(parse_hole_count) else {
            return Err(AppError::validation(
                "length",
                "Plate has no hole count to cut from",
                "لا يوجد عدد ثقوب للشريحة",
            ));
        };
        if parse_hole_count(new_length).map_or(true, |holes| holes >= source_holes) {
            return Err(AppError::validation(
                "new_length",
                "New length must be shorter than the current length",
                "يجب أن يكون الطول الجديد أقصر من الطول الحالي",
            ));
        }
        if source.quantity < 1 {
            return Err(AppError::InsufficientInventory(format!(
                "No units of {} left to cut",
                source.sku
            )));
        }

        let cost = calculate_plate_cutting_cost(
            source.length.as_deref().unwrap_or_default(),
            new_length,
            source.base_price,
        );
        let target_key = source.variant_key().with_length(new_length);
        let existing_target = store.item_by_variant(&target_key).map(|i| i.id);

        let new_sku = plate_variant_sku(&source.sku, new_length);
        if existing_target.is_none() && store.sku_taken(&new_sku, None) {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }
        if let Some(target_id) = existing_target {
            Self::ensure_adjustable(&store, target_id, 1)?;
        }

        let now = Utc::now();
        let source_item = Self::adjust_quantity(&mut store, source_id, -1, now)?;

        let (new_item, merged) = match existing_target {
            Some(target_id) => (Self::adjust_quantity(&mut store, target_id, 1, now)?, true),
            None => {
                let item = InventoryItem {
                    id: Uuid::new_v4(),
                    sku: new_sku,
                    length: Some(new_length.to_string()),
                    quantity: 1,
                    base_price: cost,
                    selling_price: plate_selling_price(cost, self.settings.plate_markup),
                    last_movement_date: now,
                    created_at: now,
                    updated_at: now,
                    created_by: session.user_id,
                    ..source.clone()
                };
                store.items.push(item.clone());
                (item, false)
            }
        };

        tracing::info!(
            source_id = %source_id,
            target_id = %new_item.id,
            merged,
            "Plate cut from {} to {}",
            source.length.as_deref().unwrap_or("-"),
            new_length
        );

        Ok(PlateCuttingResult {
            source_item,
            new_item,
            merged,
            cost_adjustment: source.base_price - cost,
        })
    }

    /// Check that a signed quantity change stays in range without applying it.
    ///
    /// Commands call this while validating so a rejected change never leaves a
    /// half-applied batch behind.
    pub(crate) fn ensure_adjustable(store: &Store, item_id: Uuid, delta: i32) -> AppResult<()> {
        let item = store.item(item_id)?;
        match item.quantity.checked_add(delta) {
            Some(_) => Ok(()),
            None => Err(out_of_range("quantity")),
        }
    }

    /// Apply a signed quantity change and stamp the movement date.
    ///
    /// Takes the caller's write guard so the adjustment lands together with
    /// the record that caused it. Stock-out may drive the quantity negative;
    /// no floor is enforced.
    pub(crate) fn adjust_quantity(
        store: &mut Store,
        item_id: Uuid,
        delta: i32,
        now: DateTime<Utc>,
    ) -> AppResult<InventoryItem> {
        let item = store.item_mut(item_id)?;
        item.quantity = item
            .quantity
            .checked_add(delta)
            .ok_or_else(|| out_of_range("quantity"))?;
        item.last_movement_date = now;
        item.updated_at = now;

        tracing::debug!(item_id = %item_id, delta, quantity = item.quantity, "Stock adjusted");
        Ok(item.clone())
    }
}
