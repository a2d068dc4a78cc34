//! In-memory store shared by the services
//!
//! All state lives for the lifetime of one session. Services hold a clone of
//! [`SharedStore`] and take the lock once per command.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use shared::{Doctor, InventoryItem, Supplier, Transaction, VariantKey};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Everything the engine knows about, in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

/// Store contents
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) items: Vec<InventoryItem>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) doctors: Vec<Doctor>,
    pub(crate) suppliers: Vec<Supplier>,
}

impl Store {
    pub(crate) fn item(&self, id: Uuid) -> AppResult<&InventoryItem> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    pub(crate) fn item_mut(&mut self, id: Uuid) -> AppResult<&mut InventoryItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    pub(crate) fn item_by_variant(&self, key: &VariantKey) -> Option<&InventoryItem> {
        self.items.iter().find(|i| &i.variant_key() == key)
    }

    /// A sized variant already held by an item other than `except`
    pub(crate) fn variant_taken(&self, key: &VariantKey, except: Option<Uuid>) -> bool {
        key.is_sized()
            && self
                .items
                .iter()
                .any(|i| Some(i.id) != except && &i.variant_key() == key)
    }

    pub(crate) fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> bool {
        self.items
            .iter()
            .any(|i| i.sku.eq_ignore_ascii_case(sku) && Some(i.id) != except)
    }

    pub(crate) fn transaction(&self, id: Uuid) -> AppResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))
    }

    pub(crate) fn transaction_mut(&mut self, id: Uuid) -> AppResult<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))
    }

    pub(crate) fn doctor(&self, id: Uuid) -> AppResult<&Doctor> {
        self.doctors
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound("Doctor".to_string()))
    }

    pub(crate) fn supplier(&self, id: Uuid) -> AppResult<&Supplier> {
        self.suppliers
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }
}

impl From<Snapshot> for Store {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            items: snapshot.items,
            transactions: snapshot.transactions,
            doctors: snapshot.doctors,
            suppliers: snapshot.suppliers,
        }
    }
}

impl From<&Store> for Snapshot {
    fn from(store: &Store) -> Self {
        Self {
            items: store.items.clone(),
            transactions: store.transactions.clone(),
            doctors: store.doctors.clone(),
            suppliers: store.suppliers.clone(),
        }
    }
}

/// Handle to the store shared between services
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub(crate) fn read(&self) -> AppResult<RwLockReadGuard<'_, Store>> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("Store lock poisoned".to_string()))
    }

    pub(crate) fn write(&self) -> AppResult<RwLockWriteGuard<'_, Store>> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("Store lock poisoned".to_string()))
    }
}
