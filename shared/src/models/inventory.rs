//! Inventory catalog models

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Implant and instrument categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Screws,
    Plates,
    Rods,
    Wires,
    /// Intramedullary nails
    Nails,
    Instruments,
    Consumables,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Screws => "screws",
            ItemCategory::Plates => "plates",
            ItemCategory::Rods => "rods",
            ItemCategory::Wires => "wires",
            ItemCategory::Nails => "nails",
            ItemCategory::Instruments => "instruments",
            ItemCategory::Consumables => "consumables",
        }
    }

    pub fn label_ar(&self) -> &'static str {
        match self {
            ItemCategory::Screws => "براغي",
            ItemCategory::Plates => "شرائح",
            ItemCategory::Rods => "قضبان",
            ItemCategory::Wires => "أسلاك",
            ItemCategory::Nails => "مسامير نخاعية",
            ItemCategory::Instruments => "أدوات جراحية",
            ItemCategory::Consumables => "مستهلكات",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implant material
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Titanium,
    Stainless,
}

impl Material {
    pub fn label_ar(&self) -> &'static str {
        match self {
            Material::Titanium => "تيتانيوم",
            Material::Stainless => "ستانلس ستيل",
        }
    }
}

/// Screw and rod diameters offered in the catalog
pub const DIAMETER_OPTIONS: &[&str] = &[
    "2.0mm", "2.4mm", "2.7mm", "3.5mm", "4.0mm", "4.5mm", "5.0mm", "6.5mm",
];

/// Screw lengths offered in the catalog
pub const LENGTH_OPTIONS: &[&str] = &[
    "12mm", "14mm", "16mm", "18mm", "20mm", "22mm", "24mm", "26mm", "28mm", "30mm", "32mm",
    "34mm", "36mm", "38mm", "40mm", "45mm", "50mm", "55mm", "60mm",
];

/// Plate lengths, expressed as hole counts
pub const PLATE_LENGTH_OPTIONS: &[&str] = &[
    "4-hole", "6-hole", "8-hole", "10-hole", "12-hole", "14-hole", "16-hole",
];

/// A catalog entry with its stock level and dual pricing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: ItemCategory,

    // Variant attributes
    pub material: Option<Material>,
    pub diameter: Option<String>,
    pub length: Option<String>,

    // Stock
    pub quantity: i32,
    pub min_stock: i32,

    /// Floor cost; only the most trusted role may change it
    pub base_price: Decimal,
    /// Negotiated price charged to surgeons and customers
    pub selling_price: Decimal,

    pub last_movement_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl InventoryItem {
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            category: self.category,
            material: self.material,
            diameter: self.diameter.clone(),
            length: self.length.clone(),
        }
    }

    pub fn stock_status(&self) -> StockStatus {
        crate::pricing::stock_status(self.quantity, self.min_stock)
    }

    /// Stock value at base price
    pub fn value_at_base(&self) -> Decimal {
        Decimal::from(self.quantity) * self.base_price
    }
}

/// Identity of a catalog variant.
///
/// Two items with the same key are the same physical product; plate cutting
/// merges into an existing key before creating a new entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub category: ItemCategory,
    pub material: Option<Material>,
    pub diameter: Option<String>,
    pub length: Option<String>,
}

impl VariantKey {
    /// Whether the key carries a size; unsized items are told apart by SKU only
    pub fn is_sized(&self) -> bool {
        self.diameter.is_some() || self.length.is_some()
    }

    /// Same variant with a different length
    pub fn with_length(&self, length: impl Into<String>) -> Self {
        Self {
            length: Some(length.into()),
            ..self.clone()
        }
    }
}

/// Stock level relative to the item's minimum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Medium,
    Good,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Low => write!(f, "low"),
            StockStatus::Medium => write!(f, "medium"),
            StockStatus::Good => write!(f, "good"),
        }
    }
}

/// Outcome of cutting one plate into a shorter variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateCuttingResult {
    pub source_item: InventoryItem,
    pub new_item: InventoryItem,
    /// True when the cut landed on an existing variant
    pub merged: bool,
    /// Base price of the source minus the cut piece's cost
    pub cost_adjustment: Decimal,
}
