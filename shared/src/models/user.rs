//! User, role, and permission models
//!
//! The permission matrix is fixed: every role resolves to one
//! [`RolePermissions`] record and nothing mutates it at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RuleError;

/// A signed-in staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Staff roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates records only; cannot edit or delete after saving
    DataEntry,
    /// Edits records and selling prices; cannot touch base prices
    Supervisor,
    /// Read-mostly access to analytics and financial reports
    Stakeholder,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::DataEntry, Role::Supervisor, Role::Stakeholder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DataEntry => "data_entry",
            Role::Supervisor => "supervisor",
            Role::Stakeholder => "stakeholder",
        }
    }

    /// Arabic display label
    pub fn label_ar(&self) -> &'static str {
        match self {
            Role::DataEntry => "إدخال بيانات",
            Role::Supervisor => "مشرف",
            Role::Stakeholder => "شريك",
        }
    }

    pub fn permissions(&self) -> RolePermissions {
        permissions_for(*self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::DataEntry => write!(f, "Data Entry"),
            Role::Supervisor => write!(f, "Supervisor"),
            Role::Stakeholder => write!(f, "Stakeholder"),
        }
    }
}

impl FromStr for Role {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "data_entry" => Ok(Role::DataEntry),
            "supervisor" => Ok(Role::Supervisor),
            "stakeholder" => Ok(Role::Stakeholder),
            other => Err(RuleError::UnknownRole(other.to_string())),
        }
    }
}

/// Capability flags resolved for a role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolePermissions {
    // Inventory
    pub can_view_inventory: bool,
    pub can_create_inventory: bool,
    pub can_edit_inventory: bool,
    pub can_delete_inventory: bool,
    pub can_edit_base_price: bool,
    pub can_edit_selling_price: bool,
    pub can_view_prices: bool,

    // Stock operations
    pub can_create_stock_in: bool,
    pub can_create_stock_out: bool,
    pub can_edit_after_submit: bool,
    pub can_delete_records: bool,
    pub can_perform_plate_cutting: bool,

    // Financial
    pub can_view_financials: bool,
    pub can_view_profit: bool,
    pub can_view_analytics: bool,

    // Admin
    pub can_manage_users: bool,
    pub can_manage_settings: bool,
}

/// A single capability, used to name the flag a check is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewInventory,
    CreateInventory,
    EditInventory,
    DeleteInventory,
    EditBasePrice,
    EditSellingPrice,
    ViewPrices,
    CreateStockIn,
    CreateStockOut,
    EditAfterSubmit,
    DeleteRecords,
    PerformPlateCutting,
    ViewFinancials,
    ViewProfit,
    ViewAnalytics,
    ManageUsers,
    ManageSettings,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewInventory => "view_inventory",
            Capability::CreateInventory => "create_inventory",
            Capability::EditInventory => "edit_inventory",
            Capability::DeleteInventory => "delete_inventory",
            Capability::EditBasePrice => "edit_base_price",
            Capability::EditSellingPrice => "edit_selling_price",
            Capability::ViewPrices => "view_prices",
            Capability::CreateStockIn => "create_stock_in",
            Capability::CreateStockOut => "create_stock_out",
            Capability::EditAfterSubmit => "edit_after_submit",
            Capability::DeleteRecords => "delete_records",
            Capability::PerformPlateCutting => "perform_plate_cutting",
            Capability::ViewFinancials => "view_financials",
            Capability::ViewProfit => "view_profit",
            Capability::ViewAnalytics => "view_analytics",
            Capability::ManageUsers => "manage_users",
            Capability::ManageSettings => "manage_settings",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RolePermissions {
    /// Look up the flag backing a capability
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewInventory => self.can_view_inventory,
            Capability::CreateInventory => self.can_create_inventory,
            Capability::EditInventory => self.can_edit_inventory,
            Capability::DeleteInventory => self.can_delete_inventory,
            Capability::EditBasePrice => self.can_edit_base_price,
            Capability::EditSellingPrice => self.can_edit_selling_price,
            Capability::ViewPrices => self.can_view_prices,
            Capability::CreateStockIn => self.can_create_stock_in,
            Capability::CreateStockOut => self.can_create_stock_out,
            Capability::EditAfterSubmit => self.can_edit_after_submit,
            Capability::DeleteRecords => self.can_delete_records,
            Capability::PerformPlateCutting => self.can_perform_plate_cutting,
            Capability::ViewFinancials => self.can_view_financials,
            Capability::ViewProfit => self.can_view_profit,
            Capability::ViewAnalytics => self.can_view_analytics,
            Capability::ManageUsers => self.can_manage_users,
            Capability::ManageSettings => self.can_manage_settings,
        }
    }
}

const DATA_ENTRY: RolePermissions = RolePermissions {
    can_view_inventory: true,
    can_create_inventory: true,
    can_edit_inventory: false,
    can_delete_inventory: false,
    can_edit_base_price: false,
    can_edit_selling_price: false,
    can_view_prices: false,

    can_create_stock_in: true,
    can_create_stock_out: true,
    can_edit_after_submit: false,
    can_delete_records: false,
    can_perform_plate_cutting: false,

    can_view_financials: false,
    can_view_profit: false,
    can_view_analytics: false,

    can_manage_users: false,
    can_manage_settings: false,
};

const SUPERVISOR: RolePermissions = RolePermissions {
    can_view_inventory: true,
    can_create_inventory: true,
    can_edit_inventory: true,
    can_delete_inventory: true,
    // No role may edit base prices.
    can_edit_base_price: false,
    can_edit_selling_price: true,
    can_view_prices: true,

    can_create_stock_in: true,
    can_create_stock_out: true,
    can_edit_after_submit: true,
    can_delete_records: true,
    can_perform_plate_cutting: true,

    can_view_financials: true,
    can_view_profit: true,
    can_view_analytics: true,

    can_manage_users: false,
    can_manage_settings: false,
};

const STAKEHOLDER: RolePermissions = RolePermissions {
    can_view_inventory: true,
    can_create_inventory: false,
    can_edit_inventory: false,
    can_delete_inventory: false,
    can_edit_base_price: false,
    can_edit_selling_price: false,
    can_view_prices: true,

    can_create_stock_in: false,
    can_create_stock_out: false,
    can_edit_after_submit: false,
    can_delete_records: false,
    can_perform_plate_cutting: false,

    can_view_financials: true,
    can_view_profit: true,
    can_view_analytics: true,

    can_manage_users: false,
    can_manage_settings: false,
};

/// Resolve the permission set for a role
pub fn permissions_for(role: Role) -> RolePermissions {
    match role {
        Role::DataEntry => DATA_ENTRY,
        Role::Supervisor => SUPERVISOR,
        Role::Stakeholder => STAKEHOLDER,
    }
}

/// Check a single capability for a role
pub fn has_permission(role: Role, capability: Capability) -> bool {
    permissions_for(role).allows(capability)
}
