//! Business logic services for the surgical inventory engine

pub mod analytics;
pub mod directory;
pub mod inventory;
pub mod records;

pub use analytics::AnalyticsService;
pub use directory::DirectoryService;
pub use inventory::InventoryService;
pub use records::RecordService;

use rust_decimal::Decimal;
use shared::{validate_margin, MARGIN_WARNING_AR, MARGIN_WARNING_EN};

use crate::error::{AppError, AppResult};

/// Validation error for a field rejected by one of the shared rules
pub(crate) fn field_error(field: &str, message: &'static str) -> AppError {
    AppError::validation(field, message, format!("قيمة غير صالحة: {}", field))
}

/// Validation error for a value whose arithmetic would overflow
pub(crate) fn out_of_range(field: &str) -> AppError {
    AppError::validation(
        field,
        "Value exceeds the supported range",
        format!("القيمة تتجاوز الحد المسموح: {}", field),
    )
}

/// Reject a selling price below the base price
pub(crate) fn ensure_margin(base_price: Decimal, selling_price: Decimal) -> AppResult<()> {
    let margin = validate_margin(base_price, selling_price);
    if margin.is_valid {
        return Ok(());
    }

    tracing::warn!(
        %base_price,
        %selling_price,
        "Rejected selling price below base price"
    );
    Err(AppError::validation(
        "selling_price",
        margin
            .message
            .unwrap_or_else(|| MARGIN_WARNING_EN.to_string()),
        margin
            .message_ar
            .unwrap_or_else(|| MARGIN_WARNING_AR.to_string()),
    ))
}
