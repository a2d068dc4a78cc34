//! Error handling for the surgical inventory engine
//!
//! Every rejected command carries an English and an Arabic message so the
//! presentation layer can show either without re-deriving the reason.

use serde::Serialize;
use shared::Capability;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    // Authorization errors
    #[error("Permission denied: {message}")]
    PermissionDenied {
        capability: Capability,
        message: String,
        message_ar: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ar: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient inventory: {0}")]
    InsufficientInventory(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a permission error for a missing capability
    pub fn permission_denied(capability: Capability, action: &str) -> Self {
        AppError::PermissionDenied {
            capability,
            message: format!("Missing permission '{}' to {}", capability, action),
            message_ar: "ليس لديك صلاحية لتنفيذ هذا الإجراء".to_string(),
        }
    }

    /// Build a validation error from a field and its English/Arabic messages
    pub fn validation(field: &str, message: impl Into<String>, message_ar: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
            message_ar: message_ar.into(),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AppError::PermissionDenied { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Render the error for the presentation layer
    pub fn detail(&self) -> ErrorDetail {
        match self {
            AppError::PermissionDenied {
                capability,
                message,
                message_ar,
            } => ErrorDetail {
                code: "PERMISSION_DENIED".to_string(),
                message_en: message.clone(),
                message_ar: message_ar.clone(),
                field: Some(capability.to_string()),
            },
            AppError::Validation {
                field,
                message,
                message_ar,
            } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_ar: message_ar.clone(),
                field: Some(field.clone()),
            },
            AppError::DuplicateEntry(field) => ErrorDetail {
                code: "DUPLICATE_ENTRY".to_string(),
                message_en: format!("A record with this {} already exists", field),
                message_ar: format!("يوجد سجل بنفس {} بالفعل", field),
                field: Some(field.clone()),
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: format!("{} not found", resource),
                message_ar: format!("لم يتم العثور على {}", resource),
                field: None,
            },
            AppError::InsufficientInventory(msg) => ErrorDetail {
                code: "INSUFFICIENT_INVENTORY".to_string(),
                message_en: msg.clone(),
                message_ar: format!("المخزون غير كافٍ: {}", msg),
                field: None,
            },
            AppError::Configuration(msg) => ErrorDetail {
                code: "CONFIGURATION_ERROR".to_string(),
                message_en: format!("Configuration error: {}", msg),
                message_ar: format!("خطأ في الإعدادات: {}", msg),
                field: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: msg.clone(),
                message_ar: "حدث خطأ داخلي".to_string(),
                field: None,
            },
        }
    }
}

/// Error payload handed to the presentation layer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "input".to_string());

        AppError::Validation {
            message: errors.to_string(),
            message_ar: format!("بيانات غير صالحة: {}", field),
            field,
        }
    }
}

/// Result type alias for engine commands and queries
pub type AppResult<T> = Result<T, AppError>;
