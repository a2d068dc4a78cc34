//! Acting-user context passed to every command
//!
//! There is no ambient signed-in user: callers build a [`Session`] after
//! authentication and hand it to each service call.

use serde::{Deserialize, Serialize};
use shared::{permissions_for, Capability, Role, RolePermissions, User};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// The actor behind a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub user_name: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: Uuid, user_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            role,
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.name.clone(), user.role)
    }

    pub fn permissions(&self) -> RolePermissions {
        permissions_for(self.role)
    }

    /// Check if the session has a specific capability
    pub fn can(&self, capability: Capability) -> bool {
        self.permissions().allows(capability)
    }

    /// Fail with `PermissionDenied` unless the session has the capability
    pub fn require(&self, capability: Capability, action: &str) -> AppResult<()> {
        if self.can(capability) {
            return Ok(());
        }

        tracing::warn!(
            user_id = %self.user_id,
            role = self.role.as_str(),
            capability = capability.as_str(),
            "Permission denied: {}",
            action
        );
        Err(AppError::permission_denied(capability, action))
    }
}
