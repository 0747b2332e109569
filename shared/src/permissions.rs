//! Per-user permission flags gating external integrations.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::UserStore;
use crate::models::UserRecord;
use crate::{Error, Result};

/// An integration a user has to opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    CalendarRead,
}

impl Permission {
    /// Whether the stored profile grants this permission. Unset counts as no.
    pub fn is_granted(&self, user: &UserRecord) -> bool {
        match self {
            Permission::CalendarRead => user.calendar_read_enabled.unwrap_or(false),
        }
    }

    /// Message telling the user how to get access.
    pub fn remediation(&self) -> &'static str {
        match self {
            Permission::CalendarRead => {
                "Calendar access is not enabled. Turn on calendar integration in your settings to see your events."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CalendarRead => "calendar_read",
        }
    }
}

/// Read-only permission check against the user store.
#[derive(Clone)]
pub struct PermissionGate {
    users: Arc<dyn UserStore>,
}

impl PermissionGate {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Return the user's record if `permission` is granted, `Forbidden` otherwise.
    pub async fn require(&self, user_id: Uuid, permission: Permission) -> Result<UserRecord> {
        match self.users.find_user(user_id).await? {
            Some(user) if permission.is_granted(&user) => Ok(user),
            _ => {
                info!(
                    "User {} lacks permission {}",
                    user_id,
                    permission.as_str()
                );
                Err(Error::Forbidden(permission.remediation().to_string()))
            }
        }
    }
}
