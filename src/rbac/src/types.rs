//! Core access-control types

use serde::{Deserialize, Serialize};

/// Unique role identifier
pub type RoleId = String;

/// Permission identifier (`read`, `write`, custom names, ...)
pub type PermissionId = String;

/// Principal as seen by role membership checks
///
/// Only the assigned role identifiers matter here; authentication is
/// expressed by the presence of a `User` at all (`Option<&User>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier (e.g., "alice")
    pub id: String,

    /// Explicitly assigned roles
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

impl User {
    /// Create a new user without roles
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
        }
    }

    /// Assign a role
    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Check if a role is explicitly assigned
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
