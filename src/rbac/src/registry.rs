//! Role registry
//!
//! Holds every loaded role and answers user-level access questions: a user
//! may access a path with a permission if any role the user holds grants
//! it. Role records come from the persistence layer already decoded, or as
//! JSON documents.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::chain::{CallChain, ContextSource};
use crate::config::RbacConfig;
use crate::error::{RbacError, Result};
use crate::record::RoleRecord;
use crate::role::Role;
use crate::types::{RoleId, User};

/// Loaded roles in load order, indexed by identifier
///
/// Cloning is cheap; clones share the same roles.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: Arc<Vec<Arc<Role>>>,
    index: Arc<HashMap<RoleId, usize>>,
}

impl RoleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from stored role records
    ///
    /// # Errors
    ///
    /// Returns an error if two records share an identifier, a record has
    /// a blank identifier, or (with `config.strict`) a rule is malformed.
    pub fn from_records(records: Vec<RoleRecord>, config: &RbacConfig) -> Result<Self> {
        let mut roles = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            if record.id.trim().is_empty() {
                return Err(RbacError::InvalidRole(
                    "Role identifier cannot be empty".to_string(),
                ));
            }
            if index.contains_key(&record.id) {
                return Err(RbacError::DuplicateRole(record.id));
            }

            let role = Role::with_config(record, config)?;
            index.insert(role.id().to_string(), roles.len());
            roles.push(Arc::new(role));
        }

        info!(roles = roles.len(), strict = config.strict, "Role registry loaded");

        Ok(Self {
            roles: Arc::new(roles),
            index: Arc::new(index),
        })
    }

    /// Build a registry from a JSON array of role records
    pub fn from_json(json: &str, config: &RbacConfig) -> Result<Self> {
        let records: Vec<RoleRecord> = serde_json::from_str(json)?;
        Self::from_records(records, config)
    }

    /// Build a registry from a JSON file
    pub fn from_path(path: impl AsRef<Path>, config: &RbacConfig) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading roles");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, config)
    }

    /// Look up a role by identifier
    pub fn get(&self, id: &str) -> Option<&Arc<Role>> {
        self.index.get(id).map(|&i| &self.roles[i])
    }

    /// All roles in load order
    pub fn roles(&self) -> &[Arc<Role>] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Roles held by a user, explicitly or automatically
    ///
    /// `None` is an anonymous caller.
    pub fn roles_for<'a>(&'a self, user: Option<&'a User>) -> impl Iterator<Item = &'a Arc<Role>> + 'a {
        self.roles.iter().filter(move |role| role.has_user(user))
    }

    /// Roles held by the user that grant the permission on the path
    pub fn granting_roles<'a>(
        &'a self,
        user: Option<&'a User>,
        path: &'a str,
        permission: &'a str,
        chain: &'a CallChain,
    ) -> impl Iterator<Item = &'a Arc<Role>> + 'a {
        self.roles_for(user)
            .filter(move |role| role.has_access(path, permission, chain))
    }

    /// Checks whether any role held by the user grants the permission
    pub fn has_access(
        &self,
        user: Option<&User>,
        path: &str,
        permission: &str,
        chain: &CallChain,
    ) -> bool {
        let allowed = self
            .granting_roles(user, path, permission, chain)
            .next()
            .is_some();
        debug!(
            user = user.map(|u| u.id.as_str()).unwrap_or("<anonymous>"),
            path,
            permission,
            allowed,
            "Access check"
        );
        allowed
    }

    /// Checks access using the call chain of a context source
    pub fn has_access_in<C>(
        &self,
        user: Option<&User>,
        path: &str,
        permission: &str,
        context: &C,
    ) -> bool
    where
        C: ContextSource + ?Sized,
    {
        self.has_access(user, path, permission, &context.call_chain())
    }
}
