//! Role type definitions

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chain::{CallChain, ContextSource};
use crate::config::RbacConfig;
use crate::error::Result;
use crate::legacy::LegacyNormalizer;
use crate::permission::PermissionSet;
use crate::record::RoleRecord;
use crate::rule::AccessRule;
use crate::types::{RoleId, User};

/// Automatic role membership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutoAttach {
    /// Explicit assignment only
    #[default]
    #[serde(rename = "none")]
    None,

    /// Every caller, including anonymous ones
    #[serde(rename = "all", alias = "all-users")]
    AllUsers,

    /// Every authenticated user
    #[serde(rename = "auth", alias = "authenticated")]
    AuthenticatedUsers,
}

/// Named, ordered collection of access rules
///
/// A role is immutable after construction apart from the lazily compiled
/// state inside its rules, and can be shared across threads (`Arc<Role>`).
#[derive(Debug)]
pub struct Role {
    id: RoleId,
    name: String,
    description: String,
    auto: AutoAttach,
    rules: Vec<AccessRule>,
}

impl Role {
    /// Creates a role from a stored record with the default configuration
    ///
    /// Malformed rules are kept but never match.
    pub fn new(record: RoleRecord) -> Self {
        Self::init(record, &LegacyNormalizer::default())
    }

    /// Creates a role from a stored record
    ///
    /// # Errors
    ///
    /// With `config.strict` set, returns the first structural or syntax
    /// error of the normalized record instead of degrading the rule.
    pub fn with_config(record: RoleRecord, config: &RbacConfig) -> Result<Self> {
        let normalizer = LegacyNormalizer::new(config);
        let record = normalizer.normalize_record(record);
        if config.strict {
            record.validate()?;
        }
        Ok(Self::build(record))
    }

    /// Normalizes the record's rules once and builds the role
    ///
    /// Matchers compile lazily on first access check.
    pub fn init(record: RoleRecord, normalizer: &LegacyNormalizer) -> Self {
        Self::build(normalizer.normalize_record(record))
    }

    fn build(record: RoleRecord) -> Self {
        let RoleRecord {
            id,
            name,
            description,
            auto,
            access,
        } = record;

        let rules = access
            .into_iter()
            .enumerate()
            .map(|(index, rule)| AccessRule::new(id.clone(), index, rule))
            .collect::<Vec<_>>();

        debug!(role = %id, rules = rules.len(), auto = ?auto, "Role initialized");

        Self {
            id,
            name,
            description,
            auto,
            rules,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn auto(&self) -> AutoAttach {
        self.auto
    }

    /// Access rules in declaration order
    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Union of the permissions every rule grants for a path
    pub fn permissions(&self, path: &str, chain: &CallChain) -> PermissionSet {
        let mut granted = PermissionSet::default();
        for (index, rule) in self.rules.iter().enumerate() {
            let perms = rule.permissions_granted(path, chain);
            if !perms.is_empty() {
                trace!(role = %self.id, rule = index, path, permissions = %perms, "Rule granted");
                granted.union_with(perms);
            }
        }
        granted
    }

    /// Checks whether the role grants a permission on a path
    ///
    /// Every rule is evaluated and the granted permissions are unioned, so
    /// rule order never changes the outcome. A blank path or permission is
    /// never granted.
    pub fn has_access(&self, path: &str, permission: &str, chain: &CallChain) -> bool {
        if path.trim().is_empty() || permission.trim().is_empty() {
            return false;
        }

        let allowed = self.permissions(path, chain).allows(permission);
        debug!(role = %self.id, path, permission, allowed, "Role access check");
        allowed
    }

    /// Checks access using the call chain of a context source
    pub fn has_access_in<C>(&self, path: &str, permission: &str, context: &C) -> bool
    where
        C: ContextSource + ?Sized,
    {
        self.has_access(path, permission, &context.call_chain())
    }

    /// Checks whether a user holds this role
    ///
    /// `None` is an anonymous caller.
    pub fn has_user(&self, user: Option<&User>) -> bool {
        match (self.auto, user) {
            (AutoAttach::AllUsers, _) => true,
            (AutoAttach::AuthenticatedUsers, Some(_)) => true,
            (_, Some(user)) => user.has_role(&self.id),
            (_, None) => false,
        }
    }

    /// Declarative record of this role, without computed state
    pub fn to_record(&self) -> RoleRecord {
        RoleRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            auto: self.auto,
            access: self.rules.iter().map(|r| r.record().clone()).collect(),
        }
    }
}
