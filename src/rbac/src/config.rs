//! Engine configuration

use crate::chain::NEGATION;
use crate::error::{RbacError, Result};
use crate::pattern::{self, PatternKind};

/// Default glob naming internal/system call frames
pub const DEFAULT_SYSTEM_NAMESPACE: &str = "procedure/system/**";

/// Access-control engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbacConfig {
    /// Reject structurally invalid or unparsable rules when loading
    /// instead of degrading them to "never matches"
    pub strict: bool,

    /// Glob matching the call frames of internal/system procedures
    ///
    /// Legacy `caller` attributes and `internal` permissions are gated on
    /// a call chain containing at least one frame outside this namespace.
    pub system_namespace: String,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            strict: false,
            system_namespace: DEFAULT_SYSTEM_NAMESPACE.to_string(),
        }
    }
}

impl RbacConfig {
    /// Loads configuration from environment variables
    ///
    /// - `RBAC_STRICT` - `true`/`false`/`1`/`0` (default: false)
    /// - `RBAC_SYSTEM_NAMESPACE` - system frame glob (default: `procedure/system/**`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("RBAC_STRICT") {
            config.strict = parse_bool(&value).ok_or_else(|| {
                RbacError::Config(format!("RBAC_STRICT: expected a boolean, got '{}'", value))
            })?;
        }

        if let Some(value) = lookup("RBAC_SYSTEM_NAMESPACE") {
            config.system_namespace = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the system namespace is a usable glob
    pub fn validate(&self) -> Result<()> {
        if self.system_namespace.starts_with(NEGATION) {
            return Err(RbacError::Config(
                "system namespace must not be negated".to_string(),
            ));
        }
        pattern::compile(&self.system_namespace, PatternKind::Path)?;
        Ok(())
    }

    /// Via-gate source admitting any call chain that is not purely
    /// internal/system calls
    pub fn external_caller_via(&self) -> String {
        format!("{}{}", NEGATION, self.system_namespace)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RbacConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RbacConfig::default());
        assert_eq!(config.external_caller_via(), "!procedure/system/**");
    }

    #[test]
    fn test_overrides() {
        let config = RbacConfig::from_lookup(lookup(&[
            ("RBAC_STRICT", "yes"),
            ("RBAC_SYSTEM_NAMESPACE", "rpc/internal/**"),
        ]))
        .unwrap();
        assert!(config.strict);
        assert_eq!(config.external_caller_via(), "!rpc/internal/**");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            RbacConfig::from_lookup(lookup(&[("RBAC_STRICT", "maybe")])),
            Err(RbacError::Config(_))
        ));
        assert!(RbacConfig::from_lookup(lookup(&[("RBAC_SYSTEM_NAMESPACE", "")])).is_err());
        assert!(RbacConfig::from_lookup(lookup(&[("RBAC_SYSTEM_NAMESPACE", "!x/**")])).is_err());
    }
}
