//! Legacy rule normalization
//!
//! Role records are long-lived, and older releases stored access rules in
//! shapes that the engine no longer evaluates. Each historical shape is a
//! [`LegacyShape`] variant; the normalizer rewrites every one of them into
//! the canonical `path`/`regex` + `permission` + `via` form before any rule
//! is compiled. Nothing downstream ever looks at legacy attributes.
//!
//! | Historical shape             | Canonical form                                   |
//! |------------------------------|--------------------------------------------------|
//! | `type` + `name`              | `path = type/name`, default `read`               |
//! | `type` + `regexp`            | `regex = type/regexp`, default `read`            |
//! | `regexp` (misspelled)        | `regex`                                          |
//! | `regexp` beside a pattern    | dropped, the existing pattern wins               |
//! | `caller`                     | external-caller via-gate, default `read`         |
//! | `internal` permission token  | `read` + external-caller via-gate (unless set)   |
//!
//! The external-caller via-gate admits any call chain holding at least one
//! frame outside the system namespace (see [`RbacConfig`]).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RbacConfig;
use crate::permission::{self, INTERNAL, READ};
use crate::record::{RoleRecord, RuleRecord};

/// Attributes only found in historical rule records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFields {
    /// Object category, e.g. `procedure`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Bare object name within the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Misspelled regex attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,

    /// Procedure name allowed to call through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
}

impl LegacyFields {
    /// Returns `true` if no legacy attribute is present
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.name.is_none() && self.regexp.is_none() && self.caller.is_none()
    }
}

/// Historical rule shape detected on a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyShape {
    /// Category plus bare object name
    TypeName { kind: String, name: String },
    /// Category plus misspelled regex attribute
    TypeRegex { kind: String, regex: String },
    /// Misspelled regex attribute
    MisspelledRegex(String),
    /// Single calling procedure
    Caller(String),
    /// Category or name without its counterpart
    Incomplete { kind: Option<String>, name: Option<String> },
    /// `internal` token in the permission text
    InternalPermission,
}

impl LegacyShape {
    /// Takes the legacy attributes off a record and classifies them, in
    /// the order they must be applied
    pub fn extract(rule: &mut RuleRecord) -> Vec<LegacyShape> {
        let LegacyFields {
            kind,
            name,
            regexp,
            caller,
        } = std::mem::take(&mut rule.legacy);
        let mut shapes = Vec::new();

        match (kind, name, regexp) {
            (Some(kind), Some(name), regexp) => {
                shapes.push(LegacyShape::TypeName { kind, name });
                if let Some(regex) = regexp {
                    shapes.push(LegacyShape::MisspelledRegex(regex));
                }
            }
            (Some(kind), None, Some(regex)) => shapes.push(LegacyShape::TypeRegex { kind, regex }),
            (None, name, Some(regex)) => {
                shapes.push(LegacyShape::MisspelledRegex(regex));
                if name.is_some() {
                    shapes.push(LegacyShape::Incomplete { kind: None, name });
                }
            }
            (kind @ Some(_), None, None) => shapes.push(LegacyShape::Incomplete { kind, name: None }),
            (None, name @ Some(_), None) => shapes.push(LegacyShape::Incomplete { kind: None, name }),
            (None, None, None) => {}
        }

        if let Some(caller) = caller {
            shapes.push(LegacyShape::Caller(caller));
        }

        let has_internal = rule
            .permission
            .as_deref()
            .map(|text| permission::tokens(text).any(|t| t == INTERNAL))
            .unwrap_or(false);
        if has_internal {
            shapes.push(LegacyShape::InternalPermission);
        }

        shapes
    }
}

/// Rewrites historical rule shapes into the canonical shape
#[derive(Debug, Clone)]
pub struct LegacyNormalizer {
    external_via: String,
}

impl LegacyNormalizer {
    /// Creates a normalizer using the configured system namespace
    pub fn new(config: &RbacConfig) -> Self {
        Self {
            external_via: config.external_caller_via(),
        }
    }

    /// Via-gate source written for `caller` and `internal` rewrites
    pub fn external_via(&self) -> &str {
        &self.external_via
    }

    /// Normalizes every rule of a role
    ///
    /// Canonical rules pass through untouched, so normalizing twice gives
    /// the same result as normalizing once.
    pub fn normalize(&self, role_id: &str, access: Vec<RuleRecord>) -> Vec<RuleRecord> {
        access
            .into_iter()
            .enumerate()
            .map(|(index, rule)| self.normalize_rule(role_id, index, rule))
            .collect()
    }

    /// Normalizes a complete role record
    pub fn normalize_record(&self, mut record: RoleRecord) -> RoleRecord {
        let access = std::mem::take(&mut record.access);
        record.access = self.normalize(&record.id, access);
        record
    }

    fn normalize_rule(&self, role_id: &str, index: usize, mut rule: RuleRecord) -> RuleRecord {
        for shape in LegacyShape::extract(&mut rule) {
            debug!(role = %role_id, rule = index, shape = ?shape, "Rewriting legacy access rule");
            self.apply(role_id, index, &mut rule, shape);
        }
        rule
    }

    fn apply(&self, role_id: &str, index: usize, rule: &mut RuleRecord, shape: LegacyShape) {
        match shape {
            LegacyShape::TypeName { kind, name } => {
                if rule.path.is_none() && rule.regex.is_none() {
                    rule.path = Some(format!("{}/{}", kind, name));
                }
                default_permission(rule);
            }
            LegacyShape::TypeRegex { kind, regex } => {
                if rule.path.is_none() && rule.regex.is_none() {
                    let body = regex.strip_prefix('^').unwrap_or(&regex);
                    rule.regex = Some(format!("{}/{}", kind, body));
                }
                default_permission(rule);
            }
            LegacyShape::MisspelledRegex(regex) => {
                if rule.path.is_none() && rule.regex.is_none() {
                    rule.regex = Some(regex);
                } else {
                    warn!(
                        role = %role_id,
                        rule = index,
                        regexp = %regex,
                        "Dropping 'regexp' shadowed by an existing pattern"
                    );
                }
            }
            LegacyShape::Caller(caller) => {
                debug!(role = %role_id, rule = index, caller = %caller, "Caller restriction widened to external callers");
                self.default_via(rule);
                default_permission(rule);
            }
            LegacyShape::Incomplete { kind, name } => {
                warn!(
                    role = %role_id,
                    rule = index,
                    kind = ?kind,
                    name = ?name,
                    "Legacy rule without both type and name, ignoring attributes"
                );
            }
            LegacyShape::InternalPermission => {
                if let Some(text) = rule.permission.as_deref() {
                    let rewritten: Vec<String> = permission::tokens(text)
                        .map(|t| if t == INTERNAL { READ.to_string() } else { t })
                        .collect();
                    rule.permission = Some(rewritten.join(" "));
                }
                self.default_via(rule);
            }
        }
    }

    fn default_via(&self, rule: &mut RuleRecord) {
        if !rule.has_via() {
            rule.via = Some(self.external_via.clone());
        }
    }
}

impl Default for LegacyNormalizer {
    fn default() -> Self {
        Self::new(&RbacConfig::default())
    }
}

fn default_permission(rule: &mut RuleRecord) {
    if rule.permission.is_none() {
        rule.permission = Some(READ.to_string());
    }
}

/// Normalizes a role's rules with the default configuration
pub fn normalize(role_id: &str, access: Vec<RuleRecord>) -> Vec<RuleRecord> {
    LegacyNormalizer::default().normalize(role_id, access)
}
