//! Access rules with lazily compiled matchers
//!
//! An [`AccessRule`] wraps one normalized [`RuleRecord`]. Its path
//! matcher, permission set and via-gate are compiled on first use and
//! cached in per-rule [`OnceCell`]s, so a role can be shared across
//! threads and the first concurrent checks all observe the same compiled
//! state.
//!
//! Malformed rules never fail an access check. A rule whose path source
//! is missing, ambiguous or unparsable never matches, and a rule whose
//! via-gate is ambiguous or unparsable never grants.

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::chain::{self, compile_via, CallChain};
use crate::pattern::{Matcher, PatternSource};
use crate::permission::PermissionSet;
use crate::record::{RuleDefect, RuleRecord};
use crate::types::RoleId;

/// Compiled via-gate state
#[derive(Debug, Clone)]
pub enum Gate {
    /// No via pattern, the rule applies to every call chain
    Open,
    /// Rule applies when a chain frame satisfies the matcher
    Chain(Matcher),
    /// Malformed via pattern, the rule never grants
    Closed,
}

impl Gate {
    /// Returns `true` if the gate admits the call chain
    pub fn admits(&self, chain: &CallChain) -> bool {
        match self {
            Gate::Open => true,
            Gate::Chain(matcher) => chain::matches(matcher, chain),
            Gate::Closed => false,
        }
    }
}

/// One access-control entry of a role
#[derive(Debug)]
pub struct AccessRule {
    role: RoleId,
    index: usize,
    record: RuleRecord,
    source: Result<PatternSource, RuleDefect>,
    matcher: OnceCell<Option<Matcher>>,
    permissions: OnceCell<PermissionSet>,
    gate: OnceCell<Gate>,
}

impl AccessRule {
    /// Creates a rule from a normalized record
    ///
    /// `role` and `index` only label log output.
    pub fn new(role: impl Into<RoleId>, index: usize, record: RuleRecord) -> Self {
        let source = record.pattern_source();
        Self {
            role: role.into(),
            index,
            record,
            source,
            matcher: OnceCell::new(),
            permissions: OnceCell::new(),
            gate: OnceCell::new(),
        }
    }

    /// Declarative record this rule was built from
    pub fn record(&self) -> &RuleRecord {
        &self.record
    }

    /// Compiled path matcher, `None` if the rule never matches
    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher
            .get_or_init(|| {
                let compiled = match &self.source {
                    Ok(source) => source.compile().map_err(RuleDefect::from),
                    Err(defect) => Err(defect.clone()),
                };
                compiled
                    .map_err(|defect| {
                        warn!(
                            role = %self.role,
                            rule = self.index,
                            error = %defect,
                            "Access rule disabled, it will never match"
                        );
                    })
                    .ok()
            })
            .as_ref()
    }

    /// Permissions this rule grants once it applies
    pub fn permissions(&self) -> &PermissionSet {
        self.permissions.get_or_init(|| {
            PermissionSet::parse(self.record.permission.as_deref().unwrap_or_default())
        })
    }

    /// Compiled via-gate
    pub fn gate(&self) -> &Gate {
        self.gate.get_or_init(|| {
            let compiled = self.record.via_source().and_then(|via| match via {
                Some(via) => compile_via(&via.text, via.kind)
                    .map(Gate::Chain)
                    .map_err(RuleDefect::Via),
                None => Ok(Gate::Open),
            });
            compiled.unwrap_or_else(|defect| {
                warn!(
                    role = %self.role,
                    rule = self.index,
                    error = %defect,
                    "Access rule via-gate invalid, it will never grant"
                );
                Gate::Closed
            })
        })
    }

    /// Returns `true` if the rule's pattern matches the path
    pub fn applies_to(&self, path: &str) -> bool {
        self.matcher().map_or(false, |m| m.is_match(path))
    }

    /// Permissions granted for a path under a call chain
    ///
    /// Returns the rule's permission set when the path matches and the
    /// via-gate admits the chain, the empty set otherwise.
    pub fn permissions_granted(&self, path: &str, chain: &CallChain) -> &PermissionSet {
        if self.applies_to(path) && self.gate().admits(chain) {
            self.permissions()
        } else {
            PermissionSet::empty()
        }
    }

    /// Returns `true` if a via-gate is configured
    pub fn is_gated(&self) -> bool {
        self.record.has_via()
    }
}
