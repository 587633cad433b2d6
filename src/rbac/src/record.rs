//! Declarative role and rule records
//!
//! These are the shapes handed over by the persistence layer. Records are
//! plain data: rules compile into [`AccessRule`](crate::rule::AccessRule)s
//! only after legacy normalization has run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::compile_via;
use crate::error::{RbacError, Result};
use crate::legacy::LegacyFields;
use crate::pattern::{PatternError, PatternSource};
use crate::role::AutoAttach;
use crate::types::RoleId;

/// Defect making a rule unusable
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleDefect {
    #[error("rule has neither a path nor a regex pattern")]
    MissingPattern,

    #[error("rule has both a path and a regex pattern")]
    AmbiguousPattern,

    #[error("rule has both a via and a via-regex pattern")]
    AmbiguousVia,

    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("invalid via pattern: {0}")]
    Via(PatternError),
}

/// One access rule as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleRecord {
    /// Path glob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Regular expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Free-text permission tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    /// Call-chain gate (glob, `!` negates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,

    /// Call-chain gate (regex, `!` negates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_regex: Option<String>,

    /// Attributes of historical record formats
    #[serde(flatten)]
    pub legacy: LegacyFields,
}

impl RuleRecord {
    /// Creates a path-glob rule
    pub fn path(pattern: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            path: Some(pattern.into()),
            permission: Some(permission.into()),
            ..Default::default()
        }
    }

    /// Creates a regex rule
    pub fn regex(pattern: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            permission: Some(permission.into()),
            ..Default::default()
        }
    }

    /// Adds a glob via-gate
    pub fn with_via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }

    /// Adds a regex via-gate
    pub fn with_via_regex(mut self, via: impl Into<String>) -> Self {
        self.via_regex = Some(via.into());
        self
    }

    /// Returns `true` if any via-gate source is set
    pub fn has_via(&self) -> bool {
        self.via.is_some() || self.via_regex.is_some()
    }

    /// Resolves the path source; exactly one of `path` and `regex` must be set
    pub fn pattern_source(&self) -> std::result::Result<PatternSource, RuleDefect> {
        match (&self.path, &self.regex) {
            (Some(path), None) => Ok(PatternSource::path(path.as_str())),
            (None, Some(regex)) => Ok(PatternSource::regex(regex.as_str())),
            (Some(_), Some(_)) => Err(RuleDefect::AmbiguousPattern),
            (None, None) => Err(RuleDefect::MissingPattern),
        }
    }

    /// Resolves the optional via-gate source
    pub fn via_source(&self) -> std::result::Result<Option<PatternSource>, RuleDefect> {
        match (&self.via, &self.via_regex) {
            (Some(via), None) => Ok(Some(PatternSource::path(via.as_str()))),
            (None, Some(via)) => Ok(Some(PatternSource::regex(via.as_str()))),
            (Some(_), Some(_)) => Err(RuleDefect::AmbiguousVia),
            (None, None) => Ok(None),
        }
    }

    /// Checks structure and pattern syntax
    ///
    /// Expects a normalized record; legacy-only records report
    /// [`RuleDefect::MissingPattern`].
    pub fn validate(&self) -> std::result::Result<(), RuleDefect> {
        self.pattern_source()?.compile()?;
        if let Some(via) = self.via_source()? {
            compile_via(&via.text, via.kind).map_err(RuleDefect::Via)?;
        }
        Ok(())
    }
}

/// One role as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Unique role identifier
    pub id: RoleId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Automatic membership
    #[serde(default)]
    pub auto: AutoAttach,

    /// Ordered access rules
    #[serde(default)]
    pub access: Vec<RuleRecord>,
}

impl RoleRecord {
    /// Creates an empty role record
    pub fn new(id: impl Into<RoleId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Sets the automatic membership mode
    pub fn with_auto(mut self, auto: AutoAttach) -> Self {
        self.auto = auto;
        self
    }

    /// Appends an access rule
    pub fn with_rule(mut self, rule: RuleRecord) -> Self {
        self.access.push(rule);
        self
    }

    /// Validates the record for loaders
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role identifier is blank
    /// - A rule has both or neither of `path` and `regex`
    /// - A rule has both `via` and `via-regex`
    /// - A pattern does not compile
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RbacError::InvalidRole(
                "Role identifier cannot be empty".to_string(),
            ));
        }

        for (index, rule) in self.access.iter().enumerate() {
            rule.validate().map_err(|defect| RbacError::InvalidRule {
                role: self.id.clone(),
                index,
                reason: defect.to_string(),
            })?;
        }

        Ok(())
    }
}
