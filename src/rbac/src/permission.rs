//! Permission token sets
//!
//! Permission text is free-form: tokens separated by any run of
//! whitespace, commas or semicolons, compared case-insensitively. Tokens
//! that are not recognized pass through unchanged as custom permissions.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Explicit empty grant
pub const NONE: &str = "none";

/// Legacy alias for `read` restricted to non-system callers
pub const INTERNAL: &str = "internal";

/// Read access
pub const READ: &str = "read";

/// Search access
pub const SEARCH: &str = "search";

/// Write access
pub const WRITE: &str = "write";

/// Wildcard, satisfies every permission query
pub const ALL: &str = "all";

static EMPTY: Lazy<PermissionSet> = Lazy::new(PermissionSet::default);

/// Canonical, case-folded set of permission identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Parses free-form permission text
    ///
    /// Blank text yields the empty set.
    pub fn parse(text: &str) -> Self {
        Self(tokens(text).filter_map(canonical).collect())
    }

    /// Shared empty set
    pub fn empty() -> &'static PermissionSet {
        &EMPTY
    }

    /// Returns `true` if the set grants `permission`, directly or via `all`
    pub fn allows(&self, permission: &str) -> bool {
        let permission = permission.trim().to_lowercase();
        !permission.is_empty() && (self.0.contains(&permission) || self.0.contains(ALL))
    }

    /// Returns `true` if the exact token is present
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Adds every token of another set
    pub fn union_with(&mut self, other: &PermissionSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Tokens in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(" "))
    }
}

/// Splits permission text into lower-cased, non-empty raw tokens
///
/// No alias canonicalization happens here, so callers can spot legacy
/// tokens before they are rewritten.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Maps a raw token onto its canonical form, `None` for tokens that
/// grant nothing
fn canonical(token: String) -> Option<String> {
    match token.as_str() {
        "" | NONE => None,
        INTERNAL => Some(READ.to_string()),
        _ => Some(token),
    }
}
