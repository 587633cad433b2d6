//! # CretoAI Role-Based Access Control
//!
//! Path-oriented RBAC engine: decides whether a role (or a user holding
//! roles) may exercise a permission on a storage path, given the chain of
//! nested calls that led to the check.
//!
//! ## Features
//!
//! - **Two pattern grammars**: path globs (`?`, `*`, `**`) and regular
//!   expressions, full-match and case-insensitive
//! - **Free-text permissions** with an `all` wildcard and custom tokens
//! - **Via-gates** restricting a rule to call chains that pass through
//!   specific procedures
//! - **Legacy normalization** of historical rule records
//! - **Lazy, thread-safe compilation** cached per rule
//!
//! ## Example
//!
//! ```rust
//! use cretoai_rbac::{CallChain, RbacConfig, RoleRegistry, User};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RoleRegistry::from_json(
//!     r#"[{
//!         "id": "analyst",
//!         "access": [
//!             {"path": "data/visible/**", "permission": "read, write"},
//!             {"path": "data/restricted/**", "permission": "read", "via": "procedure/reports/**"}
//!         ]
//!     }]"#,
//!     &RbacConfig::default(),
//! )?;
//!
//! let user = User::new("alice").with_role("analyst");
//! let chain = CallChain::new(["procedure/reports/list"]);
//!
//! assert!(registry.has_access(Some(&user), "data/restricted/overview", "read", &chain));
//! assert!(!registry.has_access(Some(&user), "data/restricted/overview", "write", &chain));
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod legacy;
pub mod pattern;
pub mod permission;
pub mod record;
pub mod registry;
pub mod role;
pub mod rule;
pub mod types;

// Re-export commonly used types
pub use chain::{CallChain, ContextSource};
pub use config::RbacConfig;
pub use error::{RbacError, Result};
pub use legacy::{LegacyNormalizer, LegacyShape};
pub use pattern::{Matcher, PatternError, PatternKind};
pub use permission::PermissionSet;
pub use record::{RoleRecord, RuleRecord};
pub use registry::RoleRegistry;
pub use role::{AutoAttach, Role};
pub use rule::AccessRule;
pub use types::{PermissionId, RoleId, User};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
