//! Roles and their access decisions
//!
//! A [`Role`] bundles an ordered list of [`AccessRule`](crate::rule::AccessRule)s
//! with an automatic membership policy.
//!
//! # Features
//!
//! - **Union semantics**: every matching rule adds its permissions; there
//!   is no deny rule, so declaration order never matters
//! - **Wildcard**: a rule granting `all` satisfies any permission query
//! - **Via-gates**: rules restricted to call chains passing through
//!   specific procedures
//! - **Lazy compilation**: matchers compile once, on first check
//!
//! # Example
//!
//! ```rust
//! use cretoai_rbac::{CallChain, Role, RoleRecord, RuleRecord};
//!
//! let role = Role::new(
//!     RoleRecord::new("reporting")
//!         .with_rule(RuleRecord::path("data/visible/**", "read"))
//!         .with_rule(
//!             RuleRecord::path("data/restricted/**", "read").with_via("procedure/reports/**"),
//!         ),
//! );
//!
//! let direct = CallChain::empty();
//! let report = CallChain::new(["procedure/reports/list"]);
//!
//! assert!(role.has_access("data/visible/info", "read", &direct));
//! assert!(!role.has_access("data/restricted/overview", "read", &direct));
//! assert!(role.has_access("data/restricted/overview", "read", &report));
//! ```

pub mod types;


pub use types::{AutoAttach, Role};
