//! # whatcan-rbac: effective permissions for a user
//!
//! Answers "what can this user do, on which resources, in this namespace?"
//! for Kubernetes RBAC (Role, RoleBinding, ClusterRole, ClusterRoleBinding)
//! with Rancher user records:
//! - **Identity resolution**: user name, groups from every auth provider,
//!   provider extras
//! - **Binding matching**: every binding whose subjects name the user or
//!   one of its groups
//! - **Compaction**: rules merged per (resourceName, resource, apiGroup)
//! - **Formatting**: a sorted, aligned table with wildcard-dominant verbs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  User + UserAttribute                        │
//! └─────────────────┬───────────────────────────┘
//!                   │  identity::resolve_identity
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  SubjectIdentity (name, groups, extras)      │
//! └─────────────────┬───────────────────────────┘
//!                   │  resolver::rules_for  (per namespace)
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Vec<PolicyRule> + warnings                  │
//! └─────────────────┬───────────────────────────┘
//!                   │  compact::compact
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RuleTable  ──  format::format_table         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use whatcan_rbac::{MemoryStore, PermissionResolver};
//! use whatcan_types::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject, User};
//!
//! let store = MemoryStore::new()
//!     .with_user(User::new("alice"))
//!     .with_cluster_role(ClusterRole::new("view").with_rule(
//!         PolicyRule::new(["get", "list"]).with_api_groups([""]).with_resources(["pods"]),
//!     ))
//!     .with_cluster_role_binding(
//!         ClusterRoleBinding::new("alice-view", RoleRef::cluster_role("view"))
//!             .with_subject(Subject::user("alice")),
//!     );
//!
//! let resolver = PermissionResolver::new(store);
//! let reports = resolver.resolve_permissions("alice", &["team-a".to_string()])?;
//!
//! assert_eq!(reports[0].render(), "* pods   [ get list ]\n");
//! assert!(reports[0].warnings.is_empty());
//! # Ok::<(), whatcan_rbac::ResolveError>(())
//! ```

pub mod compact;
pub mod engine;
pub mod format;
pub mod identity;
pub mod resolver;
pub mod store;

// Re-export commonly used types
pub use compact::{DedupKey, RuleRow, RuleTable, compact};
pub use engine::{NamespaceReport, PermissionResolver, ResolveError};
pub use format::{display_verbs, format_table};
pub use identity::{SubjectIdentity, lookup_identity, resolve_identity};
pub use resolver::{ResolutionWarning, RuleResolution, rules_for};
pub use store::{MemoryStore, RbacStore, Snapshot, StoreError};

#[cfg(test)]
mod tests;
