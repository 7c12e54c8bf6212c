//! # whatcan-types: RBAC object model
//!
//! Shared types used across `whatcan`:
//! - Grants ([`PolicyRule`])
//! - Rule containers ([`Role`], [`ClusterRole`])
//! - Attachments ([`RoleBinding`], [`ClusterRoleBinding`], [`RoleRef`], [`Subject`])
//! - User records ([`User`], [`UserAttribute`], [`Principal`])
//! - Resolution targets ([`Scope`])
//!
//! Objects keep the shape of the Kubernetes `rbac.authorization.k8s.io/v1`
//! and Rancher `management.cattle.io/v3` APIs: identity lives under
//! `metadata` ([`ObjectMeta`]) and field names are camelCase, so the `items`
//! of `kubectl get ... -o json` deserialize without translation. Fields that
//! resolution does not read (`apiVersion`, `kind`, `status`, ...) are ignored.

mod binding;
mod meta;
mod rule;
mod scope;
mod user;

pub use binding::{ClusterRoleBinding, RoleBinding, RoleRef, RoleRefKind, Subject, SubjectKind};
pub use meta::ObjectMeta;
pub use rule::{ClusterRole, PolicyRule, Role, WILDCARD};
pub use scope::Scope;
pub use user::{Principal, Principals, User, UserAttribute};
