//! Permission resolution sessions.
//!
//! [`PermissionResolver`] is the entry point: it resolves the user's identity
//! once, then produces one [`NamespaceReport`] per requested namespace.

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;
use whatcan_types::Scope;

use crate::compact::{RuleTable, compact};
use crate::format::format_table;
use crate::identity::{SubjectIdentity, lookup_identity};
use crate::resolver::{ResolutionWarning, rules_for};
use crate::store::{RbacStore, StoreError};

/// Setup failure that stops a resolution before any namespace is visited.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No user name was given.
    #[error("must specify a user")]
    MissingUser,

    /// The user record could not be fetched.
    #[error("Failed to get user '{user}'")]
    UserLookup {
        user: String,
        #[source]
        source: StoreError,
    },

    /// The attribute record lookup failed for a reason other than absence.
    #[error("Failed to get user attributes for '{user}'")]
    AttributeLookup {
        user: String,
        #[source]
        source: StoreError,
    },

    /// Namespaces could not be enumerated.
    #[error("Failed to list namespaces")]
    NamespaceListing(#[source] StoreError),
}

/// Result type for resolution sessions.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Effective permissions in one namespace.
#[derive(Debug)]
pub struct NamespaceReport {
    /// The namespace as requested; empty for cluster scope.
    pub namespace: String,
    pub table: RuleTable,
    /// Partial failures; the table holds every rule that did resolve.
    pub warnings: Vec<ResolutionWarning>,
}

impl NamespaceReport {
    /// Renders the table as aligned text.
    pub fn render(&self) -> String {
        format_table(&self.table)
    }
}

/// Resolves effective permissions against an [`RbacStore`].
#[derive(Debug, Clone)]
pub struct PermissionResolver<S> {
    store: S,
}

impl<S: RbacStore> PermissionResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetches `user_name` and builds its identity.
    pub fn identity_for(&self, user_name: &str) -> Result<SubjectIdentity> {
        if user_name.is_empty() {
            return Err(ResolveError::MissingUser);
        }

        let user = self
            .store
            .get_user(user_name)
            .map_err(|source| ResolveError::UserLookup {
                user: user_name.to_string(),
                source,
            })?;

        lookup_identity(&self.store, &user).map_err(|source| ResolveError::AttributeLookup {
            user: user_name.to_string(),
            source,
        })
    }

    /// Every namespace known to the store.
    pub fn all_namespaces(&self) -> Result<Vec<String>> {
        self.store
            .list_namespaces()
            .map_err(ResolveError::NamespaceListing)
    }

    /// Resolves `identity` in a single namespace (`""` for cluster scope).
    pub fn resolve_namespace(&self, identity: &SubjectIdentity, namespace: &str) -> NamespaceReport {
        let scope = Scope::from_namespace(namespace);
        let resolution = rules_for(&self.store, identity, &scope);
        let table = compact(&resolution.rules);

        info!(
            user = %identity.name(),
            namespace,
            rules = resolution.rules.len(),
            keys = table.len(),
            warnings = resolution.warnings.len(),
            "Resolved permissions"
        );

        NamespaceReport {
            namespace: namespace.to_string(),
            table,
            warnings: resolution.warnings,
        }
    }

    /// Resolves `user_name` in each namespace, in order.
    ///
    /// An empty namespace list resolves cluster scope only.
    pub fn resolve_permissions(
        &self,
        user_name: &str,
        namespaces: &[String],
    ) -> Result<Vec<NamespaceReport>> {
        let identity = self.identity_for(user_name)?;

        Ok(scopes(namespaces)
            .iter()
            .map(|ns| self.resolve_namespace(&identity, ns))
            .collect())
    }
}

impl<S: RbacStore + Sync> PermissionResolver<S> {
    /// Same as [`PermissionResolver::resolve_permissions`], with namespaces
    /// resolved on the rayon pool. Reports keep the input order.
    pub fn resolve_permissions_parallel(
        &self,
        user_name: &str,
        namespaces: &[String],
    ) -> Result<Vec<NamespaceReport>> {
        let identity = self.identity_for(user_name)?;

        Ok(scopes(namespaces)
            .par_iter()
            .map(|ns| self.resolve_namespace(&identity, ns))
            .collect())
    }
}

fn scopes(namespaces: &[String]) -> Vec<String> {
    if namespaces.is_empty() {
        vec![String::new()]
    } else {
        namespaces.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use whatcan_types::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject, User};

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_user(User::new("alice"))
            .with_cluster_role(
                ClusterRole::new("view").with_rule(PolicyRule::new(["get"]).with_resources(["pods"])),
            )
            .with_cluster_role_binding(
                ClusterRoleBinding::new("view-all", RoleRef::cluster_role("view"))
                    .with_subject(Subject::user("alice")),
            )
            .with_namespace("team-a")
            .with_namespace("team-b")
    }

    #[test]
    fn test_missing_user_is_fatal() {
        let resolver = PermissionResolver::new(store());

        let err = resolver.resolve_permissions("mallory", &[]).unwrap_err();
        assert!(matches!(err, ResolveError::UserLookup { ref user, .. } if user == "mallory"));
    }

    #[test]
    fn test_empty_user_name_is_rejected() {
        let resolver = PermissionResolver::new(store());

        assert!(matches!(
            resolver.resolve_permissions("", &[]),
            Err(ResolveError::MissingUser)
        ));
    }

    #[test]
    fn test_no_namespaces_means_cluster_scope() {
        let resolver = PermissionResolver::new(store());

        let reports = resolver.resolve_permissions("alice", &[]).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].namespace, "");
        assert_eq!(reports[0].table.len(), 1);
    }

    #[test]
    fn test_reports_follow_namespace_order() {
        let resolver = PermissionResolver::new(store());
        let namespaces = resolver.all_namespaces().unwrap();

        let reports = resolver.resolve_permissions("alice", &namespaces).unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.namespace.as_str()).collect();
        assert_eq!(names, vec!["team-a", "team-b"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let resolver = PermissionResolver::new(store());
        let namespaces: Vec<String> = (0..16).map(|i| format!("ns-{i}")).collect();

        let sequential = resolver.resolve_permissions("alice", &namespaces).unwrap();
        let parallel = resolver
            .resolve_permissions_parallel("alice", &namespaces)
            .unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.namespace, p.namespace);
            assert_eq!(s.table, p.table);
            assert_eq!(s.render(), p.render());
        }
    }
}
