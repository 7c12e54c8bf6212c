//! Binding matching and rule aggregation.
//!
//! Walks every ClusterRoleBinding (and, in a namespace, every RoleBinding of
//! that namespace), keeps the bindings whose subjects match the identity and
//! collects the rules of the roles they reference.
//!
//! A lookup that fails drops that binding's rules and records a
//! [`ResolutionWarning`]; the walk always visits every binding.

use thiserror::Error;
use tracing::{debug, trace};
use whatcan_types::{PolicyRule, RoleRef, RoleRefKind, Scope, Subject, SubjectKind};

use crate::identity::SubjectIdentity;
use crate::store::{RbacStore, StoreError};

/// A non-fatal failure met while walking bindings.
#[derive(Debug, Error)]
pub enum ResolutionWarning {
    /// The RoleBindings of a namespace could not be listed.
    #[error("failed to list roleBindings in namespace '{namespace}': {source}")]
    ListRoleBindings {
        namespace: String,
        #[source]
        source: StoreError,
    },

    /// The ClusterRoleBindings could not be listed.
    #[error("failed to list clusterRoleBindings: {source}")]
    ListClusterRoleBindings {
        #[source]
        source: StoreError,
    },

    /// A RoleBinding references a Role that could not be fetched.
    #[error(
        "failed to get role '{role}' in namespace '{namespace}' for binding '{binding}': {source}"
    )]
    RoleLookup {
        binding: String,
        namespace: String,
        role: String,
        #[source]
        source: StoreError,
    },

    /// A binding references a ClusterRole that could not be fetched.
    #[error("failed to get clusterRole '{role}' for binding '{binding}': {source}")]
    ClusterRoleLookup {
        binding: String,
        role: String,
        #[source]
        source: StoreError,
    },

    /// A ClusterRoleBinding references something other than a ClusterRole.
    #[error("clusterRoleBinding '{binding}' has unsupported role reference kind '{kind}'")]
    UnsupportedRoleRef { binding: String, kind: RoleRefKind },
}

/// Rules granted in one scope, plus the warnings met collecting them.
#[derive(Debug, Default)]
pub struct RuleResolution {
    /// Rules in binding-discovery order, then rule order within each role.
    pub rules: Vec<PolicyRule>,
    pub warnings: Vec<ResolutionWarning>,
}

impl RuleResolution {
    /// Returns whether every binding was resolved.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, warning: ResolutionWarning) {
        debug!(%warning, "Partial rule resolution");
        self.warnings.push(warning);
    }
}

/// Returns whether `subject` refers to `identity`.
///
/// Users match by name and groups by membership. Service accounts are never
/// matched: a user identity cannot be a service account.
pub fn subject_matches(subject: &Subject, identity: &SubjectIdentity) -> bool {
    match subject.kind {
        SubjectKind::User => subject.name == identity.name(),
        SubjectKind::Group => identity.in_group(&subject.name),
        SubjectKind::ServiceAccount => false,
    }
}

/// Returns whether any subject of a binding refers to `identity`.
pub fn applies_to(subjects: &[Subject], identity: &SubjectIdentity) -> bool {
    subjects.iter().any(|s| subject_matches(s, identity))
}

/// Collects every rule granted to `identity` in `scope`.
pub fn rules_for<S: RbacStore + ?Sized>(
    store: &S,
    identity: &SubjectIdentity,
    scope: &Scope,
) -> RuleResolution {
    let mut resolution = RuleResolution::default();

    match store.list_cluster_role_bindings() {
        Ok(bindings) => {
            for binding in bindings
                .iter()
                .filter(|b| applies_to(&b.subjects, identity))
            {
                trace!(binding = %binding.name(), role = %binding.role_ref.name, "ClusterRoleBinding matched");
                if binding.role_ref.kind != RoleRefKind::ClusterRole {
                    resolution.warn(ResolutionWarning::UnsupportedRoleRef {
                        binding: binding.name().to_string(),
                        kind: binding.role_ref.kind,
                    });
                    continue;
                }
                collect_cluster_role(store, binding.name(), &binding.role_ref, &mut resolution);
            }
        }
        Err(source) => resolution.warn(ResolutionWarning::ListClusterRoleBindings { source }),
    }

    if let Some(namespace) = scope.namespace() {
        match store.list_role_bindings(namespace) {
            Ok(bindings) => {
                for binding in bindings
                    .iter()
                    .filter(|b| applies_to(&b.subjects, identity))
                {
                    trace!(
                        namespace,
                        binding = %binding.name(),
                        role = %binding.role_ref.name,
                        "RoleBinding matched"
                    );
                    match binding.role_ref.kind {
                        RoleRefKind::Role => match store.get_role(namespace, &binding.role_ref.name)
                        {
                            Ok(role) => resolution.rules.extend(role.rules),
                            Err(source) => resolution.warn(ResolutionWarning::RoleLookup {
                                binding: binding.name().to_string(),
                                namespace: namespace.to_string(),
                                role: binding.role_ref.name.clone(),
                                source,
                            }),
                        },
                        RoleRefKind::ClusterRole => collect_cluster_role(
                            store,
                            binding.name(),
                            &binding.role_ref,
                            &mut resolution,
                        ),
                    }
                }
            }
            Err(source) => resolution.warn(ResolutionWarning::ListRoleBindings {
                namespace: namespace.to_string(),
                source,
            }),
        }
    }

    resolution
}

fn collect_cluster_role<S: RbacStore + ?Sized>(
    store: &S,
    binding: &str,
    role_ref: &RoleRef,
    resolution: &mut RuleResolution,
) {
    match store.get_cluster_role(&role_ref.name) {
        Ok(role) => resolution.rules.extend(role.rules),
        Err(source) => resolution.warn(ResolutionWarning::ClusterRoleLookup {
            binding: binding.to_string(),
            role: role_ref.name.clone(),
            source,
        }),
    }
}
