//! RBAC data access.
//!
//! The resolver never talks to a cluster directly. It reads Roles, Bindings
//! and User records through [`RbacStore`], which lets a live API client, an
//! informer cache or an exported snapshot stand behind the same traversal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use whatcan_types::{ClusterRole, ClusterRoleBinding, Role, RoleBinding, User, UserAttribute};

/// Error type for store lookups.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// The backing store could not be reached or answered with an error.
    #[error("Store request failed: {0}")]
    Transport(String),

    /// A snapshot file could not be read.
    #[error("Failed to read snapshot at {}", .path.display())]
    SnapshotRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A snapshot document was not valid.
    #[error("Failed to parse snapshot: {0}")]
    SnapshotParse(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Returns whether this error only reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Read-only access to RBAC objects and user records.
///
/// Implementations must be safe to share between namespace resolutions; none
/// of the operations take `&mut self`.
pub trait RbacStore {
    /// Gets the Role `name` in `namespace`.
    fn get_role(&self, namespace: &str, name: &str) -> Result<Role>;

    /// Lists every RoleBinding in `namespace`.
    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<RoleBinding>>;

    /// Gets the ClusterRole `name`.
    fn get_cluster_role(&self, name: &str) -> Result<ClusterRole>;

    /// Lists every ClusterRoleBinding.
    fn list_cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>>;

    /// Gets the User record `name`.
    fn get_user(&self, name: &str) -> Result<User>;

    /// Gets the attribute record for user `name`.
    ///
    /// Users that have never logged in have no attribute record; that case
    /// must be reported as [`StoreError::NotFound`].
    fn get_user_attributes(&self, name: &str) -> Result<UserAttribute>;

    /// Lists all namespace names.
    fn list_namespaces(&self) -> Result<Vec<String>>;
}

impl<S: RbacStore + ?Sized> RbacStore for &S {
    fn get_role(&self, namespace: &str, name: &str) -> Result<Role> {
        (**self).get_role(namespace, name)
    }

    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<RoleBinding>> {
        (**self).list_role_bindings(namespace)
    }

    fn get_cluster_role(&self, name: &str) -> Result<ClusterRole> {
        (**self).get_cluster_role(name)
    }

    fn list_cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>> {
        (**self).list_cluster_role_bindings()
    }

    fn get_user(&self, name: &str) -> Result<User> {
        (**self).get_user(name)
    }

    fn get_user_attributes(&self, name: &str) -> Result<UserAttribute> {
        (**self).get_user_attributes(name)
    }

    fn list_namespaces(&self) -> Result<Vec<String>> {
        (**self).list_namespaces()
    }
}

/// Serialized form of a [`MemoryStore`].
///
/// Each list holds the `items` of the matching `kubectl get <kind> -o json`
/// output (`users.management.cattle.io`, `roles`, `clusterrolebindings`, ...),
/// gathered into one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<User>,
    pub user_attributes: Vec<UserAttribute>,
    pub namespaces: Vec<String>,
    pub roles: Vec<Role>,
    pub role_bindings: Vec<RoleBinding>,
    pub cluster_roles: Vec<ClusterRole>,
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
}

/// In-memory store over a [`Snapshot`].
///
/// Lists come back in snapshot order. When the snapshot declares no
/// namespaces, [`RbacStore::list_namespaces`] derives them from the Roles and
/// RoleBindings it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-built snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Parses a JSON snapshot document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Loads a JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| StoreError::SnapshotRead {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&json)?;

        info!(
            path = %path.display(),
            roles = store.snapshot.roles.len(),
            role_bindings = store.snapshot.role_bindings.len(),
            cluster_roles = store.snapshot.cluster_roles.len(),
            cluster_role_bindings = store.snapshot.cluster_role_bindings.len(),
            "Loaded RBAC snapshot"
        );

        Ok(store)
    }

    /// Returns the underlying snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.snapshot.roles.push(role);
        self
    }

    pub fn with_role_binding(mut self, binding: RoleBinding) -> Self {
        self.snapshot.role_bindings.push(binding);
        self
    }

    pub fn with_cluster_role(mut self, role: ClusterRole) -> Self {
        self.snapshot.cluster_roles.push(role);
        self
    }

    pub fn with_cluster_role_binding(mut self, binding: ClusterRoleBinding) -> Self {
        self.snapshot.cluster_role_bindings.push(binding);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.snapshot.users.push(user);
        self
    }

    pub fn with_user_attribute(mut self, attribute: UserAttribute) -> Self {
        self.snapshot.user_attributes.push(attribute);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.snapshot.namespaces.push(namespace.into());
        self
    }
}

impl RbacStore for MemoryStore {
    fn get_role(&self, namespace: &str, name: &str) -> Result<Role> {
        self.snapshot
            .roles
            .iter()
            .find(|r| r.namespace() == namespace && r.name() == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Role", format!("{namespace}/{name}")))
    }

    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<RoleBinding>> {
        Ok(self
            .snapshot
            .role_bindings
            .iter()
            .filter(|b| b.namespace() == namespace)
            .cloned()
            .collect())
    }

    fn get_cluster_role(&self, name: &str) -> Result<ClusterRole> {
        self.snapshot
            .cluster_roles
            .iter()
            .find(|r| r.name() == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("ClusterRole", name))
    }

    fn list_cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>> {
        Ok(self.snapshot.cluster_role_bindings.clone())
    }

    fn get_user(&self, name: &str) -> Result<User> {
        self.snapshot
            .users
            .iter()
            .find(|u| u.name() == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("User", name))
    }

    fn get_user_attributes(&self, name: &str) -> Result<UserAttribute> {
        self.snapshot
            .user_attributes
            .iter()
            .find(|a| a.name() == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("UserAttribute", name))
    }

    fn list_namespaces(&self) -> Result<Vec<String>> {
        if !self.snapshot.namespaces.is_empty() {
            return Ok(self.snapshot.namespaces.clone());
        }

        let mut namespaces: Vec<String> = self
            .snapshot
            .roles
            .iter()
            .map(|r| r.namespace().to_string())
            .chain(self.snapshot.role_bindings.iter().map(|b| b.namespace().to_string()))
            .collect();
        namespaces.sort();
        namespaces.dedup();
        Ok(namespaces)
    }
}
