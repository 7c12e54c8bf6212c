//! Subject identity resolution.
//!
//! Turns a Rancher [`User`] (plus its optional [`UserAttribute`] record) into
//! the name, uid, groups and extras that bindings are matched against.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use whatcan_types::{User, UserAttribute};

use crate::store::{RbacStore, StoreError};

/// Group every authenticated user belongs to.
pub const ALL_AUTHENTICATED_GROUP: &str = "system:authenticated";

/// Rancher's marker group for authenticated users.
pub const CATTLE_AUTHENTICATED_GROUP: &str = "system:cattle:authenticated";

/// Prefix carried by principals from the local auth provider.
pub const LOCAL_PRINCIPAL_PREFIX: &str = "local://";

/// Extras key holding the user's principal ids.
pub const EXTRA_PRINCIPAL_ID: &str = "principalid";

/// Extras key holding the user's display name.
pub const EXTRA_USERNAME: &str = "username";

/// The identity bindings are evaluated against.
///
/// Built once per resolution session and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectIdentity {
    name: String,
    uid: String,
    groups: Vec<String>,
    extras: BTreeMap<String, Vec<String>>,
}

impl SubjectIdentity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Groups in derivation order, without duplicates. Provider groups come
    /// first, then the two authenticated pseudo-groups.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn extras(&self) -> &BTreeMap<String, Vec<String>> {
        &self.extras
    }

    /// Returns whether the identity is a member of `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Builds the identity for `user`.
///
/// `attributes` is `None` for users that have never logged in; they are
/// placed in the authenticated pseudo-groups only.
///
/// # Examples
///
/// ```
/// use whatcan_rbac::identity::{resolve_identity, ALL_AUTHENTICATED_GROUP};
/// use whatcan_types::{User, UserAttribute};
///
/// let user = User::new("alice");
/// let attributes = UserAttribute::new("alice").with_group_principal("local", "local://dev");
///
/// let identity = resolve_identity(&user, Some(&attributes));
/// assert!(identity.in_group("dev"));
/// assert!(identity.in_group(ALL_AUTHENTICATED_GROUP));
/// ```
pub fn resolve_identity(user: &User, attributes: Option<&UserAttribute>) -> SubjectIdentity {
    let mut groups = Vec::new();
    if let Some(attributes) = attributes {
        for principals in attributes.group_principals.values() {
            for principal in &principals.items {
                let name = principal
                    .name()
                    .strip_prefix(LOCAL_PRINCIPAL_PREFIX)
                    .unwrap_or(principal.name());
                push_unique(&mut groups, name);
            }
        }
    }
    push_unique(&mut groups, ALL_AUTHENTICATED_GROUP);
    push_unique(&mut groups, CATTLE_AUTHENTICATED_GROUP);

    SubjectIdentity {
        name: user.name().to_string(),
        uid: user.name().to_string(),
        groups,
        extras: merge_extras(user, attributes),
    }
}

/// Fetches the attribute record for `user` and builds its identity.
///
/// A missing attribute record is the normal pre-first-login state and falls
/// back to [`resolve_identity`] without attributes. Any other store error is
/// returned.
pub fn lookup_identity<S: RbacStore + ?Sized>(
    store: &S,
    user: &User,
) -> Result<SubjectIdentity, StoreError> {
    let attributes = match store.get_user_attributes(user.name()) {
        Ok(attributes) => Some(attributes),
        Err(e) if e.is_not_found() => {
            debug!(user = %user.name(), "No user attributes found, deriving identity from user record");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(resolve_identity(user, attributes.as_ref()))
}

fn merge_extras(user: &User, attributes: Option<&UserAttribute>) -> BTreeMap<String, Vec<String>> {
    let mut extras: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if let Some(attributes) = attributes.filter(|a| a.has_extras()) {
        for extra in attributes.extra_by_provider.values() {
            for (key, values) in extra {
                let merged = extras.entry(key.clone()).or_default();
                for value in values {
                    push_unique(merged, value);
                }
            }
        }
    }

    if extras.get(EXTRA_PRINCIPAL_ID).is_none_or(Vec::is_empty) {
        extras.insert(EXTRA_PRINCIPAL_ID.to_string(), user.principal_ids.clone());
    }
    if extras.get(EXTRA_USERNAME).is_none_or(Vec::is_empty) {
        extras.insert(EXTRA_USERNAME.to_string(), vec![user.display_name.clone()]);
    }

    extras
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
