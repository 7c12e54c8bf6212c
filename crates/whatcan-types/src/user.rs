//! Rancher user records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ObjectMeta;
use crate::meta::null_as_default;

/// A `management.cattle.io/v3` User.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub principal_ids: Vec<String>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_principal_id(mut self, principal_id: impl Into<String>) -> Self {
        self.principal_ids.push(principal_id.into());
        self
    }
}

/// An identity provider principal, e.g. `local://dev` or `github_org://42`.
///
/// The principal id is the object name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub metadata: ObjectMeta,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// The principal list one provider reports, as a `PrincipalList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principals {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Principal>,
}

/// Per-provider attributes recorded the first time a user logs in.
///
/// Keyed by provider name (`local`, `github`, `activedirectory`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttribute {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub group_principals: BTreeMap<String, Principals>,
    #[serde(default)]
    pub extra_by_provider: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl UserAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Adds a group principal reported by `provider`.
    pub fn with_group_principal(
        mut self,
        provider: impl Into<String>,
        principal: impl Into<String>,
    ) -> Self {
        self.group_principals
            .entry(provider.into())
            .or_default()
            .items
            .push(Principal::new(principal));
        self
    }

    /// Adds one extra value reported by `provider` under `key`.
    pub fn with_extra(
        mut self,
        provider: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.extra_by_provider
            .entry(provider.into())
            .or_default()
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Returns whether any provider supplied at least one extra entry.
    pub fn has_extras(&self) -> bool {
        self.extra_by_provider.values().any(|extra| !extra.is_empty())
    }
}
