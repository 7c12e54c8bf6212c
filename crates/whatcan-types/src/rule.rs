//! Policy rules and the roles that carry them.

use serde::{Deserialize, Serialize};

use crate::ObjectMeta;
use crate::meta::null_as_default;

/// Matches any verb, API group, resource or resource name.
pub const WILDCARD: &str = "*";

/// The atomic grant: a set of verbs over (apiGroup, resource, resourceName)
/// combinations.
///
/// An empty `api_groups`, `resources` or `resource_names` list matches any
/// value, exactly like an explicit `["*"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub api_groups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub resource_names: Vec<String>,
}

impl PolicyRule {
    /// Creates a rule granting `verbs` over every group, resource and name.
    pub fn new<I, V>(verbs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            verbs: verbs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Restricts the rule to the given API groups.
    pub fn with_api_groups<I, V>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.api_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the rule to the given resources.
    pub fn with_resources<I, V>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the rule to the given resource names.
    pub fn with_resource_names<I, V>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Namespace-scoped bundle of policy rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<PolicyRule>,
}

impl Role {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::namespaced(namespace, name),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Cluster-wide bundle of policy rules.
///
/// May be bound cluster-wide by a [`ClusterRoleBinding`](crate::ClusterRoleBinding)
/// or inside one namespace by a [`RoleBinding`](crate::RoleBinding).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRole {
    pub metadata: ObjectMeta,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<PolicyRule>,
}

impl ClusterRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_deserializes_kubernetes_field_names() {
        let rule: PolicyRule = serde_json::from_str(
            r#"{"verbs":["get"],"apiGroups":["apps"],"resources":["deployments"],"resourceNames":["web"]}"#,
        )
        .unwrap();

        assert_eq!(rule.verbs, vec!["get"]);
        assert_eq!(rule.api_groups, vec!["apps"]);
        assert_eq!(rule.resources, vec!["deployments"]);
        assert_eq!(rule.resource_names, vec!["web"]);
    }

    #[test]
    fn test_missing_rule_fields_default_to_empty() {
        let rule: PolicyRule = serde_json::from_str(r#"{"verbs":["list"]}"#).unwrap();

        assert!(rule.api_groups.is_empty());
        assert!(rule.resources.is_empty());
        assert!(rule.resource_names.is_empty());
    }

    #[test]
    fn test_cluster_role_deserializes_kubectl_item() {
        let role: ClusterRole = serde_json::from_str(
            r#"{
                "apiVersion": "rbac.authorization.k8s.io/v1",
                "kind": "ClusterRole",
                "metadata": {"name": "view", "uid": "0b9e", "resourceVersion": "812"},
                "rules": [{"apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list", "watch"]}]
            }"#,
        )
        .unwrap();

        assert_eq!(role.name(), "view");
        assert_eq!(role.rules[0].verbs, vec!["get", "list", "watch"]);
    }

    #[test]
    fn test_role_builder() {
        let role = Role::new("team-a", "pod-reader")
            .with_rule(PolicyRule::new(["get"]).with_resources(["pods"]));

        assert_eq!(role.namespace(), "team-a");
        assert_eq!(role.name(), "pod-reader");
        assert_eq!(role.rules.len(), 1);
        assert_eq!(role.rules[0].resources, vec!["pods"]);
    }
}
