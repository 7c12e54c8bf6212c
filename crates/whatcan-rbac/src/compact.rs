//! Rule compaction.
//!
//! Expands each rule's `apiGroups × resources × resourceNames` into
//! [`DedupKey`]s and unions the verbs granted for every key. Empty fields are
//! normalized to `["*"]` before expansion, so a rule never needs special
//! handling for "any value".
//!
//! A key also receives the verbs of every key that covers it: `(*, pods, "")`
//! picks up whatever `(*, *, "")` grants, since that grant reaches pods too.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use whatcan_types::{PolicyRule, WILDCARD};

use crate::format::display_verbs;

/// Normalized identity of a grant target.
///
/// Field order is the sort order: resource name, then resource, then API
/// group. Every field sorts as its tab-joined string would, since `\t` sorts
/// below any printable character.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupKey {
    pub resource_name: String,
    pub resource: String,
    pub api_group: String,
}

impl DedupKey {
    pub fn new(
        resource_name: impl Into<String>,
        resource: impl Into<String>,
        api_group: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            resource: resource.into(),
            api_group: api_group.into(),
        }
    }

    /// Expands a rule into every key it covers.
    ///
    /// # Examples
    ///
    /// ```
    /// use whatcan_rbac::compact::DedupKey;
    /// use whatcan_types::PolicyRule;
    ///
    /// let rule = PolicyRule::new(["get"]).with_api_groups(["apps"]);
    /// assert_eq!(DedupKey::expand(&rule), vec![DedupKey::new("*", "*", "apps")]);
    /// ```
    pub fn expand(rule: &PolicyRule) -> Vec<DedupKey> {
        let groups = or_wildcard(&rule.api_groups);
        let resources = or_wildcard(&rule.resources);
        let names = or_wildcard(&rule.resource_names);

        let mut keys = Vec::with_capacity(groups.len() * resources.len() * names.len());
        for group in &groups {
            for resource in &resources {
                for name in &names {
                    keys.push(DedupKey::new(*name, *resource, *group));
                }
            }
        }
        keys
    }

    /// Returns whether every target matched by `other` is matched by `self`.
    ///
    /// Each field must be `*` or equal to the other's field.
    pub fn covers(&self, other: &DedupKey) -> bool {
        fn field_covers(outer: &str, inner: &str) -> bool {
            outer == WILDCARD || outer == inner
        }

        field_covers(&self.resource_name, &other.resource_name)
            && field_covers(&self.resource, &other.resource)
            && field_covers(&self.api_group, &other.api_group)
    }
}

fn or_wildcard(values: &[String]) -> Vec<&str> {
    if values.is_empty() {
        vec![WILDCARD]
    } else {
        values.iter().map(String::as_str).collect()
    }
}

/// Mapping from [`DedupKey`] to the union of verbs granted for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    entries: BTreeMap<DedupKey, BTreeSet<String>>,
}

/// One rendered row of a [`RuleTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRow {
    pub resource_name: String,
    pub resource: String,
    pub api_group: String,
    /// Sorted verbs, or exactly `["*"]` when the wildcard verb is granted.
    pub verbs: Vec<String>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions one rule's verbs into every key it expands to.
    ///
    /// Covering keys are not consulted here; [`compact`] does that once all
    /// rules are merged.
    pub fn merge_rule(&mut self, rule: &PolicyRule) {
        for key in DedupKey::expand(rule) {
            self.entries
                .entry(key)
                .or_default()
                .extend(rule.verbs.iter().cloned());
        }
    }

    /// Unions into each key the verbs of every other key covering it.
    ///
    /// Covering is transitive, so one pass over the merged entries suffices.
    pub fn inherit_covering_verbs(&mut self) {
        let merged = self.entries.clone();
        for (key, verbs) in &mut self.entries {
            for (other, granted) in &merged {
                if other != key && other.covers(key) {
                    verbs.extend(granted.iter().cloned());
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every verb granted for `key`, if any rule covers it.
    pub fn verbs(&self, key: &DedupKey) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&DedupKey, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Rows in key order with wildcard dominance applied to the verbs.
    pub fn rows(&self) -> Vec<RuleRow> {
        self.entries
            .iter()
            .map(|(key, verbs)| RuleRow {
                resource_name: key.resource_name.clone(),
                resource: key.resource.clone(),
                api_group: key.api_group.clone(),
                verbs: display_verbs(verbs).into_iter().map(str::to_string).collect(),
            })
            .collect()
    }
}

/// Builds the [`RuleTable`] for a rule sequence.
pub fn compact(rules: &[PolicyRule]) -> RuleTable {
    let mut table = RuleTable::new();
    for rule in rules {
        table.merge_rule(rule);
    }
    table.inherit_covering_verbs();
    table
}
