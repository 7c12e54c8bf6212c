//! Object metadata shared by every exported API object.

use serde::{Deserialize, Deserializer, Serialize};

/// The `metadata` block of a Kubernetes or Rancher object.
///
/// Only the fields resolution needs are kept; `uid`, `labels` and the rest
/// are ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    /// Empty for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl ObjectMeta {
    /// Metadata of a cluster-scoped object.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
        }
    }

    /// Metadata of a namespaced object.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Reads an explicit `null` as the default value.
///
/// Exported objects carry `null` for empty lists.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_scoped_metadata_omits_namespace() {
        let json = serde_json::to_string(&ObjectMeta::named("view")).unwrap();
        assert_eq!(json, r#"{"name":"view"}"#);
    }

    #[test]
    fn test_unknown_metadata_fields_are_ignored() {
        let meta: ObjectMeta = serde_json::from_str(
            r#"{"name":"dev-pods","namespace":"team-a","uid":"6d1c","resourceVersion":"42","labels":{"app":"web"}}"#,
        )
        .unwrap();

        assert_eq!(meta, ObjectMeta::namespaced("team-a", "dev-pods"));
    }
}
