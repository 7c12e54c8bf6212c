//! Resolution targets.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Where a permission resolution is evaluated.
///
/// Only cluster role bindings apply at [`Scope::Cluster`]; a namespace scope
/// sees both the namespace's role bindings and every cluster role binding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    Cluster,
    Namespace(String),
}

impl Scope {
    /// Maps a namespace argument to a scope. The empty string is cluster scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use whatcan_types::Scope;
    ///
    /// assert_eq!(Scope::from_namespace(""), Scope::Cluster);
    /// assert_eq!(Scope::from_namespace("team-a"), Scope::Namespace("team-a".into()));
    /// ```
    pub fn from_namespace(namespace: &str) -> Self {
        if namespace.is_empty() {
            Scope::Cluster
        } else {
            Scope::Namespace(namespace.to_string())
        }
    }

    /// The namespace name, or `None` at cluster scope.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Scope::Cluster => None,
            Scope::Namespace(ns) => Some(ns),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace().unwrap_or(""))
    }
}
