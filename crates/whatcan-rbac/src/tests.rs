//! Cross-module scenarios: store → identity → bindings → table → text.

use proptest::prelude::*;
use whatcan_types::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject, User,
    UserAttribute,
};

use crate::identity::{ALL_AUTHENTICATED_GROUP, CATTLE_AUTHENTICATED_GROUP};
use crate::store::Result as StoreResult;
use crate::*;

// ============================================================================
// Fixtures
// ============================================================================

fn team_a_store() -> MemoryStore {
    MemoryStore::new()
        .with_user(User::new("alice").with_display_name("Alice"))
        .with_user_attribute(
            UserAttribute::new("alice").with_group_principal("local", "local://dev"),
        )
        .with_role(
            Role::new("team-a", "pod-reader").with_rule(
                PolicyRule::new(["get", "list"])
                    .with_api_groups([""])
                    .with_resources(["pods"]),
            ),
        )
        .with_role_binding(
            RoleBinding::new("team-a", "dev-pods", RoleRef::role("pod-reader"))
                .with_subject(Subject::group("dev")),
        )
        .with_cluster_role(
            ClusterRole::new("core-admin")
                .with_rule(PolicyRule::new(["*"]).with_api_groups([""])),
        )
        .with_cluster_role_binding(
            ClusterRoleBinding::new("alice-core-admin", RoleRef::cluster_role("core-admin"))
                .with_subject(Subject::user("alice")),
        )
}

/// Wraps a store and fails chosen operations with a transport error.
struct FlakyStore {
    inner: MemoryStore,
    fail_attributes: bool,
    fail_role_bindings: bool,
    fail_cluster_role_bindings: bool,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_attributes: false,
            fail_role_bindings: false,
            fail_cluster_role_bindings: false,
        }
    }
}

fn transport() -> StoreError {
    StoreError::Transport("connection reset by peer".to_string())
}

impl RbacStore for FlakyStore {
    fn get_role(&self, namespace: &str, name: &str) -> StoreResult<Role> {
        self.inner.get_role(namespace, name)
    }

    fn list_role_bindings(&self, namespace: &str) -> StoreResult<Vec<RoleBinding>> {
        if self.fail_role_bindings {
            return Err(transport());
        }
        self.inner.list_role_bindings(namespace)
    }

    fn get_cluster_role(&self, name: &str) -> StoreResult<ClusterRole> {
        self.inner.get_cluster_role(name)
    }

    fn list_cluster_role_bindings(&self) -> StoreResult<Vec<ClusterRoleBinding>> {
        if self.fail_cluster_role_bindings {
            return Err(transport());
        }
        self.inner.list_cluster_role_bindings()
    }

    fn get_user(&self, name: &str) -> StoreResult<User> {
        self.inner.get_user(name)
    }

    fn get_user_attributes(&self, name: &str) -> StoreResult<UserAttribute> {
        if self.fail_attributes {
            return Err(transport());
        }
        self.inner.get_user_attributes(name)
    }

    fn list_namespaces(&self) -> StoreResult<Vec<String>> {
        self.inner.list_namespaces()
    }
}

// ============================================================================
// End-to-end Scenarios
// ============================================================================

#[test]
fn cluster_wildcard_subsumes_namespaced_grant() {
    let resolver = PermissionResolver::new(team_a_store());

    let reports = resolver
        .resolve_permissions("alice", &["team-a".to_string()])
        .unwrap();
    let report = &reports[0];

    assert!(report.warnings.is_empty());
    let rows = report.table.rows();
    let pods: Vec<&RuleRow> = rows
        .iter()
        .filter(|r| r.resource == "pods" && r.api_group.is_empty())
        .collect();
    assert_eq!(pods.len(), 1);
    assert_eq!(pods[0].resource_name, "*");
    assert_eq!(pods[0].verbs, vec!["*"]);

    // The wildcard-resource key from the ClusterRole is present as well.
    let any = DedupKey::new("*", "*", "");
    assert!(report.table.verbs(&any).is_some());

    assert_eq!(report.render(), "* *      [ * ]\n* pods   [ * ]\n");
}

#[test]
fn namespaced_grant_absent_in_other_namespace() {
    let resolver = PermissionResolver::new(team_a_store());

    let reports = resolver
        .resolve_permissions("alice", &["team-b".to_string()])
        .unwrap();

    assert_eq!(reports[0].table.len(), 1);
    assert!(
        reports[0]
            .table
            .verbs(&DedupKey::new("*", "pods", ""))
            .is_none()
    );
}

#[test]
fn one_dangling_binding_of_three_keeps_the_rest() {
    let store = MemoryStore::new()
        .with_user(User::new("alice"))
        .with_role(Role::new("team-a", "pods").with_rule(PolicyRule::new(["get"]).with_resources(["pods"])))
        .with_role(
            Role::new("team-a", "secrets")
                .with_rule(PolicyRule::new(["list"]).with_resources(["secrets"])),
        )
        .with_role_binding(
            RoleBinding::new("team-a", "b1", RoleRef::role("pods")).with_subject(Subject::user("alice")),
        )
        .with_role_binding(
            RoleBinding::new("team-a", "b2", RoleRef::role("deleted"))
                .with_subject(Subject::user("alice")),
        )
        .with_role_binding(
            RoleBinding::new("team-a", "b3", RoleRef::role("secrets"))
                .with_subject(Subject::group(ALL_AUTHENTICATED_GROUP)),
        );

    let reports = PermissionResolver::new(store)
        .resolve_permissions("alice", &["team-a".to_string()])
        .unwrap();
    let report = &reports[0];

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].to_string().contains("'deleted'"));
    assert_eq!(report.table.len(), 2);
    assert!(report.table.verbs(&DedupKey::new("*", "pods", "*")).is_some());
    assert!(report.table.verbs(&DedupKey::new("*", "secrets", "*")).is_some());
}

#[test]
fn user_without_attributes_gets_pseudo_groups() {
    let store = MemoryStore::new().with_user(
        User::new("newbie")
            .with_display_name("New User")
            .with_principal_id("local://newbie"),
    );
    let resolver = PermissionResolver::new(store);

    let identity = resolver.identity_for("newbie").unwrap();

    assert_eq!(
        identity.groups(),
        [ALL_AUTHENTICATED_GROUP, CATTLE_AUTHENTICATED_GROUP]
    );
    assert_eq!(identity.extras()["principalid"], vec!["local://newbie"]);
    assert_eq!(identity.extras()["username"], vec!["New User"]);
}

#[test]
fn authenticated_group_bindings_apply_to_everyone() {
    let store = MemoryStore::new()
        .with_user(User::new("newbie"))
        .with_cluster_role(
            ClusterRole::new("basic")
                .with_rule(PolicyRule::new(["get"]).with_api_groups(["management.cattle.io"]).with_resources(["settings"])),
        )
        .with_cluster_role_binding(
            ClusterRoleBinding::new("everyone", RoleRef::cluster_role("basic"))
                .with_subject(Subject::group(CATTLE_AUTHENTICATED_GROUP)),
        );

    let reports = PermissionResolver::new(store)
        .resolve_permissions("newbie", &[])
        .unwrap();

    assert_eq!(
        reports[0].render(),
        "* settings management.cattle.io  [ get ]\n"
    );
}

#[test]
fn kubectl_export_resolves_through_group_principal() {
    let store =
        MemoryStore::from_json_str(include_str!("../tests/fixtures/kubectl_export.json")).unwrap();
    let resolver = PermissionResolver::new(store);

    let identity = resolver.identity_for("u-abc12").unwrap();
    assert!(identity.in_group("g-dev"));
    assert_eq!(identity.extras()["username"], vec!["alice"]);

    let reports = resolver
        .resolve_permissions("u-abc12", &["team-a".to_string()])
        .unwrap();

    assert!(reports[0].warnings.is_empty());
    assert_eq!(
        reports[0].render(),
        "* pods       [ get list ]\n* pods/log   [ get list ]\n"
    );
}

// ============================================================================
// Store Failures
// ============================================================================

#[test]
fn attribute_transport_failure_is_fatal() {
    let mut store = FlakyStore::new(team_a_store());
    store.fail_attributes = true;

    let err = PermissionResolver::new(store)
        .resolve_permissions("alice", &[])
        .unwrap_err();

    assert!(matches!(err, ResolveError::AttributeLookup { .. }));
}

#[test]
fn role_binding_listing_failure_keeps_cluster_rules() {
    let mut store = FlakyStore::new(team_a_store());
    store.fail_role_bindings = true;

    let reports = PermissionResolver::new(store)
        .resolve_permissions("alice", &["team-a".to_string()])
        .unwrap();
    let report = &reports[0];

    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        ResolutionWarning::ListRoleBindings { .. }
    ));
    assert!(report.table.verbs(&DedupKey::new("*", "*", "")).is_some());
}

#[test]
fn cluster_binding_listing_failure_keeps_namespace_rules() {
    let mut store = FlakyStore::new(team_a_store());
    store.fail_cluster_role_bindings = true;

    let reports = PermissionResolver::new(store)
        .resolve_permissions("alice", &["team-a".to_string()])
        .unwrap();
    let report = &reports[0];

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.render(), "* pods   [ get list ]\n");
}

// ============================================================================
// Property Tests
// ============================================================================

fn field() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["", "*", "apps", "pods", "web", "rbac.authorization.k8s.io"]),
        0..3,
    )
    .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

fn policy_rule() -> impl Strategy<Value = PolicyRule> {
    (
        prop::collection::vec(
            prop::sample::select(vec!["get", "list", "watch", "create", "delete", "*"]),
            0..4,
        ),
        field(),
        field(),
        field(),
    )
        .prop_map(|(verbs, api_groups, resources, resource_names)| PolicyRule {
            verbs: verbs.into_iter().map(str::to_string).collect(),
            api_groups,
            resources,
            resource_names,
        })
}

proptest! {
    /// Rule order never changes the compacted table.
    #[test]
    fn compaction_ignores_rule_order(rules in prop::collection::vec(policy_rule(), 0..8)) {
        let mut reversed = rules.clone();
        reversed.reverse();

        prop_assert_eq!(compact(&rules), compact(&reversed));
    }

    /// Compacting twice yields the same table and the same bytes.
    #[test]
    fn compaction_and_formatting_are_repeatable(rules in prop::collection::vec(policy_rule(), 0..8)) {
        let first = compact(&rules);
        let second = compact(&rules);

        prop_assert_eq!(format_table(&first), format_table(&second));
        prop_assert_eq!(first, second);
    }

    /// A displayed verb list is either exactly `*` or sorted without `*`.
    #[test]
    fn displayed_verbs_are_wildcard_dominant(rules in prop::collection::vec(policy_rule(), 1..8)) {
        for row in compact(&rules).rows() {
            if row.verbs.iter().any(|v| v == "*") {
                prop_assert_eq!(row.verbs, vec!["*".to_string()]);
            } else {
                let mut sorted = row.verbs.clone();
                sorted.sort();
                prop_assert_eq!(row.verbs, sorted);
            }
        }
    }

    /// Every row of the text output places the verb bracket at the same column.
    #[test]
    fn verb_brackets_align(rules in prop::collection::vec(policy_rule(), 1..8)) {
        let output = format_table(&compact(&rules));
        let columns: Vec<usize> = output
            .lines()
            .map(|line| line.chars().take_while(|c| *c != '[').count())
            .collect();

        prop_assert!(columns.windows(2).all(|w| w[0] == w[1]));
    }
}
