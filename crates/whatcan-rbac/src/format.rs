//! Text rendering of a [`RuleTable`].

use std::collections::BTreeSet;
use std::fmt::Write as _;

use whatcan_types::WILDCARD;

use crate::compact::RuleTable;

/// Verbs as displayed: `["*"]` alone when the wildcard verb is present,
/// otherwise every verb in lexical order.
pub fn display_verbs(verbs: &BTreeSet<String>) -> Vec<&str> {
    if verbs.contains(WILDCARD) {
        vec![WILDCARD]
    } else {
        verbs.iter().map(String::as_str).collect()
    }
}

/// Renders one line per key: `<resourceName> <resource> <apiGroup>  [ verbs ]`.
///
/// Each key column is padded to one more than its widest cell, so the verb
/// brackets line up on every row. The output depends only on the table
/// contents.
///
/// # Examples
///
/// ```
/// use whatcan_rbac::compact::compact;
/// use whatcan_rbac::format::format_table;
/// use whatcan_types::PolicyRule;
///
/// let table = compact(&[
///     PolicyRule::new(["list", "get"]).with_api_groups([""]).with_resources(["pods"]),
///     PolicyRule::new(["*"]).with_api_groups(["apps"]).with_resources(["deployments"]),
/// ]);
///
/// assert_eq!(
///     format_table(&table),
///     "* deployments apps  [ * ]\n\
///      * pods              [ get list ]\n"
/// );
/// ```
pub fn format_table(table: &RuleTable) -> String {
    let mut widths = [0usize; 3];
    for (key, _) in table.iter() {
        let cells = [&key.resource_name, &key.resource, &key.api_group];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let [name_w, resource_w, group_w] = widths.map(|w| w + 1);

    let mut out = String::new();
    for (key, verbs) in table.iter() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{:<name_w$}{:<resource_w$}{:<group_w$} [",
            key.resource_name, key.resource, key.api_group
        );
        for verb in display_verbs(verbs) {
            out.push(' ');
            out.push_str(verb);
        }
        out.push_str(" ]\n");
    }
    out
}
