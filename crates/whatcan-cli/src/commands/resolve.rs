//! Resolve command - list a user's effective permissions per namespace.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::debug;
use whatcan_config::{OutputFormat, WhatcanConfig};
use whatcan_rbac::{MemoryStore, NamespaceReport, PermissionResolver, RuleRow};

use crate::style::{print_namespace_header, print_rule_table, print_warn};

/// Inputs after CLI flags have been merged over configuration.
#[derive(Debug)]
pub struct ResolveArgs {
    pub user: String,
    pub namespaces: Vec<String>,
    pub all_namespaces: bool,
    pub snapshot: Option<PathBuf>,
    pub output: Option<OutputFormat>,
    pub parallel: bool,
}

/// JSON shape of one namespace's permissions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceJson<'a> {
    namespace: &'a str,
    rules: Vec<RuleRow>,
    warnings: Vec<String>,
}

pub fn run(args: ResolveArgs, config: &WhatcanConfig) -> Result<()> {
    let Some(snapshot) = args.snapshot.or_else(|| config.store.snapshot.clone()) else {
        bail!("No RBAC snapshot configured: pass --snapshot, set WHATCAN_SNAPSHOT or store.snapshot");
    };

    let store = MemoryStore::load(&snapshot)
        .with_context(|| format!("Failed to load RBAC snapshot {}", snapshot.display()))?;
    let resolver = PermissionResolver::new(store);

    let namespaces = if args.all_namespaces {
        resolver.all_namespaces()?
    } else {
        args.namespaces
    };
    debug!(user = %args.user, namespaces = ?namespaces, "Resolving permissions");

    let reports = if args.parallel || config.resolve.parallel {
        resolver.resolve_permissions_parallel(&args.user, &namespaces)?
    } else {
        resolver.resolve_permissions(&args.user, &namespaces)?
    };

    match args.output.unwrap_or(config.output.format) {
        OutputFormat::Text => print_text(&reports),
        OutputFormat::Table => print_tables(&reports),
        OutputFormat::Json => print_json(&reports)?,
    }

    Ok(())
}

fn print_warnings(report: &NamespaceReport) {
    for warning in &report.warnings {
        print_warn(&format!(
            "Failed to resolve all rules in namespace '{}': {warning}",
            report.namespace
        ));
    }
}

fn print_text(reports: &[NamespaceReport]) {
    for report in reports {
        print_namespace_header(&report.namespace);
        print_warnings(report);
        print!("{}", report.render());
    }
}

fn print_tables(reports: &[NamespaceReport]) {
    for report in reports {
        print_namespace_header(&report.namespace);
        print_warnings(report);
        print_rule_table(&report.table.rows());
    }
}

fn print_json(reports: &[NamespaceReport]) -> Result<()> {
    reports.iter().for_each(print_warnings);

    let documents: Vec<NamespaceJson<'_>> = reports
        .iter()
        .map(|report| NamespaceJson {
            namespace: &report.namespace,
            rules: report.table.rows(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&documents).context("Failed to encode permissions")?;
    println!("{json}");
    Ok(())
}
