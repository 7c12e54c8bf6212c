//! kubectl-what_can_i: effective RBAC permissions of a Rancher user.
//!
//! # Quick Start
//!
//! ```bash
//! # Export the RBAC objects once
//! kubectl-what_can_i --snapshot ./rbac.json --user u-abc12 -n team-a
//!
//! # Every namespace, as JSON
//! WHATCAN_SNAPSHOT=./rbac.json kubectl-what_can_i --user u-abc12 -A -o json
//! ```

mod commands;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use whatcan_config::{ConfigLoader, OutputFormat};

use crate::commands::resolve::ResolveArgs;

/// List what a user can do, per namespace, from RBAC bindings.
#[derive(Parser)]
#[command(name = "kubectl-what_can_i")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// User to resolve (Rancher user object name, e.g. u-abc12).
    #[arg(short, long)]
    user: String,

    /// Namespace to resolve; repeat or comma-separate. Default: cluster scope.
    #[arg(short = 'n', long = "namespace", value_delimiter = ',')]
    namespaces: Vec<String>,

    /// Resolve every namespace known to the snapshot.
    #[arg(short = 'A', long, conflicts_with = "namespaces")]
    all_namespaces: bool,

    /// JSON snapshot of Users, UserAttributes, Roles and Bindings.
    #[arg(long, env = "WHATCAN_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum)]
    output: Option<OutputArg>,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Resolve namespaces concurrently.
    #[arg(long)]
    parallel: bool,

    /// Directory holding whatcan.toml and whatcan.local.toml.
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    Text,
    Json,
    Table,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
            OutputArg::Table => OutputFormat::Table,
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            style::print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(dir) = &cli.config_dir {
        loader = loader.with_project_dir(dir);
    }
    let config = loader.load()?;

    style::set_no_color(cli.no_color || !config.output.color);

    commands::resolve::run(
        ResolveArgs {
            user: cli.user,
            namespaces: cli.namespaces,
            all_namespaces: cli.all_namespaces,
            snapshot: cli.snapshot,
            output: cli.output.map(OutputFormat::from),
            parallel: cli.parallel,
        },
        &config,
    )
}
