//! envctl CLI Entry Point
//!
//! This is the main binary entry point for envctl.
//! It provides five subcommands:
//! - `list` - List environments (optionally including disabled ones)
//! - `names` - List environment names only
//! - `default` - Print the default environment name
//! - `info` - Show one environment's full descriptor
//! - `tools` - List the tools the MCP server exposes
//!
//! All output to stdout is JSON-only. Logs go to stderr (`RUST_LOG` controls the level).

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use envctl::{
    resolve_config, EnvctlError, EnvironmentClient, EnvironmentDescriptor, EnvironmentListing,
    Metadata, PartialConfig, Report, ToolDescriptor,
};

/// envctl - query database environments from a MySQL MCP server
#[derive(Parser)]
#[command(name = "envctl")]
#[command(about = "Query database environments exposed by a MySQL MCP server over JSON-RPC")]
#[command(version)]
struct Cli {
    /// MCP endpoint URL [default: http://localhost:8080/mcp]
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Per-request timeout in milliseconds [default: 30000]
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Config file to use instead of .envctl/config.json or the global config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List environments
    List {
        /// Include disabled environments
        #[arg(long)]
        include_disabled: bool,
    },

    /// List environment names in server order
    Names {
        /// Include disabled environments
        #[arg(long)]
        include_disabled: bool,
    },

    /// Print the default environment name
    Default,

    /// Show the full descriptor of one environment (disabled ones included)
    Info {
        /// Environment name
        name: String,
    },

    /// List tools exposed by the MCP server
    Tools,
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Names { .. } => "names",
            Self::Default => "default",
            Self::Info { .. } => "info",
            Self::Tools => "tools",
        }
    }

    /// Echo the command's arguments into report metadata
    fn describe(&self, meta: Metadata) -> Metadata {
        match self {
            Self::List { include_disabled } | Self::Names { include_disabled } => {
                meta.include_disabled(*include_disabled)
            }
            Self::Info { name } => meta.environment(name.as_str()),
            Self::Default | Self::Tools => meta,
        }
    }
}

/// `data` section of a successful report
#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Listing(EnvironmentListing),
    Names(Vec<String>),
    Default(Option<String>),
    Info(Box<EnvironmentDescriptor>),
    Tools(Vec<ToolDescriptor>),
}

impl Outcome {
    fn items(&self) -> Option<usize> {
        match self {
            Self::Listing(listing) => Some(listing.environments.len()),
            Self::Names(names) => Some(names.len()),
            Self::Tools(tools) => Some(tools.len()),
            Self::Default(_) | Self::Info(_) => None,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "envctl=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("envctl: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command; `Ok(false)` means an error report was printed
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let started = Instant::now();
    let command = cli.command.name();
    let overrides = PartialConfig { endpoint: cli.endpoint.clone(), timeout_ms: cli.timeout_ms };

    let config = match resolve_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(err) => return print_failure("", cli, &err, Metadata::since(started, 0)),
    };
    debug!(endpoint = %config.endpoint, timeout_ms = config.timeout_ms, command, "resolved configuration");

    let client = match EnvironmentClient::from_config(&config) {
        Ok(client) => client,
        Err(err) => return print_failure(&config.endpoint, cli, &err, Metadata::since(started, 0)),
    };

    let outcome = execute(&client, &cli.command);
    let mut meta = cli
        .command
        .describe(Metadata::since(started, client.transport().last_request_id()));
    if let Ok(items) = outcome.as_ref().map(Outcome::items) {
        meta.items_returned = items;
    }

    let ok = outcome.is_ok();
    print_json(&Report::from_result(&config.endpoint, command, outcome, meta))?;
    Ok(ok)
}

fn execute(client: &EnvironmentClient, command: &Commands) -> envctl::Result<Outcome> {
    match command {
        Commands::List { include_disabled } => {
            client.list_environments(*include_disabled).map(Outcome::Listing)
        }
        Commands::Names { include_disabled } => {
            client.environment_names(*include_disabled).map(Outcome::Names)
        }
        Commands::Default => client.default_environment_name().map(Outcome::Default),
        Commands::Info { name } => {
            client.environment_info(name).map(|env| Outcome::Info(Box::new(env)))
        }
        Commands::Tools => client.list_tools().map(Outcome::Tools),
    }
}

fn print_failure(endpoint: &str, cli: &Cli, err: &EnvctlError, meta: Metadata) -> anyhow::Result<bool> {
    let meta = cli.command.describe(meta);
    print_json(&Report::failure(endpoint, cli.command.name(), err, meta))?;
    Ok(false)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string(value).context("Could not serialize output")?;
    println!("{text}");
    Ok(())
}
