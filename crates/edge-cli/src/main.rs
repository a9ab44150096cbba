//! # evm-edge
//!
//! Runs EVM edge-case conformance suites against a JSON-RPC node.
//!
//! ## Usage
//!
//! ```bash
//! # Run everything against the local Hedera node
//! evm-edge run
//!
//! # One suite against Besu, pending cases included, JSON report
//! evm-edge --network besu_local --json run --suite errors --include-pending
//!
//! # Inspect
//! evm-edge list
//! evm-edge networks
//! evm-edge query chain-id
//! evm-edge query balance 0x0000000000000000000000000000000000000320
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// EVM edge-case conformance runner
#[derive(Parser, Debug)]
#[command(name = "evm-edge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Network profile to use
    #[arg(long, global = true)]
    network: Option<String>,

    /// RPC endpoint URL, replacing the profile's
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run conformance suites
    Run(commands::run::RunArgs),
    /// List suites and cases
    List,
    /// List network profiles
    Networks,
    /// Query chain state
    #[command(subcommand)]
    Query(commands::query::QueryCommand),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the default network
        #[arg(long)]
        set_network: Option<String>,
        /// Set the artifacts directory
        #[arg(long)]
        set_artifacts: Option<String>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let stored = Config::load();

    // Flags apply to this invocation; `config` edits only what is stored.
    let mut config = stored.clone();
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(rpc_url) = cli.rpc_url {
        let network = config.network.clone();
        config.override_url(&network, rpc_url);
    }

    let result = match cli.command {
        Commands::Run(args) => args.execute(&config, cli.json).await,
        Commands::List => commands::list::execute(cli.json),
        Commands::Networks => commands::networks::execute(&config, cli.json),
        Commands::Query(cmd) => cmd.execute(&config, cli.json).await,
        Commands::Config {
            show,
            set_network,
            set_artifacts,
        } => handle_config(stored, show, set_network, set_artifacts, cli.json),
    };

    if let Err(e) = result {
        if cli.json && !matches!(e, CliError::CasesFailed { .. }) {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn handle_config(
    mut config: Config,
    show: bool,
    set_network: Option<String>,
    set_artifacts: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(network) = set_network {
        config.profile(&network)?;
        config.network = network;
        modified = true;
    }

    if let Some(dir) = set_artifacts {
        config.artifacts_dir = dir.into();
        modified = true;
    }

    if modified {
        let path = config.save()?;
        Output::new(json)
            .field("status", "saved")
            .field("path", path.display().to_string())
            .line(format!("Configuration saved to {}", path.display()))
            .print();
    } else if show {
        let path = Config::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let overrides: Vec<&str> = config.networks.keys().map(String::as_str).collect();
        Output::new(json)
            .field("path", path.clone())
            .field("network", config.network.clone())
            .field("artifacts_dir", config.artifacts_dir.display().to_string())
            .field("configured_networks", overrides.clone())
            .line(format!("Config:        {}", path))
            .line(format!("Network:       {}", config.network))
            .line(format!("Artifacts:     {}", config.artifacts_dir.display()))
            .line(format!("Overrides for: {}", overrides.join(", ")))
            .print();
    } else {
        Output::new(json)
            .field(
                "message",
                "Use --show to display config, or --set-network/--set-artifacts to modify",
            )
            .line("Use --show to display config, or --set-network/--set-artifacts to modify")
            .print();
    }

    Ok(())
}
