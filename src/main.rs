//! Spin Cycle CLI
//!
//! Entry point for the `spinc` command-line tool.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spincycle::spinc::ConfigError;
use spincycle::{Find, HttpRmClient, SpincConfig};

#[derive(Parser)]
#[command(name = "spinc")]
#[command(about = "Spin Cycle user interface", version)]
struct Cli {
    /// Path to config file (default: ~/.config/spinc/spinc.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Request Manager address
    #[arg(long, env = "SPINC_ADDR")]
    addr: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find and filter requests
    Find {
        /// Filters as filter=value (type, states, user, since, until,
        /// limit, offset)
        filters: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };
    let addr = cli.addr.unwrap_or_else(|| config.addr.clone());

    match cli.command {
        Commands::Find { filters } => run_find(&addr, &config, &filters),
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("spincycle=debug,spinc=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SpincConfig, ConfigError> {
    match path {
        Some(path) => SpincConfig::load(path),
        None => SpincConfig::load_default(),
    }
}

fn run_find(addr: &str, config: &SpincConfig, filters: &[String]) {
    let find = match Find::prepare(filters) {
        Ok(find) => find,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprint!("{}", Find::help());
            process::exit(1);
        }
    };

    let client = match HttpRmClient::new(addr, config.timeout()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = find.run(&client, &mut io::stdout()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
