//! RunIQ dev tools
//!
//! Main entry point for the `runiq` CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{serve, token};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// RunIQ dev tools - local CORS proxy and Strava token exchange
#[derive(Parser)]
#[command(name = "runiq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve static files and proxy /api/anthropic to the Anthropic API
    Serve(serve::ServeArgs),

    /// Exchange a Strava authorization code for an access token
    Token(token::TokenArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console only; RUST_LOG takes precedence over the built-in filter.
    let filter = if cli.verbose {
        "runiq=debug,runiq_proxy=debug,runiq_oauth=debug,runiq_config=debug,tower_http=debug,info"
    } else {
        "runiq=info,runiq_proxy=info,runiq_oauth=info,warn"
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Token(args) => token::run(args, &ctx).await,
    }
}
