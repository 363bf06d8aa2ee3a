//! CLI entry point for inkpost

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(version)]
#[command(about = "A small Markdown blog server with in-memory comments", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
    #[arg(short, long)]
    cwd: Option<PathBuf>,

    /// Override the configured host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpost=debug,info"
    } else {
        "inkpost=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot resolve current directory")?,
    };

    let mut site = inkpost::Site::new(&base_dir)?;
    if let Some(host) = cli.host {
        site.config.host = host;
    }
    if let Some(port) = cli.port {
        site.config.port = port;
    }

    inkpost::server::start(&site)
        .await
        .context("server failed to start")
}
