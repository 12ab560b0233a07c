// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! anirename web surface
//!
//! Standalone server for the health check and filename inference API.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use anirename::config::AppConfig;
use anirename::engine::InferenceEngine;
use anirename::Result;

#[derive(Parser, Debug)]
#[command(name = "anirename-web")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "anirename health check and inference API server")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on (PORT env var is honoured too)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("anirename web v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_with_env(&args.config)?;

    // CLI flags beat both the file and PORT
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }

    anirename::web::start_server(InferenceEngine::new(), config).await
}
