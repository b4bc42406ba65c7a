// ABOUTME: Daily Cost API server binary
// ABOUTME: Loads configuration, initializes logging, opens storage, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

//! # Daily Cost API Server Binary
//!
//! Starts the expense tracking API with WeChat QR login, `SQLite` storage,
//! and an in-memory or Redis cache.

use anyhow::Result;
use clap::Parser;
use daily_cost_server::{
    config::environment::ServerConfig, logging, resources::ServerResources, server,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "daily-cost-server")]
#[command(about = "Daily Cost API - personal expense tracking with per-day cost statistics")]
pub struct Args {
    /// Override bind address
    #[arg(long)]
    host: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Daily Cost API");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::initialize(config).await?);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    info!("Server stopped");
    Ok(())
}
