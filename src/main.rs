//! # Main Entry Point
//!
//! Boots the workspace agent:
//! - Domain: Configuration, Action schema, Paths
//! - Infrastructure: Provider clients, Action executor
//! - Application: Plan orchestrator, Logging
//! - Interface: HTTP routes
//!
//! Shell commands from a plan run verbatim with the agent's privileges. Only expose the
//! agent to trusted callers and providers, inside an already isolated workspace.

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::planner::Orchestrator;
use crate::domain::config::AppConfig;
use crate::interface::http::{self, AppState};

#[derive(Parser)]
#[command(name = "workagent")]
#[command(about = "Turns prompts into workspace actions and runs them")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Address to bind the server to (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config_found = args.config.exists();
    let mut config = AppConfig::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // 2. Logging Setup
    let _guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", strings::logs::STARTING);
    if !config_found {
        tracing::info!("{}", strings::logs::config_missing(&args.config));
    }
    tracing::info!(
        "{}",
        strings::logs::workspace_root(&config.workspace.root, &config.workspace.app_dir)
    );

    // 3. Orchestrator (provider selection + executor)
    let orchestrator =
        Orchestrator::from_config(&config).context("Failed to initialize planner")?;
    tracing::debug!(instruction = orchestrator.system_instruction(), "planner instruction");
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    // 4. Serve
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("{}", strings::logs::listening(&addr.to_string()));

    axum::serve(listener, http::router(state)).await?;

    Ok(())
}
