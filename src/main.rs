//! tx_relay - Real-time transfer relay
//!
//! ```text
//! ┌──────────┐  text frame  ┌─────────────┐  Record  ┌──────────────────┐
//! │  Client  │─────────────▶│ Broadcaster │─────────▶│ ConnectionManager│──▶ all clients
//! └──────────┘              │ (validate)  │          │    (fan-out)     │
//!       ▲     error reply   └─────────────┘          └──────────────────┘
//!       └──────────────────────────┘
//! ```

use std::sync::Arc;

use tx_relay::config::AppConfig;
use tx_relay::gateway::{self, state::AppState};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn main() {
    let env = get_env();
    if let Err(e) = run(&env) {
        eprintln!("❌ FATAL: {:#}", e);
        std::process::exit(1);
    }
}

fn run(env: &str) -> anyhow::Result<()> {
    let mut app_config = AppConfig::load(env)?;
    if let Some(port) = get_port_override() {
        app_config.server.port = port;
    }

    // Dropped at the end of `run`, after the server has stopped
    let _log_guard = tx_relay::logging::init_logging(&app_config);
    tracing::info!("Starting tx_relay in {} mode", env);

    let state = Arc::new(AppState::new(
        app_config.ws_url(),
        &app_config.server.public_dir,
    ));

    let rt = tokio::runtime::Runtime::new()?;
    if let Err(e) = rt.block_on(gateway::run_server(
        &app_config.server.host,
        app_config.server.port,
        state.clone(),
    )) {
        tracing::error!("Server error: {:#}", e);
        return Err(e);
    }

    tracing::info!(
        accepted = state.broadcaster.accepted(),
        "tx_relay stopped"
    );
    Ok(())
}
