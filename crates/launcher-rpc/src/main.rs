//! Launcher RPC Server - JSON-RPC bridge to the native shell.
//!
//! Exposes `showFileInNativeFileExplorer`, `launchFile` and
//! `getSupportedApplications` over HTTP for a host process. All calls run on
//! one dispatcher thread that owns the OS shell state.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use launcher_core::{current_platform, DispatcherOptions, DispatcherWorker, LauncherConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "launcher-rpc")]
#[command(about = "JSON-RPC server for the native file launcher")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Fail `launchFile` when `applicationPath` was not in the latest listing
    #[arg(long)]
    strict_app_match: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the port handshake.
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!(
        "Starting {} on {} (channel {})",
        LauncherConfig::APP_NAME,
        current_platform(),
        LauncherConfig::CHANNEL_NAME
    );

    let options = DispatcherOptions {
        strict_application_match: args.strict_app_match,
    };
    let dispatcher = DispatcherWorker::spawn_native(options).await?;

    let addr = server::start_server(dispatcher, &args.host, args.port).await?;

    // Print port for the host process to read (intentional stdout for IPC)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
