//! Reference receiver for SSID logger events
//!
//! Accepts `POST /log` and prints each event; `GET /health` reports uptime.

use std::net::SocketAddr;

use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "ssid-receiver")]
#[command(about = "Test server that logs SSID change events")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("SSID receiver running on http://{}", addr);
    tracing::info!("Logging endpoint: http://{}/log", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, ssid_logger::receiver::build_router())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
