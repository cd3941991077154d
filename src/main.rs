//! Supply chain risk dashboard server
//!
//! Usage:
//!   ./target/release/supply_chain_risk [options]
//!
//! REST endpoints:
//!   GET /                          - Dashboard page
//!   GET /api/v1/health             - Health check
//!   GET /api/v1/dashboard?country= - Render plan (country defaults to All)
//!   GET /api/v1/countries          - Country selector options

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use supply_chain_risk::api::create_router;
use supply_chain_risk::config::DataArgs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "supply_chain_risk")]
#[command(about = "Serve the supply chain risk dashboard")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    #[command(flatten)]
    data: DataArgs,
}

fn print_banner(port: u16, data_dir: &std::path::Path) {
    println!("============================================================");
    println!("          SUPPLY CHAIN RISK MANAGEMENT DASHBOARD");
    println!("============================================================");
    println!();
    println!("  Dashboard: http://localhost:{}/", port);
    println!("  REST:      http://localhost:{}/api/v1/", port);
    println!("  Data dir:  {}", data_dir.display());
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/dashboard?country=  Render plan");
    println!("  GET /api/v1/countries           Country options");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = args.data.into_config();

    print_banner(args.port, config.data.data_dir());

    if !config.data.order_path().is_file() || !config.data.reference_path().is_file() {
        warn!(
            "Data files not found under {}; the dashboard will show a warning until they exist",
            config.data.data_dir().display()
        );
    }
    if config.seed.is_none() {
        info!("Map sample is unseeded and changes on every refresh");
    }

    let app = create_router(config);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    info!("Starting dashboard server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
