//! Continuous proximity warning for two drones.
//!
//! Status lines go to stdout; diagnostics go to stderr via tracing.
//! Stops on Ctrl-C.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proximity_cli::Args;
use proximity_core::ProximityMonitor;
use proximity_link::MavlinkConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proximity_cli=info".parse()?)
                .add_directive("proximity_link=warn".parse()?),
        )
        .init();

    let thresholds = args.thresholds()?;
    tracing::info!(conn1 = %args.conn1, conn2 = %args.conn2, interval_ms = args.interval_ms, "Starting proximity monitor");
    let connector = MavlinkConnector::new(args.mavlink_config());

    println!("Connecting to {} and {}...", args.conn1, args.conn2);
    let mut monitor = ProximityMonitor::connect(&connector, &args.conn1, &args.conn2, thresholds)
        .await
        .with_context(|| format!("failed to open links {} and {}", args.conn1, args.conn2))?;

    println!(
        "Monitoring proximity (H < {} m and V < {} m)... Press Ctrl+C to stop.",
        thresholds.horizontal_m, thresholds.vertical_m
    );

    tokio::select! {
        _ = monitor.run(args.interval(), |report| {
            for line in report.status_lines() {
                println!("{line}");
            }
        }) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            println!("Stopping proximity monitor.");
        }
    }

    monitor.close().await;
    Ok(())
}
