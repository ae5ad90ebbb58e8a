//! notify-history: desktop notification history recorder for Linux.

mod config;
mod history;
mod listener;
mod notifier;
mod record;
mod report;
mod service;
mod tray;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "notify-history", about = "Desktop notification history recorder")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History backend: sqlite (persistent) or memory (bounded, volatile)
    #[arg(short, long)]
    backend: Option<String>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (zbus is chatty at debug)
    let filter = if args.verbose {
        EnvFilter::new("debug,zbus=info")
    } else {
        EnvFilter::new("info,zbus=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("notify-history starting");

    let mut config = config::Config::load(args.config.as_deref());
    if let Some(backend) = &args.backend {
        config.history.backend = config::HistoryBackendKind::from_str(backend)
            .with_context(|| format!("Unknown history backend: {backend}"))?;
    }
    info!("History backend: {:?}", config.history.backend);

    let history = history::History::open(&config.history)?;
    let notifier = notifier::FallbackNotifier::new(&config.notifier, &config.tray.icon);
    let mut service = service::HistoryService::new(history, Box::new(notifier));

    // Menu actions: tray thread -> service loop
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    if config.tray.enabled {
        let tray = tray::HistoryTray::new(&config.tray, action_tx.clone()).spawn();
        service.attach_tray(tray);
    } else {
        info!("Tray disabled, recording only");
    }

    // Captured notifications: bus listener task -> service loop
    let (record_tx, record_rx) = mpsc::channel(64);
    let listener_task = tokio::spawn(async move {
        if let Err(e) = listener::BusListener::new(record_tx).run().await {
            error!("Notification listener failed: {e:#}");
        }
    });

    service.run(record_rx, action_rx).await;

    listener_task.abort();
    drop(action_tx);
    service.shutdown()?;

    info!("notify-history stopped");
    Ok(())
}
