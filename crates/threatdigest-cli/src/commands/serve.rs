use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use threatdigest_core::{
    api::{self, AppState},
    scheduler::SchedulerService,
    AppConfig, DigestPipeline,
};

/// Run the daily scheduler and the HTTP API until Ctrl+C
pub async fn run(config: AppConfig) -> Result<()> {
    let pipeline = Arc::new(DigestPipeline::from_config(&config)?);
    let scheduler = Arc::new(SchedulerService::from_config(pipeline, &config)?);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Setup signal handler for graceful shutdown
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx_clone.send(true);
    });

    let scheduler_task = {
        let scheduler = scheduler.clone();
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    println!("threatdigest serving on http://{}. Press Ctrl+C to stop.", addr);
    match scheduler.next_run_time() {
        Some(next) => println!(
            "  Next digest: {} ({})",
            next.format("%Y-%m-%d %H:%M %Z"),
            scheduler.status().schedule
        ),
        None => println!("  Daily schedule disabled"),
    }

    let served = api::serve(&addr, AppState::new(scheduler), shutdown_rx).await;

    // Stop the scheduler too if the server exited on its own
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task ended abnormally: {}", e);
    }

    served?;
    println!("Stopped.");
    Ok(())
}
