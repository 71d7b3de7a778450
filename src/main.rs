use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use payment_sentinel::anomaly::AnomalyEngine;
use payment_sentinel::config::{Config, LoggingConfig};
use payment_sentinel::import::load_payments;
use payment_sentinel::pipeline::AssessmentPipeline;

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Logging depends on config, so config errors surface through color-eyre
    let config = Config::load(&config_path)?;
    init_logging(&config.logging);

    tracing::info!(
        suspicious_modes = ?config.anomaly_detection.suspicious_payment_modes,
        "Configuration loaded from {}",
        config_path
    );

    let engine = AnomalyEngine::new(config.anomaly_detection.clone());

    // One-shot batch run over an exported payments file
    if let Some(ref path) = config.import.path {
        let payments = load_payments(path)?;
        let report = AssessmentPipeline::new(engine.clone()).run(&payments);
        let json = serde_json::to_string_pretty(&report)?;

        match config.import.output {
            Some(ref output) => {
                std::fs::write(output, json)
                    .map_err(|e| eyre::eyre!("Failed to write report '{}': {}", output, e))?;
                tracing::info!(
                    payments = report.summary.total_payments,
                    flagged = report.summary.flagged_payments,
                    "Report written to {}",
                    output
                );
            }
            None => println!("{}", json),
        }
    }

    if !config.api.enabled {
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let mut server = {
        let shutdown = shutdown.clone();
        let pipeline = AssessmentPipeline::new(engine);
        let host = config.api.host.clone();
        let port = config.api.port;
        let max_batch_size = config.api.max_batch_size;
        tokio::spawn(async move {
            payment_sentinel::api::serve(pipeline, &host, port, max_batch_size, shutdown).await
        })
    };

    tracing::info!("Payment Sentinel running. Press Ctrl+C to stop.");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown signal received, stopping API server...");
            shutdown.cancel();
            server.await??;
        }
        result = &mut server => {
            // Only reached when the server exits on its own, e.g. bind failure
            result??;
        }
    }

    tracing::info!("Payment Sentinel stopped gracefully");
    Ok(())
}
