//! rfmeterd — RF pulse-train decoder for 433 MHz sensor/doorbell receivers.
//!
//! Ingests raw pulse-train lines from a serial-attached microcontroller,
//! decodes them into typed sensor readings, and exposes those readings as
//! Prometheus metrics, doorbell push notifications, and a secondary gRPC
//! ingestion endpoint.

mod config;
mod dispatcher;
mod error;
mod grpc;
mod metrics;
mod protocols;
mod pulse;
mod push;
mod serial;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tonic::transport::Server as GrpcServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Args, Config};
use dispatcher::Dispatcher;
use metrics::Metrics;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rfmeterd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    tracing::info!("starting rfmeterd v{VERSION}");

    let args = Args::parse();
    let config_path = args.config_path();
    let config = Arc::new(Config::load_from_path(&config_path)?);
    let config_dir = config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    std::fs::create_dir_all(&config_dir)?;

    let shutdown = CancellationToken::new();
    let tracker = TaskTracker::new();

    let metrics = Arc::new(Metrics::new()?);

    let push_worker = push::PushWorker::new(
        &config_dir,
        config.push.fcm_token.clone(),
        config.push.debounce_seconds,
    );
    let push_handle = push_worker.spawn(shutdown.clone());

    let (line_tx, line_rx) = tokio::sync::mpsc::channel::<String>(64);

    // Serial reader task.
    {
        let device = args.device.clone();
        let baud_rate = config.general.baud_rate;
        let shutdown = shutdown.clone();
        tracker.spawn(async move {
            if let Err(e) = serial::run(&device, baud_rate, line_tx, shutdown).await {
                tracing::error!(error = %e, "serial reader task exited with an error");
            }
        });
    }

    // Decoder/dispatcher task: the pipeline's single consumer.
    {
        let dispatcher = Dispatcher::new(Arc::clone(&metrics), Arc::clone(&config), push_handle);
        tracker.spawn(dispatcher::run(dispatcher, line_rx));
    }

    // Metrics HTTP server.
    {
        let addr = args.metrics_listen_addr.clone();
        let router = metrics::router(Arc::clone(&metrics));
        let shutdown = shutdown.clone();
        tracker.spawn(async move {
            match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => {
                    tracing::info!(%addr, "metrics endpoint listening");
                    if let Err(e) = axum::serve(listener, router)
                        .with_graceful_shutdown(shutdown.cancelled_owned())
                        .await
                    {
                        tracing::error!(error = %e, "metrics server exited with an error");
                    }
                }
                Err(e) => tracing::error!(error = %e, %addr, "failed to bind metrics listener"),
            }
        });
    }

    // Push-registration HTTP server.
    {
        let addr = args.push_listen_addr.clone();
        let router = push::router(&config_dir);
        let shutdown = shutdown.clone();
        tracker.spawn(async move {
            match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => {
                    tracing::info!(%addr, "push registration endpoint listening");
                    if let Err(e) = axum::serve(listener, router)
                        .with_graceful_shutdown(shutdown.cancelled_owned())
                        .await
                    {
                        tracing::error!(error = %e, "push registration server exited with an error");
                    }
                }
                Err(e) => tracing::error!(error = %e, %addr, "failed to bind push registration listener"),
            }
        });
    }

    // gRPC sensor ingestion server.
    {
        let addr = args.grpc_listen_addr.parse()?;
        let service = grpc::SensorReportingServer::new(Arc::clone(&metrics), Arc::clone(&config)).into_service();
        let shutdown = shutdown.clone();
        tracker.spawn(async move {
            tracing::info!(%addr, "gRPC sensor ingestion listening");
            if let Err(e) = GrpcServer::builder()
                .add_service(service)
                .serve_with_shutdown(addr, shutdown.cancelled_owned())
                .await
            {
                tracing::error!(error = %e, "gRPC server exited with an error");
            }
        });
    }

    tracker.close();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
    tracker.wait().await;
    tracing::info!("rfmeterd shut down cleanly");

    Ok(())
}
