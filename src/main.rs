// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use rotation_balancer::{
    config,
    load_balancer::{LoadBalancer, RoundRobinBalancer},
    proxy::Proxy,
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rotation_balancer=info".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "balancer.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let balancer = Arc::new(RoundRobinBalancer::new(config.backends.clone())?);
    let backends: Vec<String> = balancer.backends().iter().map(ToString::to_string).collect();
    info!(
        algorithm = balancer.name(),
        backends = %backends.join(", "),
        "Backend rotation ready"
    );

    let proxy = Arc::new(Proxy::new(balancer, config.on_backend_error));
    let handler = RequestHandler::new(proxy);

    let addr = config.listen.socket_addr()?;
    info!("Starting load balancer on {}", addr);

    let server = ServerBuilder::new(addr).with_handler(handler).bind().await?;

    tokio::select! {
        res = server.serve() => res?,
        _ = shutdown_signal() => {}
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, exiting without draining");
}
