use crate::{config::Config, services::leaderboard::Leaderboard};
use dotenvy::dotenv;
use log::{error, info};
use std::{net::SocketAddr, process::ExitCode, sync::Arc};
use tokio::{net::TcpListener, signal};

mod config;
mod middleware;
mod routes;
mod services;
mod utils;

#[tokio::main]
async fn main() -> ExitCode {
    // Variables from a .env file are optional
    dotenv().ok();

    // Logging is not available until the config is loaded
    let config = match Config::from_env() {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Server misconfig: {err}");
            return ExitCode::FAILURE;
        }
    };

    utils::logging::setup(&config.logging);

    info!("Starting Leaderboard Relay v{}", config::VERSION);

    let leaderboard = match Leaderboard::new(&config.upstream) {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to create upstream client: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let addr = SocketAddr::new(config.host, config.port);
    let router = routes::router(Arc::new(config), Arc::new(leaderboard));

    let listener = match TcpListener::bind(addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind HTTP server on {}: {:?}", addr, err);
            return ExitCode::FAILURE;
        }
    };

    info!("Started HTTP server on {addr}");
    utils::logging::log_connection_urls(addr.ip(), addr.port());

    let shutdown = async {
        _ = signal::ctrl_c().await;
        info!("Shutting down...");
    };

    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("HTTP server stopped with error: {}", err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
