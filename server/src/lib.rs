//! Documentation of the GNACOPS membership backend.
//!
//!
//!
//! # General Infrastructure
//! - Registration portal talks to this service over JSON/HTTP
//! - This service talks to Redis, which owns all durable state
//! - Redis is the source of the one hard guarantee in the system: serial
//!   allocation goes through `HINCRBY`, so two concurrent registrations can
//!   never be issued the same membership identifier
//! - The expander job (separate crate) shares the same Redis instance
//!
//!
//!
//! # Identifier Issuance
//!
//! **Goal**: every membership record gets exactly one permanent identifier of
//! the form `GNC/{tier}/{region}/{serial}`.
//!
//! - Category and region names resolve through the registry code tables
//! - An unrecognized category rejects the registration before any counter
//!   state is touched
//! - An unrecognized region files under code `00` and logs a warning; the
//!   registration still goes through
//! - Serials are per tier. A serial consumed by a registration that fails
//!   later in the pipeline is a permanent gap, never reused
//!
//!
//!
//! # Notes
//!
//! ## Redis
//! In theory the counter could live in process memory with a durable log
//! behind it. But the service must stay correct when more than one instance
//! is running, and Redis already queues commands so increments are atomic
//! without any coordination on our side. One `HINCRBY` per registration is
//! as cheap as this gets.
//!
//! The member hash is written with `HSETNX`, so a record can never be
//! silently overwritten after issuance.
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod allocator;
pub mod config;
pub mod database;
pub mod error;
pub mod members;
pub mod registration;
pub mod routes;
pub mod state;

use routes::{member_handler, register_handler};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/register", post(register_handler))
        .route("/members/{*id}", get(member_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
