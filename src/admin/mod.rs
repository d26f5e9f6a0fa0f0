//! Admin read API.
//!
//! The stable interface external reporting tools (the dashboard, the CLI)
//! consume instead of sharing process memory with the dispatcher. Read-only
//! by construction: every route is a GET over a snapshot.
//!
//! There is no authentication layer; the API binds to loopback by default.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::sync::broadcast;

use crate::cache::ResponseCache;
use crate::load_balancer::pool::BackendPool;
use crate::registry::ActiveClientRegistry;

use self::handlers::*;

/// Shared state behind the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub backends: Arc<BackendPool>,
    pub cache: Arc<ResponseCache>,
    pub registry: Arc<ActiveClientRegistry>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .route("/admin/clients", get(get_clients))
        .route("/admin/cache", get(get_cache))
        .with_state(state)
}

/// Serve the admin API until shutdown is signalled.
pub async fn run(state: AdminState, bind_address: String, mut shutdown: broadcast::Receiver<()>) {
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind admin API");
            return;
        }
    };

    tracing::info!(address = %bind_address, "Admin API listening");

    let router = setup_admin_router(state);
    let shutdown_fut = async move {
        let _ = shutdown.recv().await;
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_fut)
        .await
    {
        tracing::error!(error = %e, "Admin API server error");
    }
}
