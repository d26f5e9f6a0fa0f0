use std::collections::HashMap;
use std::net::IpAddr;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct BackendStatus {
    pub address: String,
    pub healthy: bool,
}

#[derive(Serialize)]
pub struct CacheStats {
    pub entries: usize,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Current health flag per configured backend, in configuration order.
pub async fn get_backends(State(state): State<AdminState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .backends
        .health_snapshot()
        .into_iter()
        .map(|(addr, healthy)| BackendStatus {
            address: addr.to_string(),
            healthy,
        })
        .collect();

    Json(statuses)
}

/// Client IP → last answered request, unix seconds.
pub async fn get_clients(State(state): State<AdminState>) -> Json<HashMap<IpAddr, u64>> {
    Json(state.registry.snapshot())
}

/// Cache occupancy.
pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheStats> {
    Json(CacheStats {
        entries: state.cache.len(),
    })
}
