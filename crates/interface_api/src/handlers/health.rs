//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use core_kernel::{HealthCheckResult, HealthCheckable};
use domain_claims::LedgerStore;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<HealthCheckResult>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger: None,
    })
}

/// Readiness check (includes the ledger store)
pub async fn readiness_check<S: LedgerStore>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    let ledger = state.engine.store().health_check().await;
    let (code, status) = if ledger.is_operational() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ledger: Some(ledger),
        }),
    )
}
