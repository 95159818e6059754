//! HTTP API Layer
//!
//! REST surface for the claims adjudication engine, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: submit and fetch claims, health checks
//! - **Middleware**: JWT authentication, audit logging
//! - **DTOs**: Request/Response bodies with input validation
//! - **Error Handling**: Consistent error responses that separate retryable
//!   storage faults and timeouts from validation failures
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let engine = Arc::new(ClaimAdjudicationEngine::new(ledger, config.adjudication()));
//! let app = create_router(engine, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimAdjudicationEngine, LedgerStore};

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{claims, health};

/// Application state shared across handlers
pub struct AppState<S: LedgerStore> {
    pub engine: Arc<ClaimAdjudicationEngine<S>>,
    pub config: ApiConfig,
}

impl<S: LedgerStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config.clone(),
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `engine` - Adjudication engine over the chosen ledger store
/// * `config` - API configuration
pub fn create_router<S: LedgerStore>(
    engine: Arc<ClaimAdjudicationEngine<S>>,
    config: ApiConfig,
) -> Router {
    let state = AppState {
        engine,
        config: config.clone(),
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check::<S>));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim::<S>))
        .route("/:id", get(claims::get_claim::<S>));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
