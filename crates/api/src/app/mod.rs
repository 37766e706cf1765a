//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: ledger wiring (store, config)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use payledger_infra::{ConfigError, LedgerConfig};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: LedgerConfig) -> Result<Router, ConfigError> {
    Ok(build_router(Arc::new(services::build_services(config)?)))
}

/// Router over already-wired services.
pub fn build_router(services: Arc<services::AppServices>) -> Router {
    // Ledger routes: require a resolved caller.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn(middleware::caller_middleware)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
