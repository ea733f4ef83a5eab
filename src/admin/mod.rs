//! Runtime registration API.
//!
//! Served on its own bind address, separate from proxied traffic, so the
//! catch-all proxy route never shadows it. Lets an operator register and
//! deregister backends while the gateway is running; the health monitor
//! picks new entries up on its next tick.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::load_balancer::registry::ServiceRegistry;

/// Request body for register/deregister calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub host: String,
    pub port: u16,
}

/// One entry in the service listing.
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub host: String,
    pub port: u16,
    pub health: &'static str,
    pub total_requests: u64,
    pub avg_response_time_ms: f64,
}

/// Build the admin router over a shared registry handle.
pub fn admin_router(registry: Arc<ServiceRegistry>) -> Router {
    Router::new()
        .route(
            "/admin/services",
            get(list_services)
                .post(register_service)
                .delete(deregister_service),
        )
        .with_state(registry)
}

async fn list_services(State(registry): State<Arc<ServiceRegistry>>) -> Json<Vec<ServiceStatus>> {
    let services = registry
        .all_services()
        .into_iter()
        .map(|s| {
            let stats = s.stats();
            ServiceStatus {
                host: s.host.clone(),
                port: s.port,
                health: s.health().as_str(),
                total_requests: stats.total_requests,
                avg_response_time_ms: stats.avg_response_time_ms(),
            }
        })
        .collect();
    Json(services)
}

async fn register_service(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(addr): Json<ServiceAddress>,
) -> Response {
    match registry.register(&addr.host, addr.port) {
        Ok(()) => {
            tracing::info!(host = %addr.host, port = addr.port, "Service registered via admin API");
            StatusCode::CREATED.into_response()
        }
        Err(e) => {
            tracing::warn!(host = %addr.host, port = addr.port, error = %e, "Rejected service registration");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn deregister_service(
    State(registry): State<Arc<ServiceRegistry>>,
    Json(addr): Json<ServiceAddress>,
) -> StatusCode {
    registry.deregister(&addr.host, addr.port);
    tracing::info!(host = %addr.host, port = addr.port, "Service deregistered via admin API");
    StatusCode::NO_CONTENT
}
