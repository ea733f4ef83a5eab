//! Periodic health probing of registered backends.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::load_balancer::backend::BackendService;
use crate::load_balancer::registry::ServiceRegistry;

/// Background task that probes every registered backend on a fixed interval
/// and updates health flags in the registry.
///
/// Probe failures are contained here: they become state flags and warning
/// logs, never errors propagated upward.
pub struct HealthMonitor {
    registry: Arc<ServiceRegistry>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<ServiceRegistry>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            registry,
            config,
            client,
        }
    }

    /// Run until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Health monitor disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_secs = self.config.timeout_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every registered backend. Probes run concurrently so a slow or
    /// hanging backend cannot delay the others in the same tick.
    pub async fn probe_all(&self) {
        let services = self.registry.all_services();
        join_all(services.into_iter().map(|s| self.probe(s))).await;
    }

    async fn probe(&self, service: Arc<BackendService>) {
        let uri = format!("http://{}{}", service.address(), self.config.path);

        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "lb-gateway-health-probe")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(service = %service.address(), error = %e, "Failed to build health probe request");
                self.registry.mark_health(&service.host, service.port, false);
                return;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let healthy = match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(
                        service = %service.address(),
                        status = %response.status(),
                        "Service health check failed: non-success status"
                    );
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    service = %service.address(),
                    error = %e,
                    "Service health check failed: connection error"
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    service = %service.address(),
                    timeout_secs = self.config.timeout_secs,
                    "Service health check failed: timeout"
                );
                false
            }
        };

        // No-op if the entry was deregistered while the probe was in flight.
        self.registry.mark_health(&service.host, service.port, healthy);
    }
}
