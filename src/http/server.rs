//! Gateway server and the request-proxying path.
//!
//! # Responsibilities
//! - Build the axum router with middleware (request ID, tracing)
//! - Spawn the health monitor next to the accept loop
//! - Per request: buffer the body, select a backend, forward, stream back
//! - Convert selection and transport failures to 502/503/504 JSON bodies
//!
//! # Design Decisions
//! - No backend-level retries: a single failure surfaces directly
//! - Latency is measured at response-header arrival (time to first byte)
//!   and fed to the strategy before the body is streamed
//! - Client disconnects drop the handler future, which aborts the in-flight
//!   backend request

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use http_body_util::BodyExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::BalancerError;
use crate::health::HealthMonitor;
use crate::load_balancer::registry::ServiceRegistry;
use crate::load_balancer::{build_strategy, SelectionStrategy, StrategyKind};

/// UUID v4 request IDs, mirroring the per-request correlation ID the
/// access logs are keyed on.
#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Application state injected into handlers. The registry itself stays on
/// `GatewayServer`; the handler only ever goes through the strategy.
#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<dyn SelectionStrategy>,
    pub client: Client<HttpConnector, Body>,
    pub proxy_timeout: Duration,
    pub max_body_bytes: usize,
}

/// HTTP server for the load balancing gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    registry: Arc<ServiceRegistry>,
}

impl GatewayServer {
    /// Build the server from configuration: parse the strategy kind, create
    /// the registry, and register the configured backends.
    pub fn new(config: GatewayConfig) -> Result<Self, BalancerError> {
        let kind = StrategyKind::from_str(&config.load_balancer.strategy)?;

        let registry = Arc::new(ServiceRegistry::new());
        for backend in &config.backends {
            registry.register(&backend.host, backend.port)?;
            tracing::info!(host = %backend.host, port = backend.port, "Service registered");
        }
        tracing::info!(
            total_services = registry.len(),
            strategy = ?kind,
            "Backend services registration complete"
        );

        let strategy = build_strategy(kind, registry.clone());
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            strategy,
            client,
            proxy_timeout: Duration::from_secs(config.timeouts.proxy_secs),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            registry,
        })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Shared handle to the registry, for the admin API and tests.
    pub fn registry(&self) -> Arc<ServiceRegistry> {
        self.registry.clone()
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires. The health monitor runs alongside on the same
    /// signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway server starting");

        let monitor = HealthMonitor::new(self.registry.clone(), self.config.health_check.clone());
        let monitor_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            monitor.run(monitor_shutdown).await;
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

/// Main proxy handler: select a backend, forward, stream the response back.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let t0 = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        source_ip = %peer.ip(),
        "Incoming request"
    );

    // The body is buffered in full before forwarding, never streamed to the
    // backend incrementally.
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit(&e) => {
            tracing::warn!(
                request_id = %request_id,
                limit = state.max_body_bytes,
                "Request body exceeds size limit"
            );
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Error reading request body");
            return error_response(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let service = match state.strategy.select_next() {
        Ok(service) => service,
        Err(_) => {
            tracing::warn!(request_id = %request_id, "No available backend services");
            return error_response(StatusCode::SERVICE_UNAVAILABLE, "No available services");
        }
    };

    tracing::info!(
        request_id = %request_id,
        service = %service.address(),
        "Forwarding request"
    );

    let outbound = match build_outbound_request(&parts, &service.address(), body_bytes) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                target_service = %service.address(),
                error = %e,
                "Failed to build outbound request"
            );
            return error_response(StatusCode::BAD_GATEWAY, "Bad Gateway");
        }
    };

    // The outbound future resolves at response-header arrival; dropping it
    // on timeout aborts the connection. No retry at this layer.
    let response = match tokio::time::timeout(state.proxy_timeout, state.client.request(outbound))
        .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(
                request_id = %request_id,
                target_service = %service.address(),
                error = %e,
                "Error forwarding request to backend"
            );
            return error_response(StatusCode::BAD_GATEWAY, "Bad Gateway");
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                target_service = %service.address(),
                timeout = ?state.proxy_timeout,
                "Proxy request timeout"
            );
            return error_response(StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout");
        }
    };

    // Time to first byte, measured at header arrival. Round robin ignores
    // the sample; a concurrent deregistration is logged and not fatal.
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
    if let Err(e) = state
        .strategy
        .record_response_time(&service.host, service.port, elapsed_ms)
    {
        tracing::warn!(
            request_id = %request_id,
            service = %service.address(),
            error = %e,
            "Failed to record response time"
        );
    }

    tracing::info!(
        request_id = %request_id,
        status = %response.status(),
        response_time_ms = elapsed_ms,
        "Received response from backend"
    );

    // Forward status and headers, then stream the body through. Once the
    // headers are committed a stream error can only be logged; the
    // connection terminates without a further status.
    let (parts, body) = response.into_parts();
    let stream_request_id = request_id;
    let body = Body::new(body.map_err(move |e| {
        tracing::error!(
            request_id = %stream_request_id,
            error = %e,
            "Error in proxy response stream"
        );
        e
    }));
    Response::from_parts(parts, body)
}

/// Build the outbound request: same method and path, headers copied
/// verbatim, buffered body.
fn build_outbound_request(
    parts: &axum::http::request::Parts,
    authority: &str,
    body_bytes: axum::body::Bytes,
) -> Result<Request<Body>, axum::http::Error> {
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(Authority::from_str(authority).map_err(axum::http::Error::from)?);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = Uri::from_parts(uri_parts).map_err(axum::http::Error::from)?;

    let mut builder = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .version(parts.version);
    if let Some(headers) = builder.headers_mut() {
        for (key, value) in parts.headers.iter() {
            headers.insert(key.clone(), value.clone());
        }
    }
    builder.body(Body::from(body_bytes))
}

/// Synthesized JSON error body, `{"error": <message>}`.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// True when body buffering failed on the configured length limit rather
/// than a transport error while reading from the client.
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
