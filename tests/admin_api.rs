//! Integration tests for the runtime registration API.

use std::sync::Arc;

use tokio::net::TcpListener;

use lb_gateway::admin::admin_router;
use lb_gateway::load_balancer::registry::ServiceRegistry;

async fn spawn_admin(registry: Arc<ServiceRegistry>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = admin_router(registry);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}/admin/services", addr)
}

#[tokio::test]
async fn register_list_deregister_round_trip() {
    let registry = Arc::new(ServiceRegistry::new());
    let url = spawn_admin(registry.clone()).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(&url)
        .json(&serde_json::json!({ "host": "10.0.0.5", "port": 4000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert!(registry.find("10.0.0.5", 4000).is_some());

    // Duplicate registration is accepted as a no-op.
    let res = client
        .post(&url)
        .json(&serde_json::json!({ "host": "10.0.0.5", "port": 4000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(registry.len(), 1);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let services: serde_json::Value = res.json().await.unwrap();
    assert_eq!(services.as_array().unwrap().len(), 1);
    assert_eq!(services[0]["host"], "10.0.0.5");
    assert_eq!(services[0]["port"], 4000);
    assert_eq!(services[0]["health"], "unknown");
    assert_eq!(services[0]["total_requests"], 0);

    let res = client
        .delete(&url)
        .json(&serde_json::json!({ "host": "10.0.0.5", "port": 4000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let registry = Arc::new(ServiceRegistry::new());
    let url = spawn_admin(registry.clone()).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(&url)
        .json(&serde_json::json!({ "host": "", "port": 4000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid service"));
    assert!(registry.is_empty());
}
