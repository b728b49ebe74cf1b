//! Black-box tests for the peer admin facade.

use std::sync::Arc;

use wg_gateway::peer_store::MemoryPeerStore;
use wg_gateway::{app, AppState, GatewayConfig};

const PASSWORD: &str = "admin-secret";

/// Spawn a gateway and return an authenticated client plus the base url.
async fn spawn_authenticated() -> (reqwest::Client, String) {
    let config = GatewayConfig {
        bind: "127.0.0.1".to_string(),
        port: 0,
        password: Some(PASSWORD.to_string()),
        release: "test-release".to_string(),
        base_path: String::new(),
    };
    let state = AppState::new(Arc::new(config), Arc::new(MemoryPeerStore::new()));
    let app = app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = format!("http://{}", addr);

    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let res = http
        .post(format!("{}/api/session", base))
        .json(&serde_json::json!({"password": PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    (http, base)
}

async fn create_peer(http: &reqwest::Client, base: &str, name: &str) -> serde_json::Value {
    let res = http
        .post(format!("{}/api/wireguard/client", base))
        .json(&serde_json::json!({"name": name}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    res.json().await.unwrap()
}

#[tokio::test]
async fn create_and_list_peers() {
    let (http, base) = spawn_authenticated().await;

    let peer = create_peer(&http, &base, "alice").await;
    assert_eq!(peer["name"], "alice");
    assert_eq!(peer["address"], "10.8.0.2");
    assert_eq!(peer["enabled"], true);
    assert!(peer["id"].is_string());

    let peers: Vec<serde_json::Value> = http
        .get(format!("{}/api/wireguard/client", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0]["id"], peer["id"]);
}

#[tokio::test]
async fn create_requires_a_name() {
    let (http, base) = spawn_authenticated().await;

    for body in [serde_json::json!({}), serde_json::json!({"name": 7})] {
        let res = http
            .post(format!("{}/api/wireguard/client", base))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "Missing: Name");
    }
}

#[tokio::test]
async fn unknown_client_ids_yield_not_found() {
    let (http, base) = spawn_authenticated().await;

    // A well-formed uuid that resolves to nothing.
    let res = http
        .delete(format!(
            "{}/api/wireguard/client/{}",
            base,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Client Not Found"));

    // An id that is not even a uuid cannot resolve either.
    let res = http
        .get(format!("{}/api/wireguard/client/nope/configuration", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn configuration_downloads_as_attachment() {
    let (http, base) = spawn_authenticated().await;
    let peer = create_peer(&http, &base, "alice").await;

    let res = http
        .get(format!(
            "{}/api/wireguard/client/{}/configuration",
            base,
            peer["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"alice.conf\""
    );
    assert_eq!(res.headers().get("content-type").unwrap(), "text/plain");
    let body = res.text().await.unwrap();
    assert!(body.contains("[Interface]"));
    assert!(body.contains("Address = 10.8.0.2/24"));
}

#[tokio::test]
async fn qrcode_renders_as_svg() {
    let (http, base) = spawn_authenticated().await;
    let peer = create_peer(&http, &base, "alice").await;

    let res = http
        .get(format!(
            "{}/api/wireguard/client/{}/qrcode.svg",
            base,
            peer["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("content-type").unwrap(), "image/svg+xml");
    assert!(res.text().await.unwrap().contains("<svg"));
}

#[tokio::test]
async fn enable_and_disable_are_idempotent() {
    let (http, base) = spawn_authenticated().await;
    let peer = create_peer(&http, &base, "alice").await;
    let id = peer["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let res = http
            .post(format!("{}/api/wireguard/client/{}/disable", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
    let peers: Vec<serde_json::Value> = http
        .get(format!("{}/api/wireguard/client", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(peers[0]["enabled"], false);

    for _ in 0..2 {
        let res = http
            .post(format!("{}/api/wireguard/client/{}/enable", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
    let peers: Vec<serde_json::Value> = http
        .get(format!("{}/api/wireguard/client", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(peers[0]["enabled"], true);
}

#[tokio::test]
async fn rename_and_readdress_return_the_updated_peer() {
    let (http, base) = spawn_authenticated().await;
    let peer = create_peer(&http, &base, "alice").await;
    let id = peer["id"].as_str().unwrap().to_string();

    let res = http
        .put(format!("{}/api/wireguard/client/{}/name", base, id))
        .json(&serde_json::json!({"name": "bob"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "bob");

    let res = http
        .put(format!("{}/api/wireguard/client/{}/address", base, id))
        .json(&serde_json::json!({"address": "10.8.0.77"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["address"], "10.8.0.77");

    // Invalid addresses never reach the peer record.
    let res = http
        .put(format!("{}/api/wireguard/client/{}/address", base, id))
        .json(&serde_json::json!({"address": "not-an-ip"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid: Address");
}

#[tokio::test]
async fn delete_removes_the_peer() {
    let (http, base) = spawn_authenticated().await;
    let peer = create_peer(&http, &base, "alice").await;
    let id = peer["id"].as_str().unwrap().to_string();

    let res = http
        .delete(format!("{}/api/wireguard/client/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let peers: Vec<serde_json::Value> = http
        .get(format!("{}/api/wireguard/client", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(peers.is_empty());

    // Configuration for the removed peer is gone too.
    let res = http
        .get(format!("{}/api/wireguard/client/{}/configuration", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}
