use super::*;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    reply_status: StatusCode,
    reply: Value,
}

async fn graphql(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().await.push((auth, body));
    (state.reply_status, Json(state.reply.clone()))
}

async fn spawn_server(
    reply_status: StatusCode,
    reply: Value,
) -> (String, Arc<Mutex<Vec<(Option<String>, Value)>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        requests: Arc::clone(&requests),
        reply_status,
        reply,
    };
    let app = Router::new()
        .route("/graphql", post(graphql))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}/graphql"), requests)
}

fn client_for(url: &str, token: Option<&str>) -> ConsoleClient {
    let mut options = ConsoleClientOptions::new(url);
    options.api_token = token.map(str::to_string);
    ConsoleClient::new(options).expect("client")
}

#[tokio::test]
async fn list_distributions_posts_page_and_count() {
    let (url, requests) = spawn_server(
        StatusCode::OK,
        json!({"data": {"listDistribution": [
            {"id": "E123", "domainName": "d1.cloudfront.net"},
            {"id": "E456", "domainName": "d2.cloudfront.net"}
        ]}}),
    )
    .await;
    let client = client_for(&url, Some("token-abc"));

    let records = client.list_distributions(1, 10).await.expect("list");

    assert_eq!(
        records,
        vec![
            DistributionRecord::new("E123", "d1.cloudfront.net"),
            DistributionRecord::new("E456", "d2.cloudfront.net"),
        ]
    );
    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("token-abc"));
    assert_eq!(body["variables"], json!({"page": 1, "count": 10}));
}

#[tokio::test]
async fn behavior_by_id_sends_distribution_id() {
    let (url, requests) = spawn_server(
        StatusCode::OK,
        json!({"data": {"behaviorById": ["/images/*", "/api/*"]}}),
    )
    .await;
    let client = client_for(&url, None);

    let behaviors = client
        .behavior_by_id(&DistributionId("E123".into()))
        .await
        .expect("behaviors");

    assert_eq!(behaviors, vec!["/images/*".to_string(), "/api/*".to_string()]);
    let requests = requests.lock().await;
    let (auth, body) = &requests[0];
    assert!(auth.is_none());
    assert_eq!(body["variables"]["id"], "E123");
}

#[tokio::test]
async fn null_list_maps_to_empty() {
    let (url, _) = spawn_server(StatusCode::OK, json!({"data": {"listDistribution": null}})).await;
    let client = client_for(&url, None);

    let records = client.list_distributions(1, 10).await.expect("list");
    assert!(records.is_empty());
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (url, _) = spawn_server(StatusCode::UNAUTHORIZED, json!({"message": "nope"})).await;
    let client = client_for(&url, None);

    let err = client
        .behavior_by_id(&DistributionId("E123".into()))
        .await
        .expect_err("should fail");
    assert_eq!(err, TransportError::Status(401));
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let (url, _) = spawn_server(
        StatusCode::OK,
        json!({"data": null, "errors": [{"message": "AccessDenied"}]}),
    )
    .await;
    let client = client_for(&url, None);

    let err = client.list_distributions(1, 10).await.expect_err("should fail");
    assert_eq!(err, TransportError::GraphQl("AccessDenied".into()));
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = client_for(&format!("http://{addr}/graphql"), None);

    let err = client.list_distributions(1, 10).await.expect_err("should fail");
    assert!(matches!(err, TransportError::Http(_)), "unexpected error: {err:?}");
}

#[test]
fn rejects_invalid_api_url() {
    let err = ConsoleClient::new(ConsoleClientOptions::new("not a url"))
        .err()
        .expect("should fail");
    assert!(matches!(err, TransportError::Unavailable(_)));
}

#[test]
fn blank_token_is_ignored() {
    let client = client_for("http://127.0.0.1:1/graphql", Some("   "));
    assert!(client.api_token.is_none());
}

#[tokio::test]
async fn missing_transport_always_fails() {
    let missing = MissingDeployQueries;
    assert!(matches!(
        missing.list_distributions(1, 10).await,
        Err(TransportError::Unavailable(_))
    ));
    assert!(matches!(
        missing.behavior_by_id(&DistributionId("E1".into())).await,
        Err(TransportError::Unavailable(_))
    ));
}
