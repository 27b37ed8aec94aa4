use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use cloudfront_step::{CascadeController, DistributionOption, StepConfig, StepState};
use console_client::{ConsoleClient, ConsoleClientOptions, DeployQueries, MissingDeployQueries};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Notify};

#[derive(Clone)]
struct ConsoleState {
    fail_distributions: bool,
    slow_gate: Arc<Notify>,
}

async fn graphql(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("listDistribution") {
        if state.fail_distributions {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
        }
        return (
            StatusCode::OK,
            Json(json!({"data": {"listDistribution": [
                {"id": "E123", "domainName": "d1.cloudfront.net"},
                {"id": "E456", "domainName": "d2.cloudfront.net"}
            ]}})),
        );
    }

    let behaviors = match body["variables"]["id"].as_str() {
        Some("E123") => {
            state.slow_gate.notified().await;
            json!(["/old/*"])
        }
        Some("E456") => json!(["/images/*", "/api/*"]),
        _ => json!([]),
    };
    (StatusCode::OK, Json(json!({"data": {"behaviorById": behaviors}})))
}

async fn spawn_console(fail_distributions: bool) -> (String, Arc<Notify>) {
    let slow_gate = Arc::new(Notify::new());
    let app = Router::new()
        .route("/graphql", post(graphql))
        .with_state(ConsoleState {
            fail_distributions,
            slow_gate: Arc::clone(&slow_gate),
        });
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}/graphql"), slow_gate)
}

fn controller_for(url: &str) -> Arc<CascadeController> {
    let client = ConsoleClient::new(ConsoleClientOptions::new(url)).expect("client");
    CascadeController::new(Arc::new(client) as Arc<dyn DeployQueries>)
}

fn option(value: &str, domain: &str) -> DistributionOption {
    DistributionOption {
        label: format!("{value}({domain})"),
        value: value.to_string(),
    }
}

#[tokio::test]
async fn loads_distributions_and_behaviors_end_to_end() {
    let (url, _) = spawn_console(false).await;
    let controller = controller_for(&url);

    controller.initialize().await;
    assert_eq!(
        controller.distribution_options(),
        vec![
            option("E123", "d1.cloudfront.net"),
            option("E456", "d2.cloudfront.net"),
        ]
    );

    controller
        .select_distribution(&option("E456", "d2.cloudfront.net"))
        .await
        .expect("select");
    let labels: Vec<String> = controller
        .behavior_options()
        .into_iter()
        .map(|o| o.label)
        .collect();
    assert_eq!(labels, vec!["/images/*".to_string(), "/api/*".to_string()]);

    controller
        .select_behaviors(["/api/*", "/images/*"])
        .expect("behaviors");
    assert_eq!(
        controller.selection().behaviors,
        vec!["/api/*".to_string(), "/images/*".to_string()]
    );
    assert_eq!(controller.step_state(), StepState::BehaviorsReady);
}

#[tokio::test]
async fn failing_console_leaves_an_empty_step() {
    let (url, _) = spawn_console(true).await;
    let controller = controller_for(&url);

    controller.initialize().await;

    let view = controller.view();
    assert!(view.distribution_options.is_empty());
    assert!(!view.loading.distributions_loading);
    assert!(view.notice.is_some());
}

#[tokio::test]
async fn slow_superseded_response_never_reaches_the_step() {
    let (url, slow_gate) = spawn_console(false).await;
    let controller = controller_for(&url);
    controller.initialize().await;

    let slow = controller
        .spawn_select_distribution(&option("E123", "d1.cloudfront.net"))
        .expect("select slow")
        .expect("behavior fetch issued");
    assert!(controller.selection().behaviors.is_empty());

    let fast = controller
        .spawn_select_distribution(&option("E456", "d2.cloudfront.net"))
        .expect("select fast")
        .expect("behavior fetch issued");
    fast.await.expect("join fast");

    slow_gate.notify_one();
    slow.await.expect("join slow");

    let values: Vec<String> = controller
        .behavior_options()
        .into_iter()
        .map(|o| o.value)
        .collect();
    assert_eq!(values, vec!["/images/*".to_string(), "/api/*".to_string()]);
    assert!(!controller.loading().behaviors_loading);
}

#[tokio::test]
async fn missing_transport_degrades_gracefully() {
    let controller = CascadeController::new_with_hooks(
        Arc::new(MissingDeployQueries),
        Arc::new(cloudfront_step::NoopSelectionHooks),
        StepConfig::default(),
    );
    controller.initialize().await;
    assert!(controller.distribution_options().is_empty());
    assert_eq!(controller.step_state(), StepState::DistributionsReady);
}
