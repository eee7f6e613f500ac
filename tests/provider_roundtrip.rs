use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use canvas_art_proxy::api::{self, AppState};
use canvas_art_proxy::config::{ApiToken, ProviderConfig, ServiceOptions};
use canvas_art_proxy::error::{ProviderError, WorkflowError};
use canvas_art_proxy::prompt::styles;
use canvas_art_proxy::provider::types::JobStatus;
use canvas_art_proxy::provider::ImageProvider;
use canvas_art_proxy::workflow::poller::PollConfig;
use canvas_art_proxy::workflow::presenter::Phase;
use canvas_art_proxy::{GenerationWorkflow, Presenter, ReplicateClient};

const TOKEN: &str = "r8_test_token";
const IMAGE: &str = "https://replicate.delivery/pbxt/out-0.webp";

/// Minimal stand-in for the predictions API.
struct FakeReplicate {
    succeed_on_poll: usize,
    polls: AtomicUsize,
    created: Mutex<Vec<Value>>,
}

impl FakeReplicate {
    fn new(succeed_on_poll: usize) -> Arc<Self> {
        Arc::new(FakeReplicate { succeed_on_poll, polls: AtomicUsize::new(0), created: Mutex::new(Vec::new()) })
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Token {}", TOKEN);
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

async fn create_prediction(
    State(fake): State<Arc<FakeReplicate>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token."})));
    }
    fake.created.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({"id": "pred-123", "status": "starting", "created_at": "2024-03-01T12:00:00Z"})),
    )
}

async fn get_prediction(
    State(fake): State<Arc<FakeReplicate>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token."})));
    }
    let n = fake.polls.fetch_add(1, Ordering::SeqCst) + 1;
    let body = if n >= fake.succeed_on_poll {
        json!({"id": id, "status": "succeeded", "output": [IMAGE], "error": null,
               "created_at": "2024-03-01T12:00:00Z", "completed_at": "2024-03-01T12:00:05Z"})
    } else {
        json!({"id": id, "status": "processing", "output": null, "error": null})
    };
    (StatusCode::OK, Json(body))
}

fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener).unwrap().serve(app.into_make_service());
    tokio::spawn(server);
    addr
}

fn spawn_fake(fake: Arc<FakeReplicate>) -> String {
    let app = Router::new()
        .route("/v1/predictions", post(create_prediction))
        .route("/v1/predictions/:id", get(get_prediction))
        .with_state(fake);
    format!("http://{}/v1", serve(app))
}

fn client(base: &str, token: &str) -> Arc<ReplicateClient> {
    Arc::new(ReplicateClient::new(ProviderConfig::new(base, ApiToken::Fixed(token.to_string()))).unwrap())
}

fn fast_poll() -> PollConfig {
    PollConfig { interval: Duration::from_millis(10), max_attempts: 10 }
}

#[tokio::test]
async fn workflow_runs_against_http_provider() {
    let fake = FakeReplicate::new(3);
    let base = spawn_fake(fake.clone());
    let workflow = GenerationWorkflow::new(client(&base, TOKEN), fast_poll());

    let mut presenter = Presenter::new();
    presenter.set_prompt("a mountain lake");
    presenter.select_style(styles::find("minimalist").unwrap());
    let presenter = tokio::sync::Mutex::new(presenter);

    let url = workflow.run(&presenter).await.unwrap();
    assert_eq!(url, IMAGE);
    assert_eq!(fake.polls.load(Ordering::SeqCst), 3);

    let p = presenter.lock().await;
    assert_eq!(p.phase(), Phase::Succeeded);
    assert_eq!(p.state().generated_image_url.as_deref(), Some(IMAGE));

    let created = fake.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let body = &created[0];
    assert_eq!(body["version"], "black-forest-labs/flux-1.1-pro");
    assert_eq!(
        body["input"]["prompt"],
        "a mountain lake, minimalist style, simple, clean lines, uncluttered, neutral colors, 8k, photorealistic"
    );
    assert_eq!(body["input"]["width"], 1344);
    assert_eq!(body["input"]["height"], 756);
    assert_eq!(body["input"]["num_inference_steps"], 30);
    assert_eq!(body["input"]["prompt_upsampling"], true);
}

#[tokio::test]
async fn wrong_token_is_a_provider_rejection() {
    let fake = FakeReplicate::new(1);
    let base = spawn_fake(fake.clone());
    let err = client(&base, "r8_wrong").create_prediction("a lake").await.unwrap_err();
    match err {
        ProviderError::ProviderRejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid token"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(fake.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(&format!("http://{}/v1", addr), TOKEN).create_prediction("a lake").await.unwrap_err();
    assert!(matches!(err, ProviderError::Network(_)), "got {:?}", err);

    let workflow = GenerationWorkflow::new(client(&format!("http://{}/v1", addr), TOKEN), fast_poll());
    let mut presenter = Presenter::new();
    presenter.set_prompt("a lake");
    presenter.select_style(styles::find("baroque").unwrap());
    let presenter = tokio::sync::Mutex::new(presenter);
    let err = workflow.run(&presenter).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Submit(ProviderError::Network(_))));
    let p = presenter.lock().await;
    assert_eq!(p.phase(), Phase::Failed);
    assert!(p.can_generate());
}

#[tokio::test]
async fn proxy_routes_end_to_end() {
    let fake = FakeReplicate::new(2);
    let base = spawn_fake(fake.clone());
    let provider: Arc<dyn ImageProvider> = client(&base, TOKEN);
    let state = Arc::new(AppState::new(provider, fast_poll(), ServiceOptions::default()));
    let proxy = format!("http://{}", serve(api::router(state)));
    let http = reqwest::Client::new();

    let enhanced: Value = http
        .post(format!("{}/prompt-enhance", proxy))
        .json(&json!({"prompt": "a fox", "style": {"id": "art-nouveau"}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let prompt = enhanced["enhancedPrompt"].as_str().unwrap().to_string();
    assert!(prompt.starts_with("a fox, art nouveau style"));

    let res = http.post(format!("{}/art-generate", proxy)).json(&json!({ "prompt": prompt })).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["imageUrl"], IMAGE);

    let status: Value = http
        .get(format!("{}/art-status?id=pred-123", proxy))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], JobStatus::Succeeded.as_str());
    assert_eq!(status["output"], IMAGE);
}
