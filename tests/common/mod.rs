#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{routing::post, Form, Json, Router};
use irab::{app, build_state, AppConfig, ModelConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const MOCK_TOKEN: &str = "mock-token";

/// Tracks environment variable mutations and restores originals on drop.
pub struct EnvGuard {
    originals: HashMap<String, Option<String>>,
}

impl EnvGuard {
    pub fn new() -> Self {
        Self {
            originals: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.capture(key);
        std::env::set_var(key, value);
    }

    pub fn set_many(&mut self, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.capture(key);
        std::env::remove_var(key);
    }

    fn capture(&mut self, key: &str) {
        if self.originals.contains_key(key) {
            return;
        }
        let original = std::env::var(key).ok();
        self.originals.insert(key.to_string(), original);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.originals.drain() {
            match original {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

#[derive(Clone)]
pub enum ModelReply {
    Text(String),
    Status(u16, String),
}

impl ModelReply {
    pub fn text(s: &str) -> Self {
        ModelReply::Text(s.to_string())
    }
}

/// Scripted behaviour of the fake IAM and generation endpoints.
#[derive(Clone)]
pub struct Script {
    pub issue_tokens: bool,
    pub validation: ModelReply,
    pub analysis: ModelReply,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            issue_tokens: true,
            validation: ModelReply::text("الطفل: مبتدأ مرفوع"),
            analysis: ModelReply::text("نص إعراب"),
        }
    }
}

#[derive(Clone, Default)]
pub struct Calls {
    pub token: Arc<AtomicUsize>,
    pub validation: Arc<AtomicUsize>,
    pub analysis: Arc<AtomicUsize>,
}

impl Calls {
    pub fn token(&self) -> usize {
        self.token.load(Ordering::SeqCst)
    }
    pub fn validation(&self) -> usize {
        self.validation.load(Ordering::SeqCst)
    }
    pub fn analysis(&self) -> usize {
        self.analysis.load(Ordering::SeqCst)
    }
    pub fn model(&self) -> usize {
        self.validation() + self.analysis()
    }
}

#[derive(Clone)]
struct MockState {
    script: Script,
    calls: Calls,
}

/// Fake IAM + generation service on one listener.
pub struct MockUpstream {
    pub base: String,
    pub calls: Calls,
    handle: JoinHandle<()>,
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn issue_token(
    State(mock): State<MockState>,
    Form(form): Form<HashMap<String, String>>,
) -> axum::response::Response {
    mock.calls.token.fetch_add(1, Ordering::SeqCst);
    let valid_key = form.get("apikey").map(String::as_str) == Some("test-key");
    if mock.script.issue_tokens && valid_key {
        Json(serde_json::json!({ "access_token": MOCK_TOKEN, "token_type": "Bearer" })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, "Provided API key could not be found").into_response()
    }
}

async fn generate(
    State(mock): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let bearer = format!("Bearer {}", MOCK_TOKEN);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
        return (StatusCode::UNAUTHORIZED, "missing bearer").into_response();
    }
    let is_analysis = body["parameters"]["max_new_tokens"] == 300;
    let reply = if is_analysis {
        mock.calls.analysis.fetch_add(1, Ordering::SeqCst);
        &mock.script.analysis
    } else {
        mock.calls.validation.fetch_add(1, Ordering::SeqCst);
        &mock.script.validation
    };
    match reply {
        ModelReply::Text(text) => Json(serde_json::json!({
            "model_id": body["model_id"],
            "results": [{ "generated_text": text, "stop_reason": "max_tokens" }]
        }))
        .into_response(),
        ModelReply::Status(code, text) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            text.clone(),
        )
            .into_response(),
    }
}

impl MockUpstream {
    pub async fn start(script: Script) -> Self {
        let calls = Calls::default();
        let router = Router::new()
            .route("/identity/token", post(issue_token))
            .route("/ml/v1/text/generation", post(generate))
            .with_state(MockState {
                script,
                calls: calls.clone(),
            });
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base: format!("http://{}", addr),
            calls,
            handle,
        }
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            model: ModelConfig {
                model_id: "sdaia/allam-1-13b-instruct".into(),
                api_url: format!("{}/ml/v1/text/generation", self.base),
                iam_token_url: format!("{}/identity/token", self.base),
                api_key: "test-key".into(),
                project_id: "test-project".into(),
            },
            port: 0,
            upstream_timeout_ms: 2_000,
            max_request_bytes: None,
            log_requests: false,
        }
    }
}

/// Spin up the app bound to an available port.
pub async fn spawn_app(config: &AppConfig) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = build_state(config).unwrap();
    let app = app(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

/// `name=value` of the first `Set-Cookie` header, ready to send back.
pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|s| s.trim().to_string())
}
