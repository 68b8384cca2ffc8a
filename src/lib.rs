//! Core library for irab.  This module wires together the analysis
//! pipeline, session history, practice data and the HTTP handlers.

pub mod classify;
mod config;
pub mod error;
pub mod gate;
pub mod history;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod quiz;
pub mod session;
pub mod token;

pub use config::{AppConfig, ModelConfig};

use axum::extract::{
    rejection::{BytesRejection, FailedToBufferBody, JsonRejection},
    DefaultBodyLimit, State,
};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

use crate::error::{respond_with_error, ErrorResponse};
use crate::history::HistoryStore;
use crate::metrics::Metrics;
use crate::model::WatsonxClient;
use crate::pipeline::AnalysisPipeline;
use crate::session::SessionId;
use crate::token::IamTokenProvider;

pub use crate::error::{AnalysisError, TokenError};
pub use crate::history::HistoryEntry;
pub use crate::quiz::QuizQuestion;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub sentence: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct AnalyzeResponse {
    pub result: String,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct QuizAnswerRequest {
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
    /// Echoed back by the client from the question payload.
    #[serde(default)]
    pub correct: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Clone)]
pub struct QuizFeedback {
    pub feedback: String,
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AnalysisPipeline,
    pub history: HistoryStore,
    pub metrics: Arc<Metrics>,
    /// Maximum accepted raw request body size in bytes (None => axum default)
    pub max_request_bytes: Option<usize>,
    /// Log each analysed sentence at info level.
    pub log_requests: bool,
}

/// Build state from an explicit configuration.  One HTTP client (with the
/// configured timeout) is shared by the token provider and the model client.
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.upstream_timeout_ms))
        .build()?;
    let tokens = IamTokenProvider::new(
        config.model.iam_token_url.clone(),
        config.model.api_key.clone(),
        client.clone(),
    );
    let generator = WatsonxClient::new(&config.model, client);
    let pipeline = AnalysisPipeline::new(Arc::new(tokens), Arc::new(generator));

    Ok(AppState {
        pipeline,
        history: HistoryStore::new(),
        metrics: Arc::new(Metrics::new()),
        max_request_bytes: config.max_request_bytes,
        log_requests: config.log_requests,
    })
}

/// Build the Axum router and attach handlers.
pub fn app(state: AppState) -> Router {
    let max_request_bytes = state.max_request_bytes;

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/history", get(history_handler))
        .route("/random-sentence", get(random_sentence_handler))
        .route("/get-quiz-question", get(quiz_question_handler))
        .route("/submit-quiz-answer", post(submit_quiz_answer_handler))
        .route("/healthz", get(healthz_handler))
        .route("/metrics", get(metrics_handler));

    let router = if let Some(limit) = max_request_bytes {
        router.layer(DefaultBodyLimit::max(limit))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler for `/analyze`.  Runs the pipeline and, on success, records the
/// pair in the caller's session history, issuing a session cookie if the
/// request did not carry one.
async fn analyze_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> axum::response::Response {
    let payload = match payload {
        Ok(Json(inner)) => inner,
        Err(rejection) => return handle_json_rejection(&state, rejection),
    };
    let sentence = payload.sentence.unwrap_or_default();
    if state.log_requests {
        tracing::info!(sentence = %sentence, "analyze request");
    }

    let start = Instant::now();
    let outcome = state.pipeline.analyze(&sentence).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let analysis = match outcome {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::info!(kind = err.kind(), error = %err, latency_ms, "analysis failed");
            state.metrics.record_error(err.kind(), latency_ms);
            return err.into_response();
        }
    };
    state.metrics.record_success(latency_ms, analysis.fallback);

    // A cookie this store never issued starts a fresh session.
    let existing = session::session_id(&headers).filter(|id| state.history.contains(*id));
    let session = existing.unwrap_or_else(SessionId::generate);
    state.history.append(session, &sentence, &analysis.text);
    tracing::debug!(session = %session, fallback = analysis.fallback, latency_ms, "analysis stored");

    let mut response = (
        StatusCode::OK,
        Json(AnalyzeResponse {
            result: analysis.text,
        }),
    )
        .into_response();
    if existing.is_none() {
        let (name, value) = session.set_cookie_header();
        response.headers_mut().insert(name, value);
    }
    response
}

async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Vec<HistoryEntry>> {
    let entries = match session::session_id(&headers) {
        Some(id) => state.history.list(id),
        None => Vec::new(),
    };
    Json(entries)
}

async fn random_sentence_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "sentence": quiz::random_sentence() }))
}

async fn quiz_question_handler() -> Json<&'static QuizQuestion> {
    Json(quiz::random_question())
}

async fn submit_quiz_answer_handler(
    State(state): State<AppState>,
    payload: Result<Json<QuizAnswerRequest>, JsonRejection>,
) -> axum::response::Response {
    let payload = match payload {
        Ok(Json(inner)) => inner,
        Err(rejection) => return handle_json_rejection(&state, rejection),
    };
    let feedback = quiz::check_answer(payload.answer.as_ref(), payload.correct.as_ref());
    state
        .metrics
        .record_quiz_answer(feedback == quiz::CORRECT_FEEDBACK);
    (
        StatusCode::OK,
        Json(QuizFeedback {
            feedback: feedback.to_string(),
        }),
    )
        .into_response()
}

fn handle_json_rejection(state: &AppState, rejection: JsonRejection) -> axum::response::Response {
    match rejection {
        JsonRejection::BytesRejection(BytesRejection::FailedToBufferBody(
            FailedToBufferBody::LengthLimitError(_),
        )) => {
            if let Some(limit) = state.max_request_bytes {
                tracing::warn!(limit, "request body exceeded configured limit");
            } else {
                tracing::warn!("request body exceeded default limit");
            }
            let message = match state.max_request_bytes {
                Some(limit) => format!("Request too large (body exceeded limit {} bytes)", limit),
                None => "Request too large".to_string(),
            };
            respond_with_error(StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new(message))
        }
        other => {
            tracing::debug!(error = %other, "rejected request body");
            respond_with_error(StatusCode::BAD_REQUEST, ErrorResponse::new(other.body_text()))
        }
    }
}

/// Simple health endpoint for container readiness / liveness checks.
async fn healthz_handler() -> axum::response::Response {
    let json = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(json)).into_response()
}

/// Prometheus-style metrics exposition.
async fn metrics_handler(State(state): State<AppState>) -> axum::response::Response {
    let body = state.metrics.render(state.history.session_count());
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
        .into_response()
}
