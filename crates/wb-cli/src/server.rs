//! HTTP API built on axum.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wb_core::{AnalysisError, NlpProcessor, TaskInput, TaskType, analyze_patterns};
use wb_store::{Store, StoreError};

use crate::config::Config;
use crate::pipeline;

pub struct AppState {
    store: Mutex<Store>,
    rng: Mutex<SmallRng>,
    processor: NlpProcessor,
    config: Config,
}

/// Thread-safe shared state for axum handlers.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Store, config: Config) -> SharedState {
        Self::with_rng(store, config, SmallRng::from_os_rng())
    }

    pub fn with_rng(store: Store, config: Config, rng: SmallRng) -> SharedState {
        Arc::new(Self {
            store: Mutex::new(store),
            rng: Mutex::new(rng),
            processor: config.analysis.processor(),
            config,
        })
    }
}

// --- Errors ---

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Request body refused by an extractor; keeps the extractor's status.
    Rejected(StatusCode, String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Rejected(status, m) => (status, m),
            ApiError::Internal(m) => {
                tracing::error!("{m}");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::EmptyInput(_) | AnalysisError::UnsupportedTask(_) => {
                ApiError::BadRequest(e.to_string())
            }
            AnalysisError::ComputationFault(_) => ApiError::Internal(format!("Processing failed: {e}")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Rejected(e.status(), e.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(format!("storage failed: {e}"))
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

// --- Request types ---

fn default_task_type() -> String {
    TaskType::Sentiment.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    pub model_name: Option<String>,
    pub context: Option<String>,
    pub labels: Option<Vec<String>>,
}

fn default_compare_models() -> Vec<String> {
    vec!["bert-base-uncased".to_string(), "roberta-base".to_string()]
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_compare_models")]
    pub models: Vec<String>,
    #[serde(default = "default_task_type")]
    pub task_type: String,
}

// --- Router ---

/// Build the axum Router with every API route.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/compare_models", post(compare_models))
        .route("/attention_visualization/{task_id}", get(attention_visualization))
        .route(
            "/attention_visualization/{task_id}/patterns",
            get(attention_patterns),
        )
        .route("/model_metrics", get(model_metrics))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on `addr` until Ctrl-C.
pub async fn run(state: SharedState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

// --- Handlers ---

async fn index(State(state): State<SharedState>) -> ApiResult {
    let store = state.store.lock().await;
    let recent = store.recent_tasks(state.config.server.recent_limit)?;
    let metrics = store.list_metrics()?;
    Ok(Json(json!({ "recent_tasks": recent, "metrics": metrics })))
}

async fn analyze(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    let text = req.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }
    let task: TaskType = req
        .task_type
        .parse()
        .map_err(|_| ApiError::BadRequest("Unsupported task type".to_string()))?;

    let input = TaskInput {
        text: text.to_string(),
        model_name: Some(
            req.model_name
                .unwrap_or_else(|| state.config.analysis.default_model.clone()),
        ),
        context: req.context.unwrap_or_default(),
        labels: req.labels,
    };

    let analysis = {
        let mut rng = state.rng.lock().await;
        pipeline::analyze(&state.processor, task, &input, &mut *rng)?
    };
    let task_id = {
        let store = state.store.lock().await;
        pipeline::persist(&store, &input.text, &analysis)?
    };
    tracing::info!(task_id, task = %task, "analyzed text");

    Ok(Json(json!({
        "results": analysis.results,
        "processing_time": analysis.processing_time,
        "task_id": task_id,
        "attention_data": analysis.heatmap,
    })))
}

async fn compare_models(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    let text = req.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }

    let mut comparison = serde_json::Map::new();
    let task = req
        .task_type
        .parse::<TaskType>()
        .ok()
        .filter(|t| t.comparable());
    if let Some(task) = task {
        let mut rng = state.rng.lock().await;
        for model in &req.models {
            let input = TaskInput::new(text).with_model(model.as_str());
            let analysis = pipeline::analyze(&state.processor, task, &input, &mut *rng)?;
            comparison.insert(
                model.clone(),
                json!({
                    "results": analysis.results,
                    "processing_time": analysis.processing_time,
                }),
            );
        }
    } else {
        tracing::debug!(task_type = %req.task_type, "task type not comparable, skipping");
    }

    Ok(Json(json!({ "comparison": comparison })))
}

async fn attention_visualization(
    State(state): State<SharedState>,
    Path(task_id): Path<i64>,
) -> ApiResult {
    let store = state.store.lock().await;
    let task = store
        .get_task(task_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found")))?;
    let data = task.attention_data.ok_or_else(no_attention_data)?;
    Ok(Json(data))
}

async fn attention_patterns(
    State(state): State<SharedState>,
    Path(task_id): Path<i64>,
) -> ApiResult {
    let heatmap = {
        let store = state.store.lock().await;
        let task = store
            .get_task(task_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found")))?;
        task.heatmap()?.ok_or_else(no_attention_data)?
    };
    let patterns = analyze_patterns(&heatmap.attention_matrix, &heatmap.tokens)?;
    Ok(Json(json!(patterns)))
}

fn no_attention_data() -> ApiError {
    ApiError::NotFound("No attention data available for this task".to_string())
}

async fn model_metrics(State(state): State<SharedState>) -> ApiResult {
    let metrics = state.store.lock().await.list_metrics()?;
    Ok(Json(json!({ "metrics": metrics })))
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "models_loaded": state.processor.loaded_models(),
    }))
}
