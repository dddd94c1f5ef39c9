use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use warta_core::{Engine, EngineConfig, Method, RankedResult};

const MAX_K: usize = 100;
const ADMIN_HEADER: &str = "X-ADMIN-TOKEN";

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_alpha() -> f32 { 0.7 }
fn default_method() -> String { "tfidf".into() }
fn default_k() -> usize { warta_core::DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub method: Method,
    pub alpha: f32,
    pub took_s: f64,
    pub results: Vec<RankedResult>,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pub num_docs: usize,
    pub tfidf_terms: usize,
    pub bm25_terms: usize,
    pub max_access_count: u64,
    pub snapshot: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

/// Opens the engine (loading or building the model) before any route exists,
/// so the router never serves a half-built model.
pub fn build_app(config: EngineConfig) -> Result<Router> {
    let engine = Arc::new(Engine::open(config)?);
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(AppState { engine, admin_token }))
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref());
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/model", get(model_handler))
        .route("/model/rebuild", post(rebuild_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `CORS_ALLOW_ORIGIN` is a comma-separated origin list; unset, empty or
/// unparseable means any origin.
fn cors_layer(allow: Option<&str>) -> CorsLayer {
    let origins = allow.map(parse_origins).unwrap_or_default();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

fn parse_origins(list: &str) -> Vec<HeaderValue> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).filter_map(|s| s.parse().ok()).collect()
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let method: Method = params.method.parse().map_err(bad_request)?;
    let k = params.k.clamp(1, MAX_K);
    let results = state
        .engine
        .rank_top(&params.q, params.alpha, method, k)
        .map_err(bad_request)?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, method, alpha: params.alpha, took_s: elapsed.as_secs_f64(), results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Result<Json<serde_json::Value>, ApiError> {
    let model = state.engine.model();
    let article = model
        .corpus
        .article(doc_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no article {doc_id}")))?;
    Ok(Json(serde_json::json!({
        "doc_id": article.id,
        "title": article.title,
        "url": article.url,
        "access_count": article.access_count,
        "metadata": article.raw_metadata,
        "text": article.raw_content,
    })))
}

pub async fn model_handler(State(state): State<AppState>) -> Json<ModelInfo> {
    let model = state.engine.model();
    Json(ModelInfo {
        num_docs: model.num_docs(),
        tfidf_terms: model.tfidf.vocab().len(),
        bm25_terms: model.bm25.vocab().len(),
        max_access_count: model.popularity.max_access_count(),
        snapshot: state.engine.store().path().display().to_string(),
    })
}

async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &headers)?;
    let engine = state.engine.clone();
    let model = tokio::task::spawn_blocking(move || engine.rebuild())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!(error = %e, "rebuild failed; keeping previous model");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        })?;
    Ok(Json(serde_json::json!({ "num_docs": model.num_docs() })))
}

fn bad_request(e: warta_core::RankError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Rebuilds need `X-ADMIN-TOKEN` to equal the configured `ADMIN_TOKEN`.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err((StatusCode::UNAUTHORIZED, "rebuild disabled: ADMIN_TOKEN not set".into()));
    };
    match headers.get(ADMIN_HEADER).map(|v| v.to_str()) {
        Some(Ok(token)) if token == expected => Ok(()),
        Some(_) => Err((StatusCode::UNAUTHORIZED, "invalid admin token".into())),
        None => Err((StatusCode::UNAUTHORIZED, format!("missing {ADMIN_HEADER} header"))),
    }
}
