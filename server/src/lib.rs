use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use okapi_core::parse::load_corpus;
use okapi_core::{build_parallel, rank, Bm25Params, Corpus, DocumentLengthTable, InvertedIndex, QueryProcessor, RankedHit, Term};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RankedHit>,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<Vec<Term>>,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Hits { total_hits: usize, results: Vec<RankedHit> },
    Failed { error: String },
}

/// Built index plus the constants it is queried with. Never mutated after
/// construction, so request handlers share it without locking.
pub struct Engine {
    index: InvertedIndex,
    lengths: DocumentLengthTable,
    params: Bm25Params,
}

impl Engine {
    pub fn from_corpus(corpus: &Corpus, params: Bm25Params, workers: usize) -> Result<Self> {
        params.validate()?;
        let (index, lengths) = build_parallel(corpus, workers);
        Ok(Self { index, lengths, params })
    }

    pub fn processor(&self) -> QueryProcessor<'_> {
        QueryProcessor::new(&self.index, &self.lengths, self.params)
    }

    pub fn num_docs(&self) -> usize { self.lengths.len() }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn build_app(corpus_path: &str, params: Bm25Params, workers: usize) -> Result<Router> {
    // Index is built once at startup and kept in memory
    let corpus = load_corpus(corpus_path)?;
    let engine = Engine::from_corpus(&corpus, params, workers)?;
    tracing::info!(num_docs = engine.num_docs(), "engine ready");
    Ok(router(Arc::new(engine)))
}

pub fn router(engine: Arc<Engine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/search/batch", post(batch_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<serde_json::Value>)> {
    let start = std::time::Instant::now();
    let terms: Vec<Term> = params.q.split_whitespace().map(String::from).collect();
    let scores = state.engine.processor().run_query(&terms).map_err(|err| {
        tracing::warn!(query = %params.q, %err, "search failed");
        (StatusCode::UNPROCESSABLE_ENTITY, Json(serde_json::json!({ "error": err.to_string() })))
    })?;
    let results = rank(&scores, clamp_k(params.k));
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: scores.len(), results }))
}

pub async fn batch_handler(State(state): State<AppState>, Json(req): Json<BatchRequest>) -> Json<Vec<BatchItem>> {
    let k = clamp_k(req.k);
    let items = state
        .engine
        .processor()
        .run(&req.queries)
        .into_iter()
        .map(|result| match result {
            Ok(scores) => BatchItem::Hits { total_hits: scores.len(), results: rank(&scores, k) },
            Err(err) => BatchItem::Failed { error: err.to_string() },
        })
        .collect();
    Json(items)
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.engine.lengths.length(&doc_id) {
        Ok(length) => Ok(Json(serde_json::json!({ "doc_id": doc_id, "length": length }))),
        Err(err) => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": err.to_string() })))),
    }
}

fn clamp_k(k: usize) -> usize { k.clamp(1, MAX_K) }
