use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::clout::CLOUT_SLOTS;
use crate::engine::TrendingEngine;
use crate::keywords::normalize_term;
use crate::metrics::Metrics;
use crate::orchestrator::CycleReport;
use crate::ranking::RankedEntry;
use crate::store::{ContentItem, Source};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TrendingEngine>,
    pub default_limit: usize,
}

pub fn router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/hotwords", get(top_hotwords).post(ensure_hotword))
        .route("/hotwords/{term}/clout", get(clout_history))
        .route("/debug/hotwords/{term}/clout", post(set_clout))
        .route("/content/top", get(top_content))
        .route("/sources/top", get(top_sources))
        .route("/admin/cycle", post(trigger_cycle))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    match metrics {
        Some(m) => app.merge(m.router()),
        None => app,
    }
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

impl AppState {
    fn limit(&self, q: &LimitQuery) -> usize {
        q.limit.unwrap_or(self.default_limit)
    }
}

#[derive(Serialize)]
struct CloutOut {
    term: String,
    clout: [f64; CLOUT_SLOTS],
}

#[derive(Deserialize)]
struct TermReq {
    term: String,
}

#[derive(Deserialize)]
struct CloutReq {
    value: f64,
}

#[derive(Serialize)]
struct ErrorOut {
    error: String,
}

fn internal(e: anyhow::Error) -> Response {
    tracing::warn!(target: "api", error = %format!("{e:#}"), "query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorOut {
            error: format!("{e:#}"),
        }),
    )
        .into_response()
}

async fn top_hotwords(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Json<Vec<String>> {
    Json(state.engine.get_top_hotwords(state.limit(&q)))
}

async fn clout_history(State(state): State<AppState>, Path(term): Path<String>) -> Json<CloutOut> {
    let clout = state.engine.get_clout_history(&term);
    Json(CloutOut {
        term: normalize_term(&term),
        clout,
    })
}

async fn ensure_hotword(State(state): State<AppState>, Json(body): Json<TermReq>) -> Response {
    if body.term.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorOut {
                error: "term must not be empty".into(),
            }),
        )
            .into_response();
    }
    let term = state.engine.ensure_hotword(&body.term);
    let clout = state.engine.get_clout_history(&term);
    Json(CloutOut { term, clout }).into_response()
}

async fn set_clout(
    State(state): State<AppState>,
    Path(term): Path<String>,
    Json(body): Json<CloutReq>,
) -> Response {
    if !state.engine.set_clout(&term, body.value) {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorOut {
                error: format!("unknown hotword '{term}'"),
            }),
        )
            .into_response();
    }
    let clout = state.engine.get_clout_history(&term);
    Json(CloutOut {
        term: normalize_term(&term),
        clout,
    })
    .into_response()
}

async fn top_content(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<RankedEntry<ContentItem>>>, Response> {
    state
        .engine
        .get_top_content(state.limit(&q))
        .await
        .map(Json)
        .map_err(internal)
}

async fn top_sources(
    State(state): State<AppState>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<RankedEntry<Source>>>, Response> {
    state
        .engine
        .get_top_sources(state.limit(&q))
        .await
        .map(Json)
        .map_err(internal)
}

async fn trigger_cycle(State(state): State<AppState>) -> Json<CycleReport> {
    Json(state.engine.trigger_cycle(chrono::Utc::now()).await)
}
