//! HTTP read endpoints over the snapshot cache.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use dnews_core::{Article, SnapshotCache, TopicRegistry};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

pub const DEFAULT_LIMIT: usize = 30;

#[derive(Clone)]
pub struct AppState {
    pub cache: SnapshotCache,
    pub topics: Arc<TopicRegistry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticlesQuery {
    pub topic: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticlesResponse {
    pub topic: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub count: usize,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub last_updated: Option<DateTime<Utc>>,
}

pub fn build_router(state: AppState) -> Router {
    // Any origin, method and header; credentials stay disabled since they
    // cannot be combined with a wildcard origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/articles", get(articles))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn articles(
    State(state): State<AppState>,
    query: Result<Query<ArticlesQuery>, QueryRejection>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::InvalidLimit {
        reason: rejection.body_text(),
    })?;
    let topic = query
        .topic
        .unwrap_or_else(|| state.topics.default_topic().to_owned());
    if !state.topics.contains(&topic) {
        return Err(ApiError::InvalidTopic {
            topic,
            expected: state.topics.ids().collect::<Vec<_>>().join(", "),
        });
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let snapshot = state.cache.current().await;
    let articles: Vec<Article> = snapshot
        .articles(&topic)
        .iter()
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(ArticlesResponse {
        topic,
        last_updated: snapshot.last_updated(),
        count: articles.len(),
        articles,
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        last_updated: state.cache.last_updated().await,
    })
}
