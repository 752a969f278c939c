use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::{Engine, Status};
use crate::pipeline::{Pipeline, RequestKind};
use crate::storage::DocumentRepository;
use crate::TARGET_HTTP;

#[derive(Debug, Deserialize)]
pub struct RankParams {
    #[serde(default)]
    period: i64,
    #[serde(default)]
    lang_code: String,
    #[serde(default)]
    category: String,
}

/// Seconds from a `Cache-Control: max-age=N` header; 0 when absent.
pub fn parse_max_age(headers: &HeaderMap) -> i64 {
    headers
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value.split(',').find_map(|directive| {
                let (name, seconds) = directive.split_once('=')?;
                if name.trim().eq_ignore_ascii_case("max-age") {
                    seconds.trim().parse::<i64>().ok()
                } else {
                    None
                }
            })
        })
        .unwrap_or(0)
}

fn status_code(status: Status) -> StatusCode {
    StatusCode::from_u16(status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/threads", get(rank_threads))
        .route("/{file}", put(index_article).delete(remove_article))
        .with_state(pipeline)
}

/// Builds the engine, starts the worker pool, loads the index directory in
/// the background and serves HTTP until the process exits.
pub async fn serve(config: Config, port: u16) -> Result<()> {
    let engine = Arc::new(Engine::from_config(&config)?);
    DocumentRepository::new(&config.server.index_dir)
        .ensure_root()
        .await?;

    let pipeline = Pipeline::new(engine, config.server.workers);
    pipeline.start();

    let loader = Arc::clone(&pipeline);
    tokio::spawn(async move {
        if let Err(e) = loader.load().await {
            error!(target: TARGET_HTTP, "Failed to load index directory: {:?}", e);
        }
    });

    // Connection reuse is left to hyper's defaults
    info!(
        target: TARGET_HTTP,
        "keep_alive_count={} (not enforced)", config.server.keep_alive_count
    );

    let addr = format!("{}:{}", config.server.address, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(target: TARGET_HTTP, "Server running on http://{}", addr);

    axum::serve(listener, router(pipeline).into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}

/// Handles `PUT /<name>.html`.
pub async fn index_article(
    State(pipeline): State<Arc<Pipeline>>,
    Path(file): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !file.ends_with(".html") {
        warn!(target: TARGET_HTTP, "PUT /{} is not an article", file);
        return StatusCode::NOT_FOUND;
    }
    let ttl = parse_max_age(&headers);
    let response = pipeline
        .call(RequestKind::Index {
            key: file.clone(),
            ttl,
            content: body.to_vec(),
        })
        .await;
    info!(target: TARGET_HTTP, "PUT /{} -> {}", file, response.status);
    status_code(response.status)
}

/// Handles `DELETE /<name>.html`.
pub async fn remove_article(
    State(pipeline): State<Arc<Pipeline>>,
    Path(file): Path<String>,
) -> StatusCode {
    if !file.ends_with(".html") {
        return StatusCode::NOT_FOUND;
    }
    let response = pipeline
        .call(RequestKind::Remove { key: file.clone() })
        .await;
    info!(target: TARGET_HTTP, "DELETE /{} -> {}", file, response.status);
    status_code(response.status)
}

/// Handles `GET /threads`.
pub async fn rank_threads(
    State(pipeline): State<Arc<Pipeline>>,
    Query(params): Query<RankParams>,
) -> impl IntoResponse {
    let response = pipeline
        .call(RequestKind::Rank {
            period: params.period,
            language: params.lang_code,
            category: params.category,
        })
        .await;
    info!(target: TARGET_HTTP, "GET /threads -> {}", response.status);
    (
        status_code(response.status),
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
}
