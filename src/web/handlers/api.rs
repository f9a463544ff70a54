use super::MAX_PAGE;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::Arc;

const MAX_PAGE_SIZE: usize = 100;

#[derive(Deserialize)]
pub struct PaginationParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

fn paginate(
    page: Option<usize>,
    per_page: Option<usize>,
    default_size: usize,
    max_size: usize,
) -> (usize, usize, usize) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(default_size).clamp(1, max_size);
    let offset = (page - 1) * per_page;
    (page, per_page, offset)
}

fn json_envelope(data: serde_json::Value, meta: serde_json::Value) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": data,
        "meta": meta,
    }))
}

fn json_single(data: serde_json::Value) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": data,
    }))
}

fn not_found(msg: &str) -> Response {
    let body = serde_json::json!({
        "error": "Not Found",
        "message": msg,
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

fn internal_error(operation: &str, err: anyhow::Error) -> Response {
    tracing::error!("API {} error: {:?}", operation, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Internal server error"})),
    )
        .into_response()
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Response {
    let (page, per_page, offset) = paginate(
        params.page,
        params.per_page,
        state.config.content.posts_per_page,
        MAX_PAGE_SIZE,
    );

    let listing = state
        .posts
        .count_published()
        .and_then(|total| Ok((total, state.posts.list_published(per_page, offset)?)));

    match listing {
        Ok((total, posts)) => json_envelope(
            serde_json::to_value(&posts).unwrap_or_default(),
            serde_json::json!({
                "total": total,
                "page": page,
                "per_page": per_page,
            }),
        )
        .into_response(),
        Err(e) => internal_error("list_posts", e),
    }
}

/// GET /api/posts/:slug
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.posts.get_by_slug(&slug) {
        Ok(Some(post)) => json_single(serde_json::to_value(&post).unwrap_or_default()).into_response(),
        Ok(None) => not_found("Post not found"),
        Err(e) => internal_error("get_post", e),
    }
}

/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Response {
    match state.posts.list_categories() {
        Ok(categories) => {
            let total = categories.len();
            json_envelope(
                serde_json::to_value(&categories).unwrap_or_default(),
                serde_json::json!({ "total": total }),
            )
            .into_response()
        }
        Err(e) => internal_error("list_categories", e),
    }
}

/// GET /api/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let limit = params
        .limit
        .unwrap_or(state.config.content.search_limit)
        .clamp(1, MAX_PAGE_SIZE);

    match state.posts.search(&params.q, limit) {
        Ok(results) => {
            let total = results.len();
            json_envelope(
                serde_json::to_value(&results).unwrap_or_default(),
                serde_json::json!({
                    "query": params.q.trim(),
                    "total": total,
                    "limit": limit,
                }),
            )
            .into_response()
        }
        Err(e) => internal_error("search", e),
    }
}
