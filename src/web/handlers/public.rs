use super::MAX_PAGE;
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

fn make_context(state: &AppState) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx
}

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    page: usize,
}

fn default_page() -> usize {
    1
}

fn clamp_page(page: usize) -> usize {
    page.clamp(1, MAX_PAGE)
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

fn not_found_page(state: &AppState) -> AppResult<Response> {
    let ctx = make_context(state);
    let html = state.templates.render("public/404.html", &ctx)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

pub async fn home() -> Redirect {
    Redirect::to("/blog")
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Html<String>> {
    let per_page = state.config.content.posts_per_page;
    let page = clamp_page(pagination.page);
    let offset = (page - 1) * per_page;

    let posts = state.posts.list_published(per_page, offset)?;
    let total = state.posts.count_published()? as usize;
    let total_pages = total.div_ceil(per_page);
    let categories = state.posts.list_categories()?;

    let mut ctx = make_context(&state);
    ctx.insert("posts", &posts);
    ctx.insert("categories", &categories);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);

    let html = state.templates.render("public/index.html", &ctx)?;
    Ok(Html(html))
}

pub async fn category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Response> {
    let Some(category) = state.posts.get_category_by_slug(&slug)? else {
        return not_found_page(&state);
    };

    let per_page = state.config.content.posts_per_page;
    let page = clamp_page(pagination.page);
    let posts = state
        .posts
        .list_published_in_category(&slug, per_page, (page - 1) * per_page)?;
    let total = state.posts.count_published_in_category(&slug)? as usize;
    let total_pages = total.div_ceil(per_page);
    let categories = state.posts.list_categories()?;

    let mut ctx = make_context(&state);
    ctx.insert("category", &category);
    ctx.insert("posts", &posts);
    ctx.insert("categories", &categories);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);

    let html = state.templates.render("public/index.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    match state.posts.get_by_slug(&slug)? {
        Some(p) => {
            let page_title = p.post.meta_title.clone().unwrap_or_else(|| p.post.title.clone());
            let page_description = p
                .post
                .meta_description
                .clone()
                .or_else(|| p.post.excerpt.clone());

            let mut ctx = make_context(&state);
            ctx.insert("body_html", &state.markdown.render(&p.post.content));
            ctx.insert("page_title", &page_title);
            ctx.insert("page_description", &page_description);
            ctx.insert("post", &p);

            let html = state.templates.render("public/post.html", &ctx)?;
            Ok(Html(html).into_response())
        }
        None => not_found_page(&state),
    }
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> AppResult<Html<String>> {
    let results = state
        .posts
        .search(&params.q, state.config.content.search_limit)?;

    let mut ctx = make_context(&state);
    ctx.insert("query", params.q.trim());
    ctx.insert("results", &results);

    let html = state.templates.render("public/search.html", &ctx)?;
    Ok(Html(html))
}

pub async fn fallback(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    not_found_page(&state)
}
