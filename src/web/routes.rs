use super::handlers;
use super::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::public::home))
        .route("/health", get(handlers::public::health))
        .route("/blog", get(handlers::public::index))
        .route("/blog/search", get(handlers::public::search))
        .route("/blog/category/:slug", get(handlers::public::category))
        .route("/blog/:slug", get(handlers::public::post))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(handlers::admin::home))
        .route("/admin/posts", get(handlers::admin::posts))
        .route("/admin/posts", post(handlers::admin::create_post))
        .route("/admin/posts/new", get(handlers::admin::new_post))
        .route("/admin/posts/:id/edit", get(handlers::admin::edit_post))
        .route("/admin/posts/:id", post(handlers::admin::update_post))
        .route(
            "/admin/posts/:id/delete",
            get(handlers::admin::confirm_delete).post(handlers::admin::delete_post),
        )
}

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(handlers::api::list_posts))
        .route("/api/posts/:slug", get(handlers::api::get_post))
        .route("/api/categories", get(handlers::api::list_categories))
        .route("/api/search", get(handlers::api::search))
}
