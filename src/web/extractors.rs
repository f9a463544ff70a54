use crate::web::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The author the fronting authentication layer vouched for, read from the
/// configured `admin.author_header`.
pub struct AuthorId(pub String);

impl FromRequestParts<Arc<AppState>> for AuthorId {
    type Rejection = (StatusCode, &'static str);

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let author = parts
            .headers
            .get(state.config.admin.author_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);

        Box::pin(async move {
            author
                .map(AuthorId)
                .ok_or((StatusCode::UNAUTHORIZED, "Authentication required"))
        })
    }
}
