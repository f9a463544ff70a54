use crate::error::BlogError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0.downcast_ref::<BlogError>() {
            Some(BlogError::NotFound) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            Some(err @ (BlogError::Validation(_) | BlogError::SlugExhausted { .. })) => {
                tracing::warn!("Rejected request: {}", err);
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            None => {
                tracing::error!("Application error: {:?}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
