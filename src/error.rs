use thiserror::Error;

/// Failures the blog layer reports on purpose. Store and pool errors travel
/// alongside these as plain `anyhow::Error`s.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("no free slug for '{slug}' after {attempts} attempts")]
    SlugExhausted { slug: String, attempts: u32 },
}
