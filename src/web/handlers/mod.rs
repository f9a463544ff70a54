pub mod admin;
pub mod api;
pub mod public;

/// Highest page number any listing accepts; larger requests are clamped.
pub const MAX_PAGE: usize = 10000;
