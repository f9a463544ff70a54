use crate::services::markdown::MarkdownRenderer;
use crate::services::posts::PostRepository;
use crate::{Config, Database};
use anyhow::Result;
use std::collections::HashMap;
use tera::{Tera, Value};

pub struct AppState {
    pub config: Config,
    pub posts: PostRepository,
    pub templates: Tera,
    pub markdown: MarkdownRenderer,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let mut templates = Tera::default();

        templates.register_filter("format_date", format_date_filter);
        templates.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("admin/posts/index.html", include_str!("../../templates/admin/posts/index.html")),
            ("admin/posts/form.html", include_str!("../../templates/admin/posts/form.html")),
            ("admin/posts/delete.html", include_str!("../../templates/admin/posts/delete.html")),
            ("public/index.html", include_str!("../../templates/public/index.html")),
            ("public/post.html", include_str!("../../templates/public/post.html")),
            ("public/search.html", include_str!("../../templates/public/search.html")),
            ("public/404.html", include_str!("../../templates/public/404.html")),
        ])?;

        let posts =
            PostRepository::new(db).with_slug_max_attempts(config.content.slug_max_attempts);

        Ok(Self {
            config,
            posts,
            templates,
            markdown: MarkdownRenderer::new(),
        })
    }
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date requires a string"))?;

    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%B %-d, %Y");

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    Ok(Value::String(date_str.to_string()))
}
