use crate::error::BlogError;
use crate::models::{CreatePost, PostStatus, PostWithCategories, UpdatePost};
use crate::services::tags::parse_tag_list;
use crate::web::error::AppResult;
use crate::web::extractors::AuthorId;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum_extra::extract::Form;
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

fn make_admin_context(state: &AppState, author: &str) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx.insert("author_id", author);
    ctx.insert("version", env!("CARGO_PKG_VERSION"));
    ctx
}

/// Fields of the post editor. Blank inputs arrive as empty strings.
#[derive(Deserialize)]
pub struct PostForm {
    title: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    featured_image: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    meta_title: String,
    #[serde(default)]
    meta_description: String,
    /// Comma separated.
    #[serde(default)]
    tags: String,
    #[serde(default)]
    category_ids: Vec<String>,
    /// `publish` from the publish button, anything else saves with `status`.
    #[serde(default)]
    action: String,
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl PostForm {
    fn status(&self) -> PostStatus {
        if self.action == "publish" {
            PostStatus::Published
        } else {
            self.status.parse().unwrap_or_default()
        }
    }

    fn into_create(self) -> CreatePost {
        CreatePost {
            status: self.status(),
            tags: parse_tag_list(&self.tags),
            title: self.title,
            slug: optional(self.slug),
            excerpt: optional(self.excerpt),
            content: self.content,
            featured_image: optional(self.featured_image),
            published_at: None,
            meta_title: optional(self.meta_title),
            meta_description: optional(self.meta_description),
            category_ids: self.category_ids,
        }
    }

    /// The editor always submits every field, so every field is replaced.
    fn into_update(self) -> UpdatePost {
        UpdatePost {
            status: Some(self.status()),
            tags: Some(parse_tag_list(&self.tags)),
            title: Some(self.title),
            slug: Some(self.slug),
            excerpt: Some(optional(self.excerpt)),
            content: Some(self.content),
            featured_image: Some(optional(self.featured_image)),
            published_at: None,
            meta_title: Some(optional(self.meta_title)),
            meta_description: Some(optional(self.meta_description)),
            category_ids: Some(self.category_ids),
        }
    }
}

pub async fn home() -> Redirect {
    Redirect::to("/admin/posts")
}

pub async fn posts(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
) -> AppResult<Html<String>> {
    let posts = state.posts.list_by_author(&author)?;

    let mut ctx = make_admin_context(&state, &author);
    ctx.insert("posts", &posts);

    let html = state.templates.render("admin/posts/index.html", &ctx)?;
    Ok(Html(html))
}

fn render_form(
    state: &AppState,
    author: &str,
    post: Option<&PostWithCategories>,
) -> AppResult<Html<String>> {
    let categories = state.posts.list_categories()?;
    let selected: Vec<&str> = post
        .map(|p| p.categories.iter().map(|c| c.id.as_str()).collect())
        .unwrap_or_default();

    let mut ctx = make_admin_context(state, author);
    ctx.insert("post", &post);
    ctx.insert("is_new", &post.is_none());
    ctx.insert("categories", &categories);
    ctx.insert("selected_category_ids", &selected);

    let html = state.templates.render("admin/posts/form.html", &ctx)?;
    Ok(Html(html))
}

pub async fn new_post(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
) -> AppResult<Html<String>> {
    render_form(&state, &author, None)
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
    Form(form): Form<PostForm>,
) -> AppResult<Redirect> {
    state.posts.create(form.into_create(), Some(&author))?;
    Ok(Redirect::to("/admin/posts"))
}

/// Looks a post up by id for the signed-in author. Posts written by someone
/// else read as missing.
fn owned_post(state: &AppState, id: &str, author: &str) -> AppResult<PostWithCategories> {
    match state.posts.get_by_id(id)? {
        Some(post) if post.post.author_id.as_deref() == Some(author) => Ok(post),
        Some(_) => {
            tracing::warn!("Author {} tried to reach post {} of another author", author, id);
            Err(BlogError::NotFound.into())
        }
        None => Err(BlogError::NotFound.into()),
    }
}

pub async fn edit_post(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let post = owned_post(&state, &id, &author)?;
    render_form(&state, &author, Some(&post))
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> AppResult<Redirect> {
    owned_post(&state, &id, &author)?;
    state.posts.update(&id, form.into_update())?;
    Ok(Redirect::to("/admin/posts"))
}

pub async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let post = owned_post(&state, &id, &author)?;

    let mut ctx = make_admin_context(&state, &author);
    ctx.insert("post", &post);

    let html = state.templates.render("admin/posts/delete.html", &ctx)?;
    Ok(Html(html))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AuthorId(author): AuthorId,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    owned_post(&state, &id, &author)?;
    state.posts.delete(&id)?;
    Ok(Redirect::to("/admin/posts"))
}
