use crate::error::BlogError;
use crate::models::{
    Category, CreateCategory, CreatePost, Post, PostStatus, PostWithCategories, UpdatePost,
};
use crate::services::markdown::reading_time_minutes;
use crate::services::slug::{generate_slug, resolve_unique_slug, validate_slug};
use crate::services::tags::normalize_tags;
use crate::Database;
use anyhow::Result;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashMap;

pub const DEFAULT_SLUG_ATTEMPTS: u32 = 100;

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, status, author_id, \
     published_at, created_at, updated_at, meta_title, meta_description, tags";

/// Post and category storage. One instance is built per process and shared
/// through the web state; every write runs in a single transaction that takes
/// the write lock up front, so concurrent writers queue on the busy timeout.
#[derive(Clone)]
pub struct PostRepository {
    db: Database,
    slug_max_attempts: u32,
}

impl PostRepository {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            slug_max_attempts: DEFAULT_SLUG_ATTEMPTS,
        }
    }

    pub fn with_slug_max_attempts(mut self, attempts: u32) -> Self {
        self.slug_max_attempts = attempts;
        self
    }

    pub fn create(&self, input: CreatePost, author_id: Option<&str>) -> Result<PostWithCategories> {
        require_title(&input.title)?;
        let featured_image = non_blank(input.featured_image);
        if let Some(ref image) = featured_image {
            validate_image_url(image)?;
        }

        let base_slug = slug_source(input.slug.as_deref(), &input.title)?;
        let now = Utc::now();
        let published_at = input
            .published_at
            .or_else(|| (input.status == PostStatus::Published).then_some(now));
        let tags = normalize_tags(&input.tags);
        let category_ids = distinct_ids(input.category_ids);
        let id = uuid::Uuid::new_v4().to_string();

        let mut conn = self.db.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let slug = resolve_unique_slug(&base_slug, None, self.slug_max_attempts, |s| {
            slug_owner(&tx, s)
        })?;

        tx.execute(
            r#"
            INSERT INTO posts (id, title, slug, excerpt, content, featured_image, status, author_id,
                               published_at, created_at, updated_at, meta_title, meta_description, tags)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?11, ?12, ?13)
            "#,
            rusqlite::params![
                id,
                input.title,
                slug,
                non_blank(input.excerpt),
                input.content,
                featured_image,
                input.status.to_string(),
                author_id,
                published_at,
                now,
                non_blank(input.meta_title),
                non_blank(input.meta_description),
                serde_json::to_string(&tags)?,
            ],
        )?;
        insert_links(&tx, &id, &category_ids)?;
        tx.commit()?;

        tracing::info!(
            "Created post {} '{}' ({}, {} categories)",
            id,
            slug,
            input.status,
            category_ids.len()
        );

        fetch_by_id(&conn, &id)?.ok_or_else(|| BlogError::NotFound.into())
    }

    pub fn update(&self, id: &str, input: UpdatePost) -> Result<PostWithCategories> {
        let mut conn = self.db.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = tx
            .query_row(
                &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
                [id],
                row_to_post,
            )
            .optional()?
            .ok_or(BlogError::NotFound)?;

        let title = match input.title {
            Some(title) => {
                require_title(&title)?;
                title
            }
            None => current.title,
        };

        let slug = match input.slug.as_deref() {
            Some(requested) => {
                let base = slug_source(Some(requested), &title)?;
                resolve_unique_slug(&base, Some(id), self.slug_max_attempts, |s| {
                    slug_owner(&tx, s)
                })?
            }
            None => current.slug,
        };

        let featured_image = input
            .featured_image
            .map(non_blank)
            .unwrap_or(current.featured_image);
        if let Some(ref image) = featured_image {
            validate_image_url(image)?;
        }

        let status = input.status.unwrap_or(current.status);
        let now = Utc::now();
        let published_at = match input.published_at {
            Some(explicit) => Some(explicit),
            None if status == PostStatus::Published && current.published_at.is_none() => Some(now),
            None => current.published_at,
        };

        let excerpt = input.excerpt.map(non_blank).unwrap_or(current.excerpt);
        let content = input.content.unwrap_or(current.content);
        let meta_title = input.meta_title.map(non_blank).unwrap_or(current.meta_title);
        let meta_description = input
            .meta_description
            .map(non_blank)
            .unwrap_or(current.meta_description);
        let tags = input.tags.map(normalize_tags).unwrap_or(current.tags);

        tx.execute(
            r#"
            UPDATE posts SET title = ?1, slug = ?2, excerpt = ?3, content = ?4, featured_image = ?5,
                             status = ?6, published_at = ?7, updated_at = ?8, meta_title = ?9,
                             meta_description = ?10, tags = ?11
            WHERE id = ?12
            "#,
            rusqlite::params![
                title,
                slug,
                excerpt,
                content,
                featured_image,
                status.to_string(),
                published_at,
                now,
                meta_title,
                meta_description,
                serde_json::to_string(&tags)?,
                id,
            ],
        )?;

        if let Some(category_ids) = input.category_ids {
            let category_ids = distinct_ids(category_ids);
            tx.execute("DELETE FROM post_categories WHERE post_id = ?", [id])?;
            insert_links(&tx, id, &category_ids)?;
        }

        tx.commit()?;
        tracing::info!("Updated post {} '{}' ({})", id, slug, status);

        fetch_by_id(&conn, id)?.ok_or_else(|| BlogError::NotFound.into())
    }

    /// Returns whether a post was removed. Category links go with it.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.get()?;
        let affected = conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
        if affected > 0 {
            tracing::info!("Deleted post {}", id);
        } else {
            tracing::debug!("Delete of unknown post {}", id);
        }
        Ok(affected > 0)
    }

    pub fn list_by_author(&self, author_id: &str) -> Result<Vec<Post>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts WHERE author_id = ? ORDER BY created_at DESC, rowid DESC",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map([author_id], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    pub fn list_published(&self, limit: usize, offset: usize) -> Result<Vec<PostWithCategories>> {
        let conn = self.db.get()?;
        let posts = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM posts WHERE status = 'published' \
                 ORDER BY published_at DESC, created_at DESC LIMIT ? OFFSET ?",
                POST_COLUMNS
            ))?;
            let posts = stmt
                .query_map((limit, offset), row_to_post)?
                .collect::<Result<Vec<_>, _>>()?;
            posts
        };
        with_categories(&conn, posts)
    }

    pub fn count_published(&self) -> Result<i64> {
        let conn = self.db.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE status = 'published'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_published_in_category(
        &self,
        category_slug: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostWithCategories>> {
        let conn = self.db.get()?;
        let posts = {
            let mut stmt = conn.prepare(
                r#"
                SELECT p.id, p.title, p.slug, p.excerpt, p.content, p.featured_image, p.status,
                       p.author_id, p.published_at, p.created_at, p.updated_at, p.meta_title,
                       p.meta_description, p.tags
                FROM posts p
                JOIN post_categories pc ON p.id = pc.post_id
                JOIN categories c ON pc.category_id = c.id
                WHERE c.slug = ? AND p.status = 'published'
                ORDER BY p.published_at DESC, p.created_at DESC
                LIMIT ? OFFSET ?
                "#,
            )?;
            let posts = stmt
                .query_map((category_slug, limit, offset), row_to_post)?
                .collect::<Result<Vec<_>, _>>()?;
            posts
        };
        with_categories(&conn, posts)
    }

    pub fn count_published_in_category(&self, category_slug: &str) -> Result<i64> {
        let conn = self.db.get()?;
        let count = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM posts p
            JOIN post_categories pc ON p.id = pc.post_id
            JOIN categories c ON pc.category_id = c.id
            WHERE c.slug = ? AND p.status = 'published'
            "#,
            [category_slug],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Published posts only; drafts and archived posts read as absent.
    pub fn get_by_slug(&self, slug: &str) -> Result<Option<PostWithCategories>> {
        let conn = self.db.get()?;
        let post = conn
            .query_row(
                &format!(
                    "SELECT {} FROM posts WHERE slug = ? AND status = 'published'",
                    POST_COLUMNS
                ),
                [slug],
                row_to_post,
            )
            .optional()?;

        match post {
            Some(p) => Ok(with_categories(&conn, vec![p])?.pop()),
            None => Ok(None),
        }
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<PostWithCategories>> {
        let conn = self.db.get()?;
        fetch_by_id(&conn, id)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, slug, description, created_at FROM categories ORDER BY name",
        )?;
        let categories = stmt
            .query_map([], |row| row_to_category(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let conn = self.db.get()?;
        let category = conn
            .query_row(
                "SELECT id, name, slug, description, created_at FROM categories WHERE slug = ?",
                [slug],
                |row| row_to_category(row, 0),
            )
            .optional()?;
        Ok(category)
    }

    pub fn create_category(&self, input: CreateCategory) -> Result<Category> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(BlogError::Validation("Category name is required".to_string()).into());
        }
        let slug = slug_source(input.slug.as_deref(), &name)?;

        let conn = self.db.get()?;
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = ?)",
            [&slug],
            |row| row.get(0),
        )?;
        if taken {
            return Err(
                BlogError::Validation(format!("Category slug '{}' already exists", slug)).into(),
            );
        }

        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            slug,
            description: non_blank(input.description),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO categories (id, name, slug, description, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                &category.id,
                &category.name,
                &category.slug,
                &category.description,
                &category.created_at,
            ),
        )?;
        tracing::info!("Created category '{}'", category.slug);

        Ok(category)
    }

    /// Case-insensitive substring match over title, excerpt and content of
    /// published posts.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Post>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));

        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM posts
            WHERE status = 'published'
              AND (title LIKE ?1 ESCAPE '\' OR excerpt LIKE ?1 ESCAPE '\' OR content LIKE ?1 ESCAPE '\')
            ORDER BY published_at DESC
            LIMIT ?2
            "#,
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map((&pattern, limit), row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(BlogError::Validation("Title is required".to_string()).into());
    }
    Ok(())
}

/// Normalizes an explicit slug, or the fallback text when none was given.
fn slug_source(explicit: Option<&str>, fallback: &str) -> Result<String> {
    let slug = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => generate_slug(s),
        None => generate_slug(fallback),
    };
    if !validate_slug(&slug) || !slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(BlogError::Validation(
            "Slug must contain at least one letter or digit".to_string(),
        )
        .into());
    }
    Ok(slug)
}

fn validate_image_url(raw: &str) -> Result<()> {
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(BlogError::Validation(format!(
            "Featured image must be an http(s) URL, got '{}'",
            raw
        ))
        .into()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn distinct_ids(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() && !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    out
}

fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn slug_owner(conn: &Connection, slug: &str) -> Result<Option<String>> {
    let owner = conn
        .query_row("SELECT id FROM posts WHERE slug = ?", [slug], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(owner)
}

fn insert_links(conn: &Connection, post_id: &str, category_ids: &[String]) -> Result<()> {
    let mut exists_stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")?;
    let mut insert_stmt =
        conn.prepare("INSERT INTO post_categories (post_id, category_id) VALUES (?, ?)")?;

    for category_id in category_ids {
        let exists: bool = exists_stmt.query_row([category_id], |row| row.get(0))?;
        if !exists {
            return Err(
                BlogError::Validation(format!("Unknown category '{}'", category_id)).into(),
            );
        }
        insert_stmt.execute((post_id, category_id))?;
    }
    Ok(())
}

fn fetch_by_id(conn: &Connection, id: &str) -> Result<Option<PostWithCategories>> {
    let post = conn
        .query_row(
            &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
            [id],
            row_to_post,
        )
        .optional()?;

    match post {
        Some(p) => Ok(with_categories(conn, vec![p])?.pop()),
        None => Ok(None),
    }
}

fn with_categories(conn: &Connection, posts: Vec<Post>) -> Result<Vec<PostWithCategories>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_post: HashMap<String, Vec<Category>> = HashMap::new();
    {
        let placeholders = posts.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT pc.post_id, c.id, c.name, c.slug, c.description, c.created_at
             FROM categories c
             JOIN post_categories pc ON c.id = pc.category_id
             WHERE pc.post_id IN ({})
             ORDER BY c.name",
            placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> = posts
            .iter()
            .map(|p| &p.id as &dyn rusqlite::ToSql)
            .collect();
        let rows = stmt.query_map(params.as_slice(), |row| {
            Ok((row.get::<_, String>(0)?, row_to_category(row, 1)?))
        })?;
        for row in rows {
            let (post_id, category) = row?;
            by_post.entry(post_id).or_default().push(category);
        }
    }

    Ok(posts
        .into_iter()
        .map(|post| {
            let categories = by_post.remove(&post.id).unwrap_or_default();
            let reading_time_minutes = reading_time_minutes(&post.content);
            PostWithCategories {
                post,
                categories,
                reading_time_minutes,
            }
        })
        .collect())
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    let raw_status: String = row.get(6)?;
    let status = raw_status.parse::<PostStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown post status '{}'", raw_status).into(),
        )
    })?;
    let tags: Vec<String> = serde_json::from_str(&row.get::<_, String>(13)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(13, Type::Text, Box::new(e)))?;

    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        excerpt: row.get(3)?,
        content: row.get(4)?,
        featured_image: row.get(5)?,
        status,
        author_id: row.get(7)?,
        published_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        meta_title: row.get(11)?,
        meta_description: row.get(12)?,
        tags,
    })
}

fn row_to_category(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        slug: row.get(offset + 2)?,
        description: row.get(offset + 3)?,
        created_at: row.get(offset + 4)?,
    })
}
