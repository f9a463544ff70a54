use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Suffixed probes tried before slug resolution gives up.
    #[serde(default = "default_slug_max_attempts")]
    pub slug_max_attempts: u32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            search_limit: default_search_limit(),
            slug_max_attempts: default_slug_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Header carrying the authenticated author id, set by the fronting auth layer.
    #[serde(default = "default_author_header")]
    pub author_header: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            author_header: default_author_header(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pool_size() -> u32 {
    10
}

fn default_posts_per_page() -> usize {
    10
}

fn default_search_limit() -> usize {
    10
}

fn default_slug_max_attempts() -> u32 {
    100
}

fn default_author_header() -> String {
    "x-author-id".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `blogdesk init` first?",
                path.display(),
                e
            )
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.posts_per_page == 0 {
            anyhow::bail!("content.posts_per_page must be greater than 0");
        }
        if self.content.posts_per_page > 100 {
            anyhow::bail!("content.posts_per_page must be 100 or less");
        }
        if self.content.search_limit == 0 || self.content.search_limit > 100 {
            anyhow::bail!("content.search_limit must be between 1 and 100");
        }
        if self.content.slug_max_attempts == 0 {
            anyhow::bail!("content.slug_max_attempts must be greater than 0");
        }
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        if axum::http::HeaderName::from_bytes(self.admin.author_header.as_bytes()).is_err() {
            anyhow::bail!(
                "admin.author_header '{}' is not a valid header name",
                self.admin.author_header
            );
        }
        Ok(())
    }
}
