use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "My Blog".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("blogdesk.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = format!(
        r#"[site]
title = "{}"
description = "Insights, tutorials, and updates from our team"
url = "http://localhost:3000"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/blogdesk.db"

[content]
posts_per_page = 10
search_limit = 10
slug_max_attempts = 100

[admin]
author_header = "x-author-id"
"#,
        site_name.replace('"', "\\\"")
    );

    std::fs::write(&config_path, config)?;

    tracing::info!("Created new blog at {:?}", path);
    tracing::info!("Run 'blogdesk migrate' to set up the database");
    tracing::info!("Run 'blogdesk serve' to start the server");

    Ok(())
}
