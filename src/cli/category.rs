use crate::models::CreateCategory;
use crate::services::posts::PostRepository;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

use super::CategoryCommand;

pub async fn run(config_path: &Path, command: CategoryCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    db.migrate()?;
    let repo = PostRepository::new(db);

    match command {
        CategoryCommand::Add {
            name,
            slug,
            description,
        } => {
            let category = repo.create_category(CreateCategory {
                name,
                slug,
                description,
            })?;
            tracing::info!("Category '{}' created ({})", category.name, category.slug);
        }
        CategoryCommand::List => {
            let categories = repo.list_categories()?;

            println!("{:<38} {:<24} {:<24}", "ID", "NAME", "SLUG");
            println!("{}", "-".repeat(88));
            for category in categories {
                println!(
                    "{:<38} {:<24} {:<24}",
                    category.id, category.name, category.slug
                );
            }
        }
    }

    Ok(())
}
