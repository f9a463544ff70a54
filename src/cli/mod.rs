pub mod category;
pub mod init;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogdesk")]
#[command(version)]
#[command(about = "A small blog CMS", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "blogdesk.toml", env = "BLOGDESK_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file and data directory
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    Serve {
        /// Overrides server.host from the config file
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Overrides server.port from the config file
        #[arg(short, long)]
        port: Option<u16>,
    },
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    List,
}
