mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use creatorscope_core::Platform;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "creatorscope-cli")]
#[command(about = "Search influencers across platforms through a creatorscope server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a search and print the deduplicated creators
    Search {
        /// Platform to search; repeat for several (instagram, tiktok, youtube)
        #[arg(long = "platform", required = true, value_parser = parse_platform)]
        platforms: Vec<Platform>,
        /// YAML filter preset
        #[arg(long)]
        filters: Option<PathBuf>,
        /// Number of pages to fetch
        #[arg(long, default_value_t = 1, conflicts_with = "all")]
        pages: u32,
        /// Keep paging until the result set is exhausted
        #[arg(long)]
        all: bool,
        /// Print one JSON object per creator instead of a table
        #[arg(long)]
        json: bool,
        /// Server base URL (overrides `CREATORSCOPE_API_URL`)
        #[arg(long)]
        api_url: Option<String>,
    },
}

fn parse_platform(raw: &str) -> Result<Platform, String> {
    Platform::parse(&raw.trim().to_ascii_lowercase()).ok_or_else(|| {
        let supported: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
        format!(
            "unsupported platform \"{raw}\" (expected one of: {})",
            supported.join(", ")
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = creatorscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search {
            platforms,
            filters,
            pages,
            all,
            json,
            api_url,
        }) => {
            let options = search::SearchOptions {
                api_url: api_url.unwrap_or_else(|| config.api_url.clone()),
                platforms,
                filters,
                pages: if all { search::Pages::All } else { search::Pages::Count(pages) },
                json,
            };
            search::run_search(&config, options).await?;
        }
        None => println!("creatorscope-cli: run `creatorscope-cli search --help` for usage"),
    }

    Ok(())
}
