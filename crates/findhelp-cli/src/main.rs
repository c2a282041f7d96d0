mod catalog;
mod location;
mod search;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use findhelp_core::{AppConfig, JsonFileStore, KeyValueStore, Taxonomy};
use findhelp_directory::SortBy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "findhelp")]
#[command(about = "Find community resources near a location")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Set the saved location from a 5-digit zip code
    Zip {
        /// Zip code (12345 or 12345-6789)
        zip: String,
    },
    /// Set the saved location from a device-style coordinate reading
    Locate {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        /// Postal code reported by reverse geocoding
        #[arg(long)]
        postal_code: Option<String>,
        /// City reported by reverse geocoding
        #[arg(long)]
        city: Option<String>,
    },
    /// Show the saved location
    Location,
    /// Forget the saved location
    Clear,
    /// List categories and subcategories
    Categories,
    /// Show the category a term resolves to and how it would be searched
    Resolve {
        term: String,
        /// Treat the term as a subcategory name
        #[arg(long)]
        subcategory: bool,
    },
    /// Great-circle distance between two zip codes
    Distance {
        from: String,
        to: String,
        /// Report kilometers instead of miles
        #[arg(long)]
        km: bool,
    },
    /// Search the resource directory
    Search {
        term: String,
        /// Treat the term as a subcategory name
        #[arg(long)]
        subcategory: bool,
        /// relevance, distance, or name
        #[arg(long, default_value = "relevance")]
        sort: SortBy,
        /// Maximum number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
        /// Search this zip instead of the saved location (not saved)
        #[arg(long)]
        zip: Option<String>,
    },
    /// Show the last search that was run
    Last,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = findhelp_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Zip { zip } => location::run_zip(&config, &zip)?,
        Commands::Locate {
            latitude,
            longitude,
            postal_code,
            city,
        } => location::run_locate(&config, latitude, longitude, postal_code, city).await?,
        Commands::Location => location::run_show(&config)?,
        Commands::Clear => location::run_clear(&config)?,
        Commands::Categories => catalog::run_categories(&load_taxonomy(&config)?),
        Commands::Resolve { term, subcategory } => {
            catalog::run_resolve(&load_taxonomy(&config)?, &term, subcategory);
        }
        Commands::Distance { from, to, km } => catalog::run_distance(&from, &to, km)?,
        Commands::Search {
            term,
            subcategory,
            sort,
            pages,
            zip,
        } => {
            let args = search::SearchArgs {
                term,
                subcategory,
                sort,
                pages,
                zip,
            };
            search::run_search(&config, &load_taxonomy(&config)?, args).await?;
        }
        Commands::Last => search::run_last(&config)?,
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(JsonFileStore::open(&config.state_path)?))
}

fn load_taxonomy(config: &AppConfig) -> anyhow::Result<Taxonomy> {
    match &config.taxonomy_path {
        Some(path) => Ok(findhelp_core::load_taxonomy(path)?),
        None => Ok(Taxonomy::bundled().clone()),
    }
}
