//! Shopfront CLI - browse the store from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # First page of the catalog
//! shop products
//!
//! # Page 2 of one category
//! shop products --category 3 --page 2
//!
//! # Everything matching a search, unpaginated
//! shop products --search lamp --all
//!
//! # Autocomplete suggestions for a query
//! shop search "desk l"
//!
//! # Categories and the reconciled cart
//! shop categories
//! shop cart
//! ```
//!
//! # Commands
//!
//! - `products` - Filtered, paginated product list
//! - `categories` - Category list
//! - `cart` - Server cart joined against the catalog
//! - `search` - Suggestions for a query
//!
//! Configuration comes from `SHOPFRONT_*` environment variables (or a `.env`
//! file); `--api-url` and `--username` override them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use shopfront_core::CategoryId;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopfront store CLI")]
struct Cli {
    /// Store API base URL (overrides `SHOPFRONT_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Login username (overrides `SHOPFRONT_USERNAME`)
    #[arg(short, long, global = true)]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Only products matching this search
        #[arg(short, long)]
        search: Option<String>,

        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Show every product on one page
        #[arg(long)]
        all: bool,
    },
    /// List categories
    Categories,
    /// Show the cart
    Cart,
    /// Show search suggestions
    Search {
        /// Search text
        query: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront_storefront=info,shopfront_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = commands::ConnectOptions {
        api_url: cli.api_url,
        username: cli.username,
        all: matches!(cli.command, Commands::Products { all: true, .. }),
    };
    let mut store = commands::connect(options).await?;

    match cli.command {
        Commands::Products {
            category,
            search,
            page,
            all: _,
        } => commands::products::list(&mut store, category, search.as_deref(), page).await?,
        Commands::Categories => commands::categories::list(&store),
        Commands::Cart => commands::cart::show(&store),
        Commands::Search { query } => commands::search::suggest(&mut store, &query).await,
    }
    Ok(())
}
