//! GoMarketplace CLI - Inspect and edit the saved cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the saved cart
//! gm-cli show
//!
//! # Add a product (adding it again increments its quantity)
//! gm-cli add --id 1 --title "Chair" --image-url https://cdn.example.com/chair.png --price 19.99
//!
//! # Change quantities
//! gm-cli increment 1
//! gm-cli decrement 1
//!
//! # Delete the saved cart
//! gm-cli clear-saved
//! ```
//!
//! # Commands
//!
//! - `show` - Print the saved cart
//! - `add` - Add a product to the cart
//! - `increment` / `decrement` - Change a product's quantity by one
//! - `clear-saved` - Remove the saved cart from storage

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use go_marketplace_core::{NewCartItem, Price, ProductId};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "GoMarketplace cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the saved cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        #[arg(long)]
        id: ProductId,

        /// Display title
        #[arg(short, long)]
        title: String,

        /// Product image URL
        #[arg(short, long)]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(short, long)]
        price: Decimal,
    },
    /// Add one unit of a product already in the cart
    Increment {
        /// Product ID
        id: ProductId,
    },
    /// Remove one unit of a product
    Decrement {
        /// Product ID
        id: ProductId,
    },
    /// Remove the saved cart from storage
    ClearSaved,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cart=info,gm_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
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
    let config = CliConfig::from_env()?;

    match cli.command {
        Commands::Show => commands::cart::show(&config).await,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let item = NewCartItem::new(id, title, image_url, Price::new(price));
            commands::cart::add(&config, item).await?;
        }
        Commands::Increment { id } => commands::cart::increment(&config, &id).await?,
        Commands::Decrement { id } => commands::cart::decrement(&config, &id).await?,
        Commands::ClearSaved => commands::cart::clear_saved(&config).await?,
    }
    Ok(())
}
