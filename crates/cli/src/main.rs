//! Stockroom CLI - Stock list, manual sales, and sales reports.
//!
//! # Usage
//!
//! ```bash
//! # Show the stock list with margins and low-stock flags
//! stockroom stock list
//!
//! # Add an item
//! stockroom stock add --name Rice --quantity 10 --minimum 5 --category Cereals \
//!     --purchase-price 2.00 --sale-price 3.50
//!
//! # Change some fields of an item
//! stockroom stock edit <id> --quantity 12
//!
//! # Sell one unit, or several items at once
//! stockroom stock sell <id>
//! stockroom sale --line <id>=3 --line <id>=1
//!
//! # Per-day sales summary
//! stockroom sales report
//! ```
//!
//! # Commands
//!
//! - `stock` - List, add, edit, delete, quick-sell, and import items
//! - `sale` - Record a multi-item manual sale
//! - `sales report` - Sales grouped per day

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stockroom_app::{AppConfig, AppError, FirestoreStore, LogFormat, init_tracing};

mod commands;

use commands::sale::SaleLineArg;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stock and manual-sale tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stock items
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Record a manual sale of one or more items
    Sale {
        /// Cart line as `<id>=<quantity>`; repeat for more items
        #[arg(short, long = "line", required = true)]
        lines: Vec<SaleLineArg>,
    },
    /// Inspect recorded sales
    Sales {
        #[command(subcommand)]
        action: SalesAction,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// List items with profit, margin, and low-stock flag
    List,
    /// Add a new item
    Add(ItemFields),
    /// Change fields of an existing item; omitted fields keep their values
    Edit {
        /// Item identifier
        id: String,
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Delete an item
    Delete {
        /// Item identifier
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Sell a single unit of an item
    Sell {
        /// Item identifier
        id: String,
    },
    /// Add every item listed in a YAML file
    Import {
        /// Path to the YAML file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum SalesAction {
    /// Sales grouped per day, newest first
    Report,
}

/// Stock form fields, as they would be typed into the form.
#[derive(Args, Debug, Default)]
pub struct ItemFields {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,
    /// Units on hand
    #[arg(long)]
    pub quantity: Option<String>,
    /// Low-stock threshold
    #[arg(long = "minimum")]
    pub minimum_quantity: Option<String>,
    /// Category (Cereals, Cleaning, Deli, Beverages, Pet, Other)
    #[arg(long)]
    pub category: Option<String>,
    /// Unit cost
    #[arg(long)]
    pub purchase_price: Option<String>,
    /// Unit sale price
    #[arg(long)]
    pub sale_price: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match AppConfig::from_env() {
        Ok(config) => {
            init_tracing(config.log_format);
            run(cli, config).await
        }
        Err(e) => {
            init_tracing(LogFormat::default());
            Err(AppError::from(e).into())
        }
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = FirestoreStore::new(&config.firestore)?;
    let collections = &config.collections;

    match cli.command {
        Commands::Stock { action } => match action {
            StockAction::List => commands::stock::list(store, collections).await?,
            StockAction::Add(fields) => commands::stock::add(store, collections, fields).await?,
            StockAction::Edit { id, fields } => {
                commands::stock::edit(store, collections, &id, fields).await?;
            }
            StockAction::Delete { id, yes } => {
                commands::stock::delete(store, collections, &id, yes).await?;
            }
            StockAction::Sell { id } => commands::stock::sell(store, collections, &id).await?,
            StockAction::Import { file } => {
                commands::stock::import(store, collections, &file).await?;
            }
        },
        Commands::Sale { lines } => commands::sale::record(store, collections, lines).await?,
        Commands::Sales { action } => match action {
            SalesAction::Report => commands::sales::report(store, collections).await?,
        },
    }
    Ok(())
}
