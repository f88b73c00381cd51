//! `stockroom sale` command.

use std::str::FromStr;

use stockroom_app::{Collections, DocumentStore, SaleScreen};
use stockroom_core::StockItemId;
use thiserror::Error;
use tracing::info;

/// A `--line <id>=<quantity>` argument.
///
/// The quantity stays as typed; the sale screen validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLineArg {
    pub id: StockItemId,
    pub quantity: String,
}

#[derive(Debug, Error)]
#[error("expected <id>=<quantity>, got {0:?}")]
pub struct SaleLineArgError(String);

impl FromStr for SaleLineArg {
    type Err = SaleLineArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((id, quantity)) if !id.trim().is_empty() => Ok(Self {
                id: StockItemId::new(id.trim()),
                quantity: quantity.to_string(),
            }),
            _ => Err(SaleLineArgError(s.to_string())),
        }
    }
}

/// Build a cart from the given lines and confirm it.
///
/// # Errors
///
/// Returns an error if a line is rejected, stock is insufficient, or a
/// write fails. Partial commits are reported with the number of lines saved.
#[allow(clippy::print_stdout)]
pub async fn record<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
    lines: Vec<SaleLineArg>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = SaleScreen::open(store, collections).await?;
    for line in lines {
        screen.select(line.id);
        screen.set_quantity(line.quantity);
        screen.add_to_cart()?;
    }
    info!(lines = screen.cart().len(), total = %screen.cart().total()?, "Cart ready");

    let receipt = screen.confirm_sale().await?;
    for sale in &receipt.records {
        let price = sale
            .record
            .sale_price
            .map(|p| p.to_string())
            .unwrap_or_default();
        println!("{}  {} x{} @ {price}", sale.id, sale.record.name, sale.record.quantity);
    }
    println!("Total: {:.2}", receipt.total);
    Ok(())
}
