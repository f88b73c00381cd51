//! `stockroom stock` commands.

use std::io::{BufRead, Write};
use std::path::Path;

use stockroom_app::{Collections, Confirm, DocumentStore, StockScreen, import_forms};
use stockroom_core::{Category, StockForm, StockItemId};
use tracing::{error, info, warn};

use crate::ItemFields;

/// Prompts on the terminal unless `--yes` was given.
struct PromptConfirm {
    assume_yes: bool,
}

impl Confirm for PromptConfirm {
    #[allow(clippy::print_stderr)]
    fn confirm_delete(&self, name: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("Delete {name}? [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Copy the given fields into the form, leaving the rest untouched.
fn apply(form: &mut StockForm, fields: ItemFields) {
    let ItemFields {
        name,
        quantity,
        minimum_quantity,
        category,
        purchase_price,
        sale_price,
    } = fields;
    for (slot, value) in [
        (&mut form.name, name),
        (&mut form.quantity, quantity),
        (&mut form.minimum_quantity, minimum_quantity),
        (&mut form.category, category),
        (&mut form.purchase_price, purchase_price),
        (&mut form.sale_price, sale_price),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

/// Print the stock list.
///
/// # Errors
///
/// Returns an error if the stock list cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn list<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
) -> Result<(), Box<dyn std::error::Error>> {
    let screen = StockScreen::open(store, collections).await?;
    let rows = screen.rows();
    if rows.is_empty() {
        println!("No items in stock.");
        return Ok(());
    }

    println!(
        "{:<20}  {:<24}  {:>6}  {:>6}  {:<10}  {:>9}  {:>9}  {:>9}  {:>7}  LEVEL",
        "ID", "NAME", "QTY", "MIN", "CATEGORY", "COST", "PRICE", "PROFIT", "MARGIN"
    );
    for row in rows {
        let item = row.item;
        let category = item.category.map_or("-", Category::label);
        println!(
            "{:<20}  {:<24}  {:>6}  {:>6}  {:<10}  {:>9}  {:>9}  {:>9}  {:>6}%  {}",
            item.id,
            item.name,
            item.quantity,
            item.minimum_quantity,
            category,
            item.purchase_price.to_string(),
            item.sale_price.to_string(),
            format!("{:.2}", row.profit),
            row.margin,
            row.level,
        );
    }

    let snapshot = screen.snapshot();
    let low = snapshot.low_stock().count();
    if low > 0 {
        println!("\n{low} of {} item(s) at or below minimum.", snapshot.len());
    }
    if let Some(fetched_at) = snapshot.fetched_at() {
        info!(items = snapshot.len(), low, %fetched_at, "Stock list fetched");
    }
    Ok(())
}

/// Add an item from command-line fields.
///
/// # Errors
///
/// Returns an error if validation fails or the item cannot be written.
#[allow(clippy::print_stdout)]
pub async fn add<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
    fields: ItemFields,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = StockScreen::open(store, collections).await?;
    apply(screen.form_mut(), fields);
    let id = screen.submit().await?;
    println!("{id}");
    Ok(())
}

/// Edit an item, keeping omitted fields at their current values.
///
/// # Errors
///
/// Returns an error if the item is unknown, validation fails, or the update
/// cannot be written.
pub async fn edit<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
    id: &str,
    fields: ItemFields,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = StockScreen::open(store, collections).await?;
    let id = StockItemId::new(id);
    screen.edit_item(&id)?;
    apply(screen.form_mut(), fields);
    screen.submit().await?;
    Ok(())
}

/// Delete an item, prompting unless `assume_yes`.
///
/// # Errors
///
/// Returns an error if the item is unknown or the delete fails.
pub async fn delete<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
    id: &str,
    assume_yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = StockScreen::open(store, collections).await?;
    let confirm = PromptConfirm { assume_yes };
    if !screen.delete_item(&StockItemId::new(id), &confirm).await? {
        info!("Delete cancelled");
    }
    Ok(())
}

/// Sell one unit of an item.
///
/// # Errors
///
/// Returns an error if the item is unknown, out of stock, or a write fails.
pub async fn sell<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = StockScreen::open(store, collections).await?;
    let id = StockItemId::new(id);
    screen.quick_sell_one(&id).await?;
    if let Some(item) = screen.snapshot().get(&id).filter(|item| item.is_low_stock()) {
        warn!(name = %item.name, quantity = item.quantity, "Stock is low");
    }
    Ok(())
}

/// Import items from a YAML list of form entries.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if any entry
/// was rejected.
pub async fn import<S: DocumentStore + Clone>(
    store: S,
    collections: &Collections,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    info!(path = %path.display(), "Loading stock items from file");

    let content = tokio::fs::read_to_string(path).await?;
    let forms: Vec<StockForm> = serde_yaml::from_str(&content)?;
    info!(items = forms.len(), "Parsed import file");

    let mut screen = StockScreen::open(store, collections).await?;
    let report = import_forms(&mut screen, forms).await;

    info!("  Items created: {}", report.created.len());
    if !report.is_clean() {
        error!("  Items rejected: {}", report.failed.len());
        for (name, err) in &report.failed {
            error!("    - {name}: {err}");
        }
        return Err(format!("{} item(s) rejected", report.failed.len()).into());
    }
    Ok(())
}
