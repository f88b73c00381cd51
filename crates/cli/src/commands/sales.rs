//! `stockroom sales` commands.

use stockroom_app::{Collections, DocumentStore, SalesHistory};

/// Print sales grouped per day, newest first.
///
/// # Errors
///
/// Returns an error if the sales collection cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn report<S: DocumentStore>(
    store: S,
    collections: &Collections,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = SalesHistory::new(store, collections);
    let days = history.daily().await?;
    if days.is_empty() {
        println!("No sales recorded.");
        return Ok(());
    }

    println!(
        "{:<10}  {:>7}  {:>7}  {:>10}  {:>9}",
        "DATE", "SALES", "UNITS", "REVENUE", "UNPRICED"
    );
    for day in days {
        println!(
            "{:<10}  {:>7}  {:>7}  {:>10}  {:>9}",
            day.date.to_string(),
            day.records,
            day.units,
            format!("{:.2}", day.revenue),
            day.unpriced_units,
        );
    }
    Ok(())
}
