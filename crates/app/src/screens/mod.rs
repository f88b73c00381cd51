//! Screen controllers.
//!
//! Each screen owns its own [`StockSnapshot`] and mutates it only by
//! refetching after a write. Actions take `&mut self`, so one screen never
//! has two mutations in flight.
//!
//! - [`StockScreen`] - stock form, list, delete, and quick-sell
//! - [`SaleScreen`] - multi-item manual sale cart

pub mod sale;
pub mod stock;

use chrono::Utc;
use stockroom_core::StockSnapshot;
use tracing::warn;

use crate::repository::StockRepository;
use crate::store::{DocumentStore, StoreError};

pub use sale::{SaleReceipt, SaleScreen};
pub use stock::{StockRow, StockScreen};

/// Asks the user to approve a destructive action.
pub trait Confirm {
    /// Return `true` to delete the item named `name`.
    fn confirm_delete(&self, name: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm_delete(&self, name: &str) -> bool {
        self(name)
    }
}

/// Fetch the stock collection into a fresh snapshot.
async fn fetch_snapshot<S: DocumentStore>(
    stock: &StockRepository<S>,
) -> Result<StockSnapshot, StoreError> {
    let items = stock.list().await?;
    Ok(StockSnapshot::new(items, Utc::now()))
}

/// Refetch after a successful write.
///
/// The write already landed, so a failed fetch only leaves the snapshot
/// stale until the next refresh.
async fn refresh_after_write<S: DocumentStore>(
    stock: &StockRepository<S>,
    snapshot: &mut StockSnapshot,
) {
    match fetch_snapshot(stock).await {
        Ok(fresh) => *snapshot = fresh,
        Err(e) => warn!(error = %e, "Refresh after write failed; stock list is stale"),
    }
}
