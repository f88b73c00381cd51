//! Manual sale screen: build a cart, then commit it line by line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockroom_core::{
    Cart, CartState, InventoryError, RecordedSale, SaleRecord, SaleSelection, StockItemId,
    StockSnapshot, ValidationError, parse_cart_quantity, sale_timestamp,
};
use tracing::{error, info, instrument};

use super::{fetch_snapshot, refresh_after_write};
use crate::error::{AppError, CommitStep, Result};
use crate::repository::{SaleRepository, StockRepository};
use crate::store::{Collections, DocumentStore, StoreError};

/// Outcome of a committed sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    /// Timestamp shared by every record of the sale.
    pub sold_at: DateTime<Utc>,
    /// One record per cart line, in cart order.
    pub records: Vec<RecordedSale>,
    /// Sum of line totals.
    pub total: Decimal,
}

/// Manual sale screen controller.
#[derive(Debug)]
pub struct SaleScreen<S> {
    stock: StockRepository<S>,
    sales: SaleRepository<S>,
    snapshot: StockSnapshot,
    selection: SaleSelection,
    cart: Cart,
    state: CartState,
}

impl<S: DocumentStore + Clone> SaleScreen<S> {
    /// Open the screen and load the stock list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Remote`] if the initial fetch fails.
    pub async fn open(store: S, collections: &Collections) -> Result<Self> {
        let mut screen = Self {
            stock: StockRepository::new(store.clone(), collections.stock.as_str()),
            sales: SaleRepository::new(store, collections.sales.as_str()),
            snapshot: StockSnapshot::default(),
            selection: SaleSelection::default(),
            cart: Cart::new(),
            state: CartState::Empty,
        };
        screen.refresh().await?;
        Ok(screen)
    }
}

impl<S: DocumentStore> SaleScreen<S> {
    /// Replace the snapshot with the current stock collection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Remote`] if the fetch fails; the old snapshot is
    /// kept.
    pub async fn refresh(&mut self) -> Result<()> {
        self.snapshot = fetch_snapshot(&self.stock).await?;
        Ok(())
    }

    /// The stock list as of the last fetch.
    #[must_use]
    pub const fn snapshot(&self) -> &StockSnapshot {
        &self.snapshot
    }

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current selection inputs.
    #[must_use]
    pub const fn selection(&self) -> &SaleSelection {
        &self.selection
    }

    /// Where the cart is in the sale flow.
    #[must_use]
    pub const fn state(&self) -> CartState {
        self.state
    }

    /// Choose the product to add.
    pub fn select(&mut self, id: StockItemId) {
        self.selection.item_id = Some(id);
    }

    /// Type the quantity to add.
    pub fn set_quantity(&mut self, text: impl Into<String>) {
        self.selection.quantity = text.into();
    }

    /// Add the selected product to the cart and clear the selection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Inventory`] if nothing is selected, the product is
    /// not in the snapshot, the quantity is not a positive whole number, or
    /// the product already has a cart line. The selection is kept on error.
    pub fn add_to_cart(&mut self) -> Result<()> {
        let id = self
            .selection
            .item_id
            .as_ref()
            .ok_or(InventoryError::Validation(ValidationError::NoItemSelected))?;
        let item = self.snapshot.require(id).map_err(InventoryError::from)?;
        let quantity = parse_cart_quantity(&self.selection.quantity).map_err(InventoryError::from)?;
        self.cart.add(item, quantity)?;
        self.selection.clear();
        self.state = CartState::Building;
        Ok(())
    }

    /// Remove the line for `id`. Removing an absent line is a no-op.
    pub fn remove_from_cart(&mut self, id: &StockItemId) {
        self.cart.remove(id);
        if self.cart.is_empty() {
            self.state = CartState::Empty;
        }
    }

    /// Record every cart line as a sale and lower stock accordingly.
    ///
    /// All lines are checked against the snapshot, and the receipt total is
    /// computed, before any write. Lines
    /// are then committed strictly in cart order: append the sale record,
    /// then set the item's quantity to its snapshot quantity minus the line
    /// quantity. On success the cart is cleared and the snapshot refetched.
    ///
    /// # Errors
    ///
    /// - [`AppError::Inventory`] for an empty cart, insufficient stock, or a
    ///   total too large to represent; nothing is written
    /// - [`AppError::Remote`] if the very first write fails
    /// - [`AppError::PartialCommit`] if a write fails after others landed;
    ///   nothing is rolled back
    ///
    /// The cart is kept on every error.
    #[instrument(skip(self), fields(lines = self.cart.len()))]
    pub async fn confirm_sale(&mut self) -> Result<SaleReceipt> {
        self.cart.check_stock(&self.snapshot)?;
        let total = self.cart.total().map_err(InventoryError::from)?;

        self.state = CartState::Confirming;
        let sold_at = sale_timestamp(Utc::now());
        match self.commit(sold_at, total).await {
            Ok(receipt) => {
                info!(
                    lines = receipt.records.len(),
                    total = %receipt.total,
                    "Sale committed"
                );
                self.cart.clear();
                self.state = CartState::Empty;
                refresh_after_write(&self.stock, &mut self.snapshot).await;
                Ok(receipt)
            }
            Err(e) => {
                if e.is_partial() {
                    error!(error = %e, "Sale partially committed");
                }
                self.state = CartState::Building;
                Err(e)
            }
        }
    }

    async fn commit(&self, sold_at: DateTime<Utc>, total: Decimal) -> Result<SaleReceipt> {
        let total_lines = self.cart.len();
        let fail = |committed: usize, item: &str, step: CommitStep, source: StoreError| {
            if committed == 0 && step == CommitStep::RecordSale {
                AppError::Remote(source)
            } else {
                AppError::PartialCommit {
                    committed,
                    total: total_lines,
                    item: item.to_owned(),
                    step,
                    source,
                }
            }
        };

        let mut records = Vec::with_capacity(total_lines);
        for (committed, line) in self.cart.lines().iter().enumerate() {
            let record = SaleRecord {
                name: line.name.clone(),
                quantity: line.quantity,
                sale_price: Some(line.sale_price),
                sold_at,
            };
            let id = self
                .sales
                .append(&record)
                .await
                .map_err(|e| fail(committed, &line.name, CommitStep::RecordSale, e))?;

            let on_hand = self
                .snapshot
                .get(&line.item_id)
                .map_or(0, |item| item.quantity);
            self.stock
                .set_quantity(&line.item_id, on_hand.saturating_sub(line.quantity))
                .await
                .map_err(|e| fail(committed, &line.name, CommitStep::DecrementStock, e))?;

            records.push(RecordedSale { id, record });
        }

        Ok(SaleReceipt {
            sold_at,
            records,
            total,
        })
    }
}
