//! Stock screen: item form, stock list, delete, and quick-sell.

use chrono::Utc;
use rust_decimal::Decimal;
use stockroom_core::{
    FormMode, InventoryError, SaleRecord, SaleRecordId, StockForm, StockItem, StockItemId,
    StockLevel, StockSnapshot,
};
use tracing::{error, info, instrument};

use super::{Confirm, fetch_snapshot, refresh_after_write};
use crate::error::{AppError, Result};
use crate::repository::{SaleRepository, StockRepository};
use crate::store::{Collections, DocumentStore};

/// One row of the stock list with its derived display values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRow<'a> {
    /// The item.
    pub item: &'a StockItem,
    /// Sale price minus purchase price.
    pub profit: Decimal,
    /// Margin with one decimal place, `"0"` for free items.
    pub margin: String,
    /// Quantity against the minimum.
    pub level: StockLevel,
    /// The form is editing this item.
    pub editing: bool,
}

/// Stock screen controller.
#[derive(Debug)]
pub struct StockScreen<S> {
    stock: StockRepository<S>,
    sales: SaleRepository<S>,
    snapshot: StockSnapshot,
    form: StockForm,
    mode: FormMode,
}

impl<S: DocumentStore + Clone> StockScreen<S> {
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
            form: StockForm::new(),
            mode: FormMode::Creating,
        };
        screen.refresh().await?;
        Ok(screen)
    }
}

impl<S: DocumentStore> StockScreen<S> {
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

    /// The form as typed.
    #[must_use]
    pub const fn form(&self) -> &StockForm {
        &self.form
    }

    /// Mutable access for typing into the form.
    pub const fn form_mut(&mut self) -> &mut StockForm {
        &mut self.form
    }

    /// Whether the form creates or edits.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Stock list rows with derived values, in snapshot order.
    #[must_use]
    pub fn rows(&self) -> Vec<StockRow<'_>> {
        self.snapshot
            .items()
            .iter()
            .map(|item| StockRow {
                item,
                profit: item.profit(),
                margin: item.margin_display(),
                level: item.stock_level(),
                editing: self.mode.is_editing(&item.id),
            })
            .collect()
    }

    /// Validate the form and create or update the item.
    ///
    /// Returns the identifier of the created or updated item. On success the
    /// form is cleared and edit mode ends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Inventory`] for invalid input or a duplicate name,
    /// and [`AppError::Remote`] if the write fails. The form is kept on error.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn submit(&mut self) -> Result<StockItemId> {
        let input = self.form.validate().map_err(InventoryError::from)?;
        self.snapshot
            .ensure_unique_name(&input.name, self.mode.editing())?;

        let id = match self.mode.editing() {
            Some(id) => {
                self.stock.update(id, &input).await?;
                info!(%id, name = %input.name, "Updated stock item");
                id.clone()
            }
            None => {
                let id = self.stock.create(&input).await?;
                info!(%id, name = %input.name, "Created stock item");
                id
            }
        };

        self.mode = FormMode::Creating;
        self.form.clear();
        refresh_after_write(&self.stock, &mut self.snapshot).await;
        Ok(id)
    }

    /// Load an item into the form for editing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Inventory`] if the item is not in the snapshot.
    pub fn edit_item(&mut self, id: &StockItemId) -> Result<()> {
        let item = self.snapshot.require(id).map_err(InventoryError::from)?;
        self.form = StockForm::from_item(item);
        self.mode = FormMode::Editing(id.clone());
        Ok(())
    }

    /// Leave edit mode and blank the form.
    pub fn cancel_edit(&mut self) {
        self.mode = FormMode::Creating;
        self.form.clear();
    }

    /// Delete an item after the user confirms.
    ///
    /// Returns `false` if the user declined; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Inventory`] if the item is not in the snapshot and
    /// [`AppError::Remote`] if the delete fails.
    #[instrument(skip(self, confirm))]
    pub async fn delete_item(&mut self, id: &StockItemId, confirm: &impl Confirm) -> Result<bool> {
        let item = self.snapshot.require(id).map_err(InventoryError::from)?;
        if !confirm.confirm_delete(&item.name) {
            return Ok(false);
        }

        self.stock.delete(id).await?;
        info!(%id, "Deleted stock item");
        if self.mode.is_editing(id) {
            self.cancel_edit();
        }
        refresh_after_write(&self.stock, &mut self.snapshot).await;
        Ok(true)
    }

    /// Sell a single unit: append a priceless sale record, then lower the
    /// quantity by one.
    ///
    /// The two writes are not atomic. If the decrement fails after the record
    /// was appended, the record stays and the error is
    /// [`AppError::StockNotDecremented`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Inventory`] if the item is unknown or out of stock
    /// (nothing is written), [`AppError::Remote`] if the record could not be
    /// appended, or [`AppError::StockNotDecremented`] as above.
    #[instrument(skip(self))]
    pub async fn quick_sell_one(&mut self, id: &StockItemId) -> Result<SaleRecordId> {
        let item = self.snapshot.require(id).map_err(InventoryError::from)?;
        if item.quantity < 1 {
            return Err(InventoryError::InsufficientStock {
                name: item.name.clone(),
                available: item.quantity,
                requested: 1,
            }
            .into());
        }
        let name = item.name.clone();
        let remaining = item.quantity - 1;

        let record = SaleRecord::quick_sell(name.as_str(), Utc::now());
        let record_id = self.sales.append(&record).await?;
        if let Err(source) = self.stock.set_quantity(id, remaining).await {
            error!(%id, %record_id, error = %source, "Sale recorded but stock not decremented");
            return Err(AppError::StockNotDecremented {
                item: name,
                record: record_id,
                source,
            });
        }
        info!(%id, %record_id, remaining, "Sold one unit");

        refresh_after_write(&self.stock, &mut self.snapshot).await;
        Ok(record_id)
    }
}
