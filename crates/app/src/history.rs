//! Sales history read from the sales collection.

use stockroom_core::{DailySales, RecordedSale, daily_summary};
use tracing::instrument;

use crate::error::Result;
use crate::repository::SaleRepository;
use crate::store::{Collections, DocumentStore};

/// Read-only view over recorded sales.
#[derive(Debug, Clone)]
pub struct SalesHistory<S> {
    sales: SaleRepository<S>,
}

impl<S: DocumentStore> SalesHistory<S> {
    /// History over the configured sales collection.
    pub fn new(store: S, collections: &Collections) -> Self {
        Self {
            sales: SaleRepository::new(store, collections.sales.as_str()),
        }
    }

    /// Every sale record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Remote`] if the fetch fails.
    #[instrument(skip(self))]
    pub async fn records(&self) -> Result<Vec<RecordedSale>> {
        let mut records = self.sales.list().await?;
        records.sort_by(|a, b| a.record.sold_at.cmp(&b.record.sold_at));
        Ok(records)
    }

    /// Sales grouped per UTC day, newest day first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Remote`] if the fetch fails.
    pub async fn daily(&self) -> Result<Vec<DailySales>> {
        let records = self.records().await?;
        Ok(daily_summary(records.iter().map(|sale| &sale.record)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use stockroom_core::{Price, SaleRecord};

    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_daily_totals() {
        let store = InMemoryStore::new();
        let repo = SaleRepository::new(store.clone(), Collections::DEFAULT_SALES);
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2026, 3, 3, 18, 30, 0).unwrap();
        repo.append(&SaleRecord {
            name: "Rice".to_string(),
            quantity: 3,
            sale_price: Some(Price::from_cents(350)),
            sold_at: monday,
        })
        .await
        .unwrap();
        repo.append(&SaleRecord::quick_sell("Soap", monday)).await.unwrap();
        repo.append(&SaleRecord::quick_sell("Soap", tuesday)).await.unwrap();

        let history = SalesHistory::new(store, &Collections::default());
        let records = history.records().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].record.sold_at, tuesday);

        let days = history.daily().await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, tuesday.date_naive());
        assert_eq!(days[1].records, 2);
        assert_eq!(days[1].units, 4);
        assert_eq!(days[1].revenue, Decimal::new(1050, 2));
        assert_eq!(days[1].unpriced_units, 1);
    }
}
