//! Typed access to the stock and sales collections.
//!
//! Repositories translate between domain types and store field maps. They
//! hold no state beyond the store handle and the collection name.
//!
//! Other clients write to the same collections, so a listing skips documents
//! that do not decode (a negative `quantidade`, say) instead of failing.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use stockroom_core::{
    RecordedSale, SaleRecord, SaleRecordId, StockItem, StockItemId, StockItemInput,
};
use tracing::warn;

use crate::store::{Document, DocumentStore, Fields, StoreError, to_fields};

/// Decode a document's fields into `T`, naming the document on failure.
fn decode<T: DeserializeOwned>(collection: &str, document: Document) -> Result<(String, T), StoreError> {
    let Document { id, fields } = document;
    match serde_json::from_value::<T>(Value::Object(fields)) {
        Ok(value) => Ok((id, value)),
        Err(e) => Err(StoreError::Decode {
            collection: collection.to_string(),
            id,
            reason: e.to_string(),
        }),
    }
}

/// Decode every document, logging and dropping the ones that do not fit `T`.
fn decode_listing<T: DeserializeOwned>(collection: &str, documents: Vec<Document>) -> Vec<(String, T)> {
    documents
        .into_iter()
        .filter_map(|doc| match decode::<T>(collection, doc) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect()
}

/// Stock collection access.
#[derive(Debug, Clone)]
pub struct StockRepository<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> StockRepository<S> {
    /// Repository over `collection` in `store`.
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Fetch every stock item. Documents that do not decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the list call fails.
    pub async fn list(&self) -> Result<Vec<StockItem>, StoreError> {
        let documents = self.store.list(&self.collection).await?;
        Ok(decode_listing::<StockItemInput>(&self.collection, documents)
            .into_iter()
            .map(|(id, input)| StockItem::from_parts(StockItemId::new(id), input))
            .collect())
    }

    /// Create an item and return its new identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the create call fails.
    pub async fn create(&self, input: &StockItemInput) -> Result<StockItemId, StoreError> {
        let fields = to_fields(input)?;
        let id = self.store.create(&self.collection, fields).await?;
        Ok(StockItemId::new(id))
    }

    /// Overwrite every field of an existing item.
    ///
    /// # Errors
    ///
    /// Returns an error if the update call fails.
    pub async fn update(&self, id: &StockItemId, input: &StockItemInput) -> Result<(), StoreError> {
        let fields = to_fields(input)?;
        self.store.update(&self.collection, id.as_str(), fields).await
    }

    /// Set only the quantity of an existing item.
    ///
    /// # Errors
    ///
    /// Returns an error if the update call fails.
    pub async fn set_quantity(&self, id: &StockItemId, quantity: u32) -> Result<(), StoreError> {
        let mut fields = Fields::new();
        fields.insert("quantidade".to_string(), json!(quantity));
        self.store.update(&self.collection, id.as_str(), fields).await
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete call fails.
    pub async fn delete(&self, id: &StockItemId) -> Result<(), StoreError> {
        self.store.delete(&self.collection, id.as_str()).await
    }
}

/// Sales collection access. Records are only ever appended.
#[derive(Debug, Clone)]
pub struct SaleRepository<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> SaleRepository<S> {
    /// Repository over `collection` in `store`.
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Append a record and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the create call fails.
    pub async fn append(&self, record: &SaleRecord) -> Result<SaleRecordId, StoreError> {
        let fields = to_fields(record)?;
        let id = self.store.create(&self.collection, fields).await?;
        Ok(SaleRecordId::new(id))
    }

    /// Fetch every sale record. Documents that do not decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the list call fails.
    pub async fn list(&self) -> Result<Vec<RecordedSale>, StoreError> {
        let documents = self.store.list(&self.collection).await?;
        Ok(decode_listing::<SaleRecord>(&self.collection, documents)
            .into_iter()
            .map(|(id, record)| RecordedSale {
                id: SaleRecordId::new(id),
                record,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use stockroom_core::{Category, Price};

    use super::*;
    use crate::store::InMemoryStore;

    fn rice() -> StockItemInput {
        StockItemInput {
            name: "Rice".to_string(),
            quantity: 10,
            minimum_quantity: 5,
            category: Some(Category::Cereals),
            purchase_price: Price::from_cents(200),
            sale_price: Price::from_cents(350),
        }
    }

    #[tokio::test]
    async fn test_stock_fields_use_stored_names() {
        let store = InMemoryStore::new();
        let repo = StockRepository::new(store.clone(), "estoque");
        let id = repo.create(&rice()).await.unwrap();

        let fields = store.get("estoque", id.as_str()).unwrap();
        assert_eq!(
            Value::Object(fields),
            json!({
                "nome": "Rice",
                "quantidade": 10,
                "quantidadeMinima": 5,
                "categoria": "Cereais",
                "valorCompra": 2.0,
                "valorVenda": 3.5,
            })
        );
    }

    #[tokio::test]
    async fn test_set_quantity_keeps_other_fields() {
        let store = InMemoryStore::new();
        let repo = StockRepository::new(store.clone(), "estoque");
        let id = repo.create(&rice()).await.unwrap();
        repo.set_quantity(&id, 7).await.unwrap();

        let items = repo.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 7);
        assert_eq!(items[0].name, "Rice");
        assert_eq!(items[0].id, id);
    }

    #[tokio::test]
    async fn test_undecodable_documents_are_skipped() {
        let store = InMemoryStore::new();
        let repo = StockRepository::new(store.clone(), "estoque");
        let rice_id = repo.create(&rice()).await.unwrap();
        store
            .create("estoque", json!({"nome": "Broken"}).as_object().unwrap().clone())
            .await
            .unwrap();
        store
            .create(
                "estoque",
                json!({
                    "nome": "Old",
                    "quantidade": -2,
                    "quantidadeMinima": 1,
                    "categoria": "",
                    "valorCompra": 1.0,
                    "valorVenda": 2.0,
                })
                .as_object()
                .unwrap()
                .clone(),
            )
            .await
            .unwrap();

        let items = repo.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, rice_id);
    }

    #[test]
    fn test_decode_names_the_document() {
        let document = Document {
            id: "abc".to_string(),
            fields: json!({"nome": "Broken"}).as_object().unwrap().clone(),
        };
        match decode::<StockItemInput>("estoque", document).unwrap_err() {
            StoreError::Decode { collection, id, .. } => {
                assert_eq!(collection, "estoque");
                assert_eq!(id, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_sale_records_are_skipped() {
        let store = InMemoryStore::new();
        let repo = SaleRepository::new(store.clone(), "vendas");
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        repo.append(&SaleRecord::quick_sell("Rice", at)).await.unwrap();
        store
            .create("vendas", json!({"nome": "Rice", "data": "yesterday"}).as_object().unwrap().clone())
            .await
            .unwrap();

        let sales = repo.list().await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].record.name, "Rice");
    }

    #[tokio::test]
    async fn test_sale_records_round_trip() {
        let store = InMemoryStore::new();
        let repo = SaleRepository::new(store.clone(), "vendas");
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = SaleRecord::quick_sell("Rice", at);
        let id = repo.append(&record).await.unwrap();

        let fields = store.get("vendas", id.as_str()).unwrap();
        assert!(!fields.contains_key("valorVenda"));

        let sales = repo.list().await.unwrap();
        assert_eq!(sales, vec![RecordedSale { id, record }]);
    }
}
