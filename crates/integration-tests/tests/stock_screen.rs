//! Stock screen scenarios against the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use stockroom_app::{AppError, Collections, InMemoryStore, StockScreen};
use stockroom_core::{FormMode, InventoryError, SaleRecord, StockForm};
use stockroom_integration_tests::{form, rice_form};

async fn open(store: &InMemoryStore) -> StockScreen<InMemoryStore> {
    StockScreen::open(store.clone(), &Collections::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_rice_is_valid_with_expected_margin() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = rice_form();
    let id = screen.submit().await.unwrap();

    let rows = screen.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item.id, id);
    assert_eq!(rows[0].profit, Decimal::new(150, 2));
    assert_eq!(rows[0].margin, "75.0");
    assert!(!rows[0].level.is_low());
}

#[tokio::test]
async fn test_free_item_shows_zero_margin() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = form("Sample", "3", "0", "1.99");
    screen.submit().await.unwrap();

    let rows = screen.rows();
    assert_eq!(rows[0].margin, "0");
    assert!(rows[0].level.is_low());
}

#[tokio::test]
async fn test_names_differing_only_in_case_are_duplicates() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = rice_form();
    screen.submit().await.unwrap();

    *screen.form_mut() = form("RICE", "1", "1", "2");
    let err = screen.submit().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Inventory(InventoryError::DuplicateName { .. })
    ));
    assert_eq!(store.count("estoque"), 1);
}

#[tokio::test]
async fn test_renaming_onto_another_item_is_rejected() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = rice_form();
    screen.submit().await.unwrap();
    *screen.form_mut() = form("Beans", "4", "3", "4");
    let beans = screen.submit().await.unwrap();

    screen.edit_item(&beans).unwrap();
    screen.form_mut().name = "rice".to_string();
    let err = screen.submit().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Inventory(InventoryError::DuplicateName { .. })
    ));
    assert_eq!(screen.mode(), &FormMode::Editing(beans.clone()));
    assert_eq!(screen.snapshot().get(&beans).unwrap().name, "Beans");
}

#[tokio::test]
async fn test_negative_and_malformed_numbers_are_rejected() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    for bad in [
        form("Rice", "-1", "2", "3"),
        form("Rice", "ten", "2", "3"),
        form("Rice", "10", "2,00", "3"),
        form("Rice", "10", "2", "-3"),
    ] {
        *screen.form_mut() = bad;
        let err = screen.submit().await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Inventory(InventoryError::Validation(_))
        ));
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_edit_then_delete_clears_edit_mode() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = rice_form();
    let id = screen.submit().await.unwrap();

    screen.edit_item(&id).unwrap();
    assert_eq!(screen.form().name, "Rice");
    assert!(screen.delete_item(&id, &|_: &str| true).await.unwrap());
    assert_eq!(screen.mode(), &FormMode::Creating);
    assert_eq!(screen.form(), &StockForm::new());
    assert_eq!(store.count("estoque"), 0);
}

#[tokio::test]
async fn test_quick_sell_appends_priceless_record() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = rice_form();
    let id = screen.submit().await.unwrap();

    let record_id = screen.quick_sell_one(&id).await.unwrap();
    assert_eq!(screen.snapshot().get(&id).unwrap().quantity, 9);

    let fields = store.get("vendas", record_id.as_str()).unwrap();
    let record: SaleRecord = serde_json::from_value(fields.into()).unwrap();
    assert_eq!(record.name, "Rice");
    assert_eq!(record.quantity, 1);
    assert_eq!(record.sale_price, None);
}

#[tokio::test]
async fn test_quick_sell_at_zero_writes_nothing() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = form("Rice", "0", "2", "3");
    let id = screen.submit().await.unwrap();
    let writes = store.write_count();

    let err = screen.quick_sell_one(&id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Inventory(InventoryError::InsufficientStock { .. })
    ));
    assert_eq!(store.write_count(), writes);
    assert_eq!(store.count("vendas"), 0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_snapshot() {
    let store = InMemoryStore::new();
    let mut screen = open(&store).await;
    *screen.form_mut() = rice_form();
    screen.submit().await.unwrap();

    store.fail_reads(true);
    let err = screen.refresh().await.unwrap_err();
    assert!(matches!(err, AppError::Remote(_)));
    assert_eq!(screen.snapshot().len(), 1);
}
