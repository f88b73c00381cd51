//! Integration tests for Stockroom.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```
//!
//! No external services are needed: screen scenarios run against
//! [`InMemoryStore`], and the Firestore adapter runs against
//! [`MockFirestore`], an in-process REST server.
//!
//! # Test Categories
//!
//! - `stock_screen` - Stock form, list, delete, and quick-sell scenarios
//! - `sale_screen` - Cart and confirm-sale scenarios, including partial commits
//! - `firestore_adapter` - REST adapter against the mock server

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use stockroom_app::{
    Collections, FirestoreConfig, FirestoreStore, InMemoryStore, StockRepository,
};
use stockroom_core::{Category, Price, StockItemId, StockItemInput, StockForm};

/// Project id used by every mock-backed test.
pub const PROJECT_ID: &str = "demo-stockroom";

/// API key the mock server accepts.
pub const API_KEY: &str = "AIzaSyMockKey0123";

// =============================================================================
// Fixtures
// =============================================================================

/// Form for Rice: 10 on hand, minimum 5, Cereals, 2.00 / 3.50.
#[must_use]
pub fn rice_form() -> StockForm {
    form("Rice", "10", "2.00", "3.50")
}

/// A fully filled form in the Cereals category with minimum 5.
#[must_use]
pub fn form(name: &str, quantity: &str, purchase: &str, sale: &str) -> StockForm {
    StockForm {
        name: name.to_string(),
        quantity: quantity.to_string(),
        minimum_quantity: "5".to_string(),
        category: "Cereals".to_string(),
        purchase_price: purchase.to_string(),
        sale_price: sale.to_string(),
    }
}

/// Write an item straight to the stock collection, bypassing the screens.
pub async fn seed_item(
    store: &InMemoryStore,
    name: &str,
    quantity: u32,
    sale_cents: u32,
) -> StockItemId {
    StockRepository::new(store.clone(), Collections::DEFAULT_STOCK)
        .create(&StockItemInput {
            name: name.to_string(),
            quantity,
            minimum_quantity: 2,
            category: Some(Category::Other),
            purchase_price: Price::from_cents(100),
            sale_price: Price::from_cents(sale_cents),
        })
        .await
        .unwrap()
}

// =============================================================================
// Mock Firestore
// =============================================================================

/// Raw Firestore field maps per collection, keyed by document id.
type Documents = BTreeMap<String, BTreeMap<String, Map<String, Value>>>;

#[derive(Clone, Default)]
struct MockState {
    documents: Arc<Mutex<Documents>>,
    next_id: Arc<Mutex<u64>>,
}

/// In-process server speaking the subset of the Firestore REST API the
/// adapter uses. Documents are stored in their typed-value form.
pub struct MockFirestore {
    addr: SocketAddr,
    state: MockState,
}

impl MockFirestore {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, state }
    }

    /// Adapter configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> FirestoreConfig {
        FirestoreConfig {
            project_id: PROJECT_ID.to_string(),
            database: "(default)".to_string(),
            api_key: Some(SecretString::from(API_KEY)),
            id_token: None,
            emulator_host: Some(self.addr.to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    /// Adapter connected to this server.
    #[must_use]
    pub fn store(&self) -> FirestoreStore {
        FirestoreStore::new(&self.config()).unwrap()
    }

    /// Typed fields of a stored document.
    #[must_use]
    pub fn raw(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        let documents = self.state.documents.lock().unwrap();
        documents.get(collection)?.get(id).cloned()
    }

    /// Store typed fields directly under a chosen id.
    pub fn insert_raw(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        self.state
            .documents
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.state
            .documents
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn error_response(status: StatusCode, name: &str, message: &str) -> Response {
    let body = json!({
        "error": { "code": status.as_u16(), "message": message, "status": name }
    });
    (status, axum::Json(body)).into_response()
}

fn document_json(collection: &str, id: &str, fields: &Map<String, Value>) -> Value {
    json!({
        "name": format!("projects/{PROJECT_ID}/databases/(default)/documents/{collection}/{id}"),
        "fields": fields,
    })
}

fn body_fields(body: &Bytes) -> Option<Map<String, Value>> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("fields")?.as_object().cloned()
}

async fn handle(State(state): State<MockState>, method: Method, uri: Uri, body: Bytes) -> Response {
    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let param = |name: &str| query.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());

    if param("key").as_deref() != Some(API_KEY) {
        return error_response(
            StatusCode::FORBIDDEN,
            "PERMISSION_DENIED",
            "Missing or insufficient permissions.",
        );
    }

    let prefix = format!("/v1/projects/{PROJECT_ID}/databases/(default)/documents/");
    let Some(rest) = uri.path().strip_prefix(prefix.as_str()) else {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "unknown path");
    };
    let segments: Vec<&str> = rest.split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", [collection]) => {
            let Some(fields) = body_fields(&body) else {
                return error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "no fields");
            };
            let id = {
                let mut next = state.next_id.lock().unwrap();
                *next += 1;
                format!("doc{next:05}")
            };
            let response = document_json(collection, &id, &fields);
            state
                .documents
                .lock()
                .unwrap()
                .entry((*collection).to_string())
                .or_default()
                .insert(id, fields);
            axum::Json(response).into_response()
        }
        ("GET", [collection]) => {
            let page_size = param("pageSize")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(usize::MAX);
            let offset = param("pageToken")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0);
            let documents = state.documents.lock().unwrap();
            let all: Vec<Value> = documents
                .get(*collection)
                .map(|docs| {
                    docs.iter()
                        .map(|(id, fields)| document_json(collection, id, fields))
                        .collect()
                })
                .unwrap_or_default();
            let page: Vec<Value> = all.iter().skip(offset).take(page_size).cloned().collect();
            let mut body = json!({});
            if !page.is_empty() {
                body["documents"] = Value::Array(page);
            }
            if offset.saturating_add(page_size) < all.len() {
                body["nextPageToken"] = json!((offset + page_size).to_string());
            }
            axum::Json(body).into_response()
        }
        ("PATCH", [collection, id]) => {
            let Some(fields) = body_fields(&body) else {
                return error_response(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", "no fields");
            };
            let mask: Vec<String> = query
                .iter()
                .filter(|(k, _)| k == "updateMask.fieldPaths")
                .map(|(_, v)| v.clone())
                .collect();
            let mut documents = state.documents.lock().unwrap();
            let Some(existing) = documents.get_mut(*collection).and_then(|d| d.get_mut(*id)) else {
                return error_response(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    &format!("No document to update: {id}"),
                );
            };
            for (key, value) in fields {
                if mask.contains(&key) {
                    existing.insert(key, value);
                }
            }
            let response = document_json(collection, id, existing);
            axum::Json(response).into_response()
        }
        ("DELETE", [collection, id]) => {
            if let Some(docs) = state.documents.lock().unwrap().get_mut(*collection) {
                docs.remove(*id);
            }
            axum::Json(json!({})).into_response()
        }
        _ => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "unsupported route"),
    }
}
