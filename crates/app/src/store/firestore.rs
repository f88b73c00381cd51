//! Cloud Firestore REST v1 adapter.
//!
//! # Endpoints
//!
//! All paths are relative to
//! `/v1/projects/{project}/databases/{database}/documents`:
//!
//! - `POST /{collection}` - create with a server-assigned id
//! - `GET /{collection}?pageSize=&pageToken=` - list, paged
//! - `PATCH /{collection}/{id}?updateMask.fieldPaths=…&currentDocument.exists=true` - merge
//! - `DELETE /{collection}/{id}` - delete
//!
//! # Authentication
//!
//! Requests carry the project's web API key as the `key` query parameter and,
//! when configured, a Firebase ID token as a bearer token so security rules
//! see an authenticated user. Against the emulator neither is required.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::value::{decode_fields, encode_fields, field_path};
use super::{Document, DocumentStore, Fields, StoreError};
use crate::config::FirestoreConfig;

/// Production REST endpoint.
const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1/";

/// Documents requested per list page.
const PAGE_SIZE: &str = "300";

/// Firestore REST client.
#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreStoreInner>,
}

struct FirestoreStoreInner {
    client: reqwest::Client,
    /// `…/documents` URL every request path is appended to.
    documents_url: Url,
    api_key: Option<SecretString>,
    id_token: Option<SecretString>,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("documents_url", &self.inner.documents_url.as_str())
            .field("api_key", &self.inner.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("id_token", &self.inner.id_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl FirestoreStore {
    /// Build a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the
    /// configured host does not form a valid URL.
    pub fn new(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let base = config
            .emulator_host
            .as_ref()
            .map_or_else(|| FIRESTORE_ENDPOINT.to_string(), |host| format!("http://{host}/v1/"));
        Self::with_base_url(client, &base, config)
    }

    /// Build a client against an explicit `…/v1/` base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_base_url(
        client: reqwest::Client,
        base: &str,
        config: &FirestoreConfig,
    ) -> Result<Self, StoreError> {
        let mut documents_url = Url::parse(base).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        documents_url
            .path_segments_mut()
            .map_err(|()| StoreError::Unavailable(format!("{base} cannot be a base URL")))?
            .pop_if_empty()
            .extend([
                "projects",
                config.project_id.as_str(),
                "databases",
                config.database.as_str(),
                "documents",
            ]);

        Ok(Self {
            inner: Arc::new(FirestoreStoreInner {
                client,
                documents_url,
                api_key: config.api_key.clone(),
                id_token: config.id_token.clone(),
            }),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.inner.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Unavailable("documents URL cannot be a base".into()))?
            .extend(segments);
        if let Some(key) = &self.inner.api_key {
            url.query_pairs_mut().append_pair("key", key.expose_secret());
        }
        Ok(url)
    }

    /// Send a request and turn non-2xx answers into [`StoreError::Service`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let request = match &self.inner.id_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(service_error(status, &body))
    }
}

/// Decode a Firestore error body, falling back to the HTTP reason phrase.
fn service_error(status: reqwest::StatusCode, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
    let reason = status.canonical_reason().unwrap_or("unknown").to_string();
    match parsed {
        Some(ErrorResponse { error }) => StoreError::Service {
            code: status.as_u16(),
            status: if error.status.is_empty() { reason } else { error.status },
            message: error.message,
        },
        None => StoreError::Service {
            code: status.as_u16(),
            status: reason,
            message: body.trim().to_string(),
        },
    }
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn into_document(collection: &str, raw: RawDocument) -> Result<Document, StoreError> {
    let id = document_id(&raw.name).to_string();
    let fields = decode_fields(&raw.fields).map_err(|reason| StoreError::Decode {
        collection: collection.to_string(),
        id: id.clone(),
        reason,
    })?;
    Ok(Document { id, fields })
}

impl DocumentStore for FirestoreStore {
    #[instrument(skip_all, fields(collection = %collection))]
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let url = self.url(&[collection])?;
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self.send(self.inner.client.post(url).json(&body)).await?;
        let raw: RawDocument = response.json().await?;
        let id = document_id(&raw.name).to_string();
        debug!(%id, "Created document");
        Ok(id)
    }

    #[instrument(skip_all, fields(collection = %collection))]
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.url(&[collection])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            let response = self.send(self.inner.client.get(url)).await?;
            let page: ListResponse = response.json().await?;
            for raw in page.documents {
                documents.push(into_document(collection, raw)?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        debug!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    #[instrument(skip_all, fields(collection = %collection, id = %id))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut url = self.url(&[collection, id])?;
        {
            let mut query = url.query_pairs_mut();
            for key in fields.keys() {
                query.append_pair("updateMask.fieldPaths", &field_path(key));
            }
            query.append_pair("currentDocument.exists", "true");
        }
        let body = json!({ "fields": encode_fields(&fields) });
        match self.send(self.inner.client.patch(url).json(&body)).await {
            Ok(_) => Ok(()),
            Err(StoreError::Service { code: 404, .. }) => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all, fields(collection = %collection, id = %id))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.url(&[collection, id])?;
        self.send(self.inner.client.delete(url)).await?;
        Ok(())
    }
}
