//! Remote catalog service: the contract the store consumes and its HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use shopdesk_catalog::{CatalogEntry, ProductDraft};
use shopdesk_core::EntryId;

/// Transport-level failure talking to the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Operations the catalog store performs against the remote service.
///
/// Implementations must not retry; a failed call is reported once and the
/// user decides whether to re-invoke.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// `GET /products`
    async fn fetch_all(&self) -> Result<Vec<CatalogEntry>, RemoteError>;

    /// `POST /products/add`. Returns the server's echo of the new entry.
    async fn create(&self, draft: &ProductDraft) -> Result<CatalogEntry, RemoteError>;

    /// `PUT /products/{id}` with the full record.
    async fn replace(&self, id: EntryId, entry: &CatalogEntry) -> Result<(), RemoteError>;

    /// `DELETE /products/{id}`. Only the HTTP status is inspected.
    async fn delete(&self, id: EntryId) -> Result<(), RemoteError>;
}

#[derive(Debug, Deserialize)]
struct ProductsPage {
    products: Vec<CatalogEntry>,
}

/// `reqwest`-backed [`CatalogService`].
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    api_url: String,
    client: reqwest::Client,
}

impl HttpCatalogService {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base(api_url.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self {
            api_url: normalize_base(api_url.into()),
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

fn normalize_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    Err(RemoteError::Api(status, resp.text().await.unwrap_or_default()))
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn fetch_all(&self) -> Result<Vec<CatalogEntry>, RemoteError> {
        let resp = self
            .client
            .get(self.url("/products"))
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let resp = ensure_success(resp).await?;

        let page: ProductsPage = resp.json().await.map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(page.products)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<CatalogEntry, RemoteError> {
        let resp = self
            .client
            .post(self.url("/products/add"))
            .json(draft)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let resp = ensure_success(resp).await?;

        resp.json().await.map_err(|e| RemoteError::Parse(e.to_string()))
    }

    async fn replace(&self, id: EntryId, entry: &CatalogEntry) -> Result<(), RemoteError> {
        let resp = self
            .client
            .put(self.url(&format!("/products/{id}")))
            .json(entry)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: EntryId) -> Result<(), RemoteError> {
        let resp = self
            .client
            .delete(self.url(&format!("/products/{id}")))
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        ensure_success(resp).await?;
        Ok(())
    }
}
