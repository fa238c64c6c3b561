//! Async list operations over a `Transport`.
//!
//! Each call is linear: resolve the list's entity type (create and update),
//! resolve a request digest (every write), send one request, parse the
//! response. The two lookups run one after the other. A failure at any step
//! ends the call; nothing already done is undone.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cache::MetadataCache;
use crate::client::ListClient;
use crate::config::{default_site_url, ClientConfig};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::token::TokenSource;
use crate::transport::Transport;
use crate::types::{EntityType, Fields, ItemId};

#[derive(Debug)]
pub struct Session<T, S> {
    client: ListClient,
    transport: T,
    tokens: S,
    page_limit: u32,
    metadata: Option<MetadataCache>,
}

impl<T: Transport, S: TokenSource> Session<T, S> {
    pub fn new(config: &ClientConfig, transport: T, tokens: S) -> Self {
        Self {
            client: ListClient::new(&config.site_url),
            transport,
            tokens,
            page_limit: config.page_limit,
            metadata: config.metadata_cache_ttl().map(MetadataCache::new),
        }
    }

    /// Point the session at another site. `None` falls back to `SP_SITE_URL`.
    /// Digests are requested for the new site from here on.
    pub fn configure(&mut self, site_url: Option<&str>) {
        let url = match site_url {
            Some(url) => url.to_string(),
            None => default_site_url(),
        };
        self.client = ListClient::new(&url);
        if let Some(cache) = &self.metadata {
            cache.clear();
        }
    }

    pub fn client(&self) -> &ListClient {
        &self.client
    }

    pub fn site_url(&self) -> &str {
        self.client.site_url()
    }

    #[instrument(skip(self), fields(site = %self.client.site_url()))]
    pub async fn metadata(&self, list: &str) -> Result<EntityType, ApiError> {
        if let Some(entity_type) = self.metadata.as_ref().and_then(|c| c.get(list)) {
            debug!(%entity_type, "entity type from cache");
            return Ok(entity_type);
        }
        let response = self.send(self.client.build_metadata(list)).await?;
        let entity_type = self.client.parse_metadata(response)?;
        if let Some(cache) = &self.metadata {
            cache.insert(list, entity_type.clone());
        }
        Ok(entity_type)
    }

    /// Create an item and return the parsed response body.
    #[instrument(skip(self, values), fields(site = %self.client.site_url()))]
    pub async fn create_item(&self, list: &str, values: &Fields) -> Result<Value, ApiError> {
        let entity_type = self.metadata(list).await?;
        let digest = self.tokens.digest(&self.client).await?;
        let request = self
            .client
            .build_create_item(list, &entity_type, &digest, values)?;
        let response = self.send(request).await?;
        self.client.parse_create_item(response)
    }

    /// Read one page of items. Results past the page limit are not fetched.
    #[instrument(skip(self), fields(site = %self.client.site_url()))]
    pub async fn get_items(&self, list: &str, filter: Option<&str>) -> Result<Vec<Fields>, ApiError> {
        self.get_items_top(list, filter, self.page_limit).await
    }

    #[instrument(skip(self), fields(site = %self.client.site_url()))]
    pub async fn get_items_top(
        &self,
        list: &str,
        filter: Option<&str>,
        top: u32,
    ) -> Result<Vec<Fields>, ApiError> {
        let response = self.send(self.client.build_get_items(list, filter, top)).await?;
        let items = self.client.parse_get_items(response)?;
        debug!(count = items.len(), "items read");
        Ok(items)
    }

    /// Merge `values` into an item, overwriting regardless of its etag.
    #[instrument(skip(self, values), fields(site = %self.client.site_url()))]
    pub async fn update_item(&self, list: &str, id: ItemId, values: &Fields) -> Result<(), ApiError> {
        let entity_type = self.metadata(list).await?;
        let digest = self.tokens.digest(&self.client).await?;
        let request = self
            .client
            .build_update_item(list, id, &entity_type, &digest, values)?;
        let response = self.send(request).await?;
        self.client.parse_update_item(response)
    }

    #[instrument(skip(self), fields(site = %self.client.site_url()))]
    pub async fn delete_item(&self, list: &str, id: ItemId) -> Result<(), ApiError> {
        let digest = self.tokens.digest(&self.client).await?;
        let response = self
            .send(self.client.build_delete_item(list, id, &digest))
            .await?;
        self.client.parse_delete_item(response)
    }

    /// Forget the cached entity type of one list. No-op without a cache.
    pub fn invalidate_metadata(&self, list: &str) {
        if let Some(cache) = &self.metadata {
            cache.invalidate(list);
        }
    }

    pub fn clear_metadata(&self) {
        if let Some(cache) = &self.metadata {
            cache.clear();
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "request failed");
        }
        Ok(response)
    }
}
