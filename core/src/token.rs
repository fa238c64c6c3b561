//! Request digest sources.
//!
//! SharePoint rejects state-changing requests without a valid
//! `X-RequestDigest`. A `TokenSource` is asked for one on every mutating
//! call, with the client of the site the write is going to; nothing here
//! caches or refreshes digests.

use async_trait::async_trait;

use crate::client::ListClient;
use crate::error::ApiError;
use crate::transport::Transport;

/// Environment variable read by `EnvToken`.
pub const REQUEST_DIGEST_ENV: &str = "SP_REQUEST_DIGEST";

#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A digest valid for `client`'s site.
    async fn digest(&self, client: &ListClient) -> Result<String, ApiError>;
}

/// A digest obtained elsewhere and handed in as-is.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn digest(&self, _client: &ListClient) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

/// Reads the digest from an environment variable on every call, so a
/// host process can rotate it underneath a running session.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(REQUEST_DIGEST_ENV)
    }
}

#[async_trait]
impl TokenSource for EnvToken {
    async fn digest(&self, _client: &ListClient) -> Result<String, ApiError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(ApiError::Token(format!("{} is not set", self.var))),
        }
    }
}

/// Fetches a fresh digest from `{site}/_api/contextinfo` for every call,
/// where `{site}` is whatever the asking client currently points at.
#[derive(Debug, Clone)]
pub struct ContextInfoToken<T> {
    transport: T,
}

impl<T: Transport> ContextInfoToken<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport> TokenSource for ContextInfoToken<T> {
    async fn digest(&self, client: &ListClient) -> Result<String, ApiError> {
        let response = self.transport.execute(client.build_context_info()).await?;
        let info = client.parse_context_info(response)?;
        Ok(info.form_digest_value)
    }
}
