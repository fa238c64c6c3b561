//! Stateless HTTP request builder and response parser for SharePoint lists.
//!
//! # Design
//! `ListClient` holds only a `site_url` and carries no mutable state between
//! calls. Each list operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Anything that needs a round-trip before the request can be built (the
//! list's entity type, the request digest) is passed in by the caller;
//! `Session` does that sequencing over a `Transport`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Operation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ContextInfo, ContextInfoEnvelope, EntityType, Fields, ItemId, ListInfo, ResultSet, Verbose,
};

pub const ODATA_VERBOSE: &str = "application/json;odata=verbose";

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_REQUEST_DIGEST: &str = "x-requestdigest";
pub const HEADER_HTTP_METHOD: &str = "x-http-method";
pub const HEADER_IF_MATCH: &str = "if-match";

/// Key of the type descriptor merged into every write body.
pub const METADATA_KEY: &str = "__metadata";

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a list title or filter expression for use in a URL.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Synchronous, stateless client for the SharePoint list REST API.
#[derive(Debug, Clone)]
pub struct ListClient {
    site_url: String,
}

impl ListClient {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// `{site}/_api/web/lists/GetByTitle('{list}')`
    fn list_url(&self, list: &str) -> String {
        format!(
            "{}/_api/web/lists/GetByTitle('{}')",
            self.site_url,
            encode_component(list)
        )
    }

    fn item_url(&self, list: &str, id: ItemId) -> String {
        format!("{}/items({id})", self.list_url(list))
    }

    pub fn build_metadata(&self, list: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}?$select=ListItemEntityTypeFullName", self.list_url(list)),
            headers: vec![accept()],
            body: None,
        }
    }

    pub fn build_create_item(
        &self,
        list: &str,
        entity_type: &EntityType,
        digest: &str,
        fields: &Fields,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/items", self.list_url(list)),
            headers: vec![accept(), content_type(), request_digest(digest)],
            body: Some(write_body(entity_type, fields)?),
        })
    }

    /// An empty `filter` is treated the same as `None`.
    pub fn build_get_items(&self, list: &str, filter: Option<&str>, top: u32) -> HttpRequest {
        let mut path = format!("{}/items?$top={top}", self.list_url(list));
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            path.push_str("&$filter=");
            path.push_str(&encode_component(filter));
        }
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: vec![accept()],
            body: None,
        }
    }

    pub fn build_update_item(
        &self,
        list: &str,
        id: ItemId,
        entity_type: &EntityType,
        digest: &str,
        fields: &Fields,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.item_url(list, id),
            headers: vec![
                accept(),
                content_type(),
                request_digest(digest),
                (HEADER_HTTP_METHOD.to_string(), "MERGE".to_string()),
                if_match_any(),
            ],
            body: Some(write_body(entity_type, fields)?),
        })
    }

    pub fn build_delete_item(&self, list: &str, id: ItemId, digest: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.item_url(list, id),
            headers: vec![
                accept(),
                request_digest(digest),
                if_match_any(),
                (HEADER_HTTP_METHOD.to_string(), "DELETE".to_string()),
            ],
            body: None,
        }
    }

    pub fn build_context_info(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/_api/contextinfo", self.site_url),
            headers: vec![accept()],
            body: None,
        }
    }

    /// A non-2xx status is `OperationFailed` with `Operation::Metadata`, so
    /// create and update can fail at the lookup before anything is written.
    pub fn parse_metadata(&self, response: HttpResponse) -> Result<EntityType, ApiError> {
        check_status(&response, Operation::Metadata)?;
        let envelope: Verbose<ListInfo> = from_body(&response)?;
        Ok(envelope.d.entity_type)
    }

    /// Returns the whole parsed body, envelope included.
    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, Operation::Create)?;
        from_body(&response)
    }

    pub fn parse_get_items(&self, response: HttpResponse) -> Result<Vec<Fields>, ApiError> {
        check_status(&response, Operation::Read)?;
        let envelope: Verbose<ResultSet<Fields>> = from_body(&response)?;
        Ok(envelope.d.results)
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Operation::Update)
    }

    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Operation::Delete)
    }

    pub fn parse_context_info(&self, response: HttpResponse) -> Result<ContextInfo, ApiError> {
        check_status(&response, Operation::ContextInfo)?;
        let envelope: Verbose<ContextInfoEnvelope> = from_body(&response)?;
        Ok(envelope.d.info)
    }
}

fn accept() -> (String, String) {
    (HEADER_ACCEPT.to_string(), ODATA_VERBOSE.to_string())
}

fn content_type() -> (String, String) {
    (HEADER_CONTENT_TYPE.to_string(), ODATA_VERBOSE.to_string())
}

fn request_digest(digest: &str) -> (String, String) {
    (HEADER_REQUEST_DIGEST.to_string(), digest.to_string())
}

fn if_match_any() -> (String, String) {
    (HEADER_IF_MATCH.to_string(), "*".to_string())
}

/// Caller fields plus `__metadata.type`. The resolved entity type always
/// replaces a caller-supplied `__metadata`.
fn write_body(entity_type: &EntityType, fields: &Fields) -> Result<String, ApiError> {
    let mut body = fields.clone();
    body.insert(
        METADATA_KEY.to_string(),
        serde_json::json!({ "type": entity_type.as_str() }),
    );
    serde_json::to_string(&body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map any non-2xx status to `OperationFailed`, keeping the raw body.
fn check_status(response: &HttpResponse, operation: Operation) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::OperationFailed {
        operation,
        status: response.status,
        body: response.body.clone(),
    })
}
